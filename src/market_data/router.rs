// Router fans depth fetches out to every adapter and fans the books back in
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::market_data::adapters::{MarketEvent, SharedAdapter};
use crate::market_data::snapshot_table::VenueSnapshotTable;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub expected: usize,
    pub refreshed: Vec<String>,
    pub timed_out: bool,
}

impl RefreshReport {
    pub fn is_complete(&self) -> bool {
        self.refreshed.len() == self.expected
    }
}

/// Refreshes the snapshot table from every configured venue within a fixed
/// time budget.
pub struct SnapshotSynchronizer {
    adapters: Vec<SharedAdapter>,
    timeout: Duration,
}

impl SnapshotSynchronizer {
    pub fn new(adapters: Vec<SharedAdapter>, timeout: Duration) -> Self {
        Self { adapters, timeout }
    }

    pub fn venues(&self) -> impl Iterator<Item = &str> {
        self.adapters.iter().map(|a| a.name())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs one fan-out/fan-in round.
    ///
    /// Each adapter gets its own task. Books are handed over a channel to
    /// this (single) collector, which is the only writer of `table`. The
    /// round ends when every venue reported, every task finished, the
    /// timeout elapsed or `shutdown` fired. Outstanding fetches are then
    /// cancelled and awaited, so none outlives the round. Venues that did not
    /// report keep their previous snapshot.
    #[instrument(level = "debug", skip_all, fields(venues = self.adapters.len()))]
    pub async fn refresh(&self, table: &mut VenueSnapshotTable, shutdown: &CancellationToken) -> RefreshReport {
        let expected = self.adapters.len();
        let mut report = RefreshReport { expected, ..Default::default() };
        if expected == 0 {
            return report;
        }

        let cancel = shutdown.child_token();
        // one slot per venue: a task never blocks on send
        let (tx, mut rx) = mpsc::channel::<MarketEvent>(expected);
        let mut tasks = JoinSet::new();
        for adapter in &self.adapters {
            tasks.spawn(fetch_task(Arc::clone(adapter), tx.clone(), cancel.clone()));
        }
        drop(tx);

        let deadline = tokio::time::sleep(self.timeout);
        tokio::pin!(deadline);

        while report.refreshed.len() < expected {
            tokio::select! {
                _ = &mut deadline => {
                    report.timed_out = true;
                    warn!(
                        timeout_ms = self.timeout.as_millis() as u64,
                        received = report.refreshed.len(),
                        expected,
                        "Depth refresh timed out"
                    );
                    metrics::counter!("arbx_fetch_timeouts_total").increment(1);
                    break;
                }
                _ = cancel.cancelled() => {
                    debug!("Refresh interrupted by shutdown");
                    break;
                }
                event = rx.recv() => match event {
                    Some(MarketEvent::Snapshot { venue, book, latency }) => {
                        debug!(
                            venue = %venue,
                            bids = book.bids.len(),
                            asks = book.asks.len(),
                            latency_ms = latency.as_millis() as u64,
                            "Stored depth snapshot"
                        );
                        table.apply_snapshot(&venue, book);
                        report.refreshed.push(venue);
                    }
                    // every fetch task is done, failed ones simply never sent
                    None => break,
                },
            }
        }

        cancel.cancel();
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Fetch task panicked");
            }
        }

        metrics::gauge!("arbx_fresh_venues").set(report.refreshed.len() as f64);
        info!(
            refreshed = report.refreshed.len(),
            expected,
            timed_out = report.timed_out,
            "Depth refresh finished"
        );
        report
    }
}

async fn fetch_task(adapter: SharedAdapter, tx: mpsc::Sender<MarketEvent>, cancel: CancellationToken) {
    let venue = adapter.name().to_string();
    let started = Instant::now();

    let result = tokio::select! {
        _ = cancel.cancelled() => {
            debug!(venue = %venue, "Fetch cancelled");
            return;
        }
        result = adapter.fetch_depth() => result,
    };

    match result {
        Ok(book) => {
            let latency = started.elapsed();
            metrics::histogram!("arbx_fetch_latency_seconds", "venue" => venue.clone())
                .record(latency.as_secs_f64());
            if tx.send(MarketEvent::Snapshot { venue: venue.clone(), book, latency }).await.is_err() {
                debug!(venue = %venue, "Collector closed before snapshot arrived");
            }
        }
        Err(e) => {
            warn!(venue = %venue, symbol = %adapter.symbol(), error = %e, "Failed to fetch order book");
            metrics::counter!("arbx_fetch_failures_total", "venue" => venue).increment(1);
        }
    }
}
