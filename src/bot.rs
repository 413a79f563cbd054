//! The refresh → match → publish cycle.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::engine::matcher::OpportunityMatcher;
use crate::engine::types::Opportunity;
use crate::market_data::router::{RefreshReport, SnapshotSynchronizer};
use crate::market_data::snapshot_table::VenueSnapshotTable;
use crate::notify::SharedNotifier;

#[derive(Debug, Clone, Default)]
pub struct CycleSummary {
    pub refresh: RefreshReport,
    pub opportunities: Vec<Opportunity>,
}

pub struct ArbitrageBot {
    synchronizer: SnapshotSynchronizer,
    matcher: OpportunityMatcher,
    notifier: SharedNotifier,
    table: VenueSnapshotTable,
    refresh_interval: Duration,
}

impl ArbitrageBot {
    pub fn new(
        synchronizer: SnapshotSynchronizer,
        matcher: OpportunityMatcher,
        notifier: SharedNotifier,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            synchronizer,
            matcher,
            notifier,
            table: VenueSnapshotTable::new(),
            refresh_interval,
        }
    }

    pub fn table(&self) -> &VenueSnapshotTable {
        &self.table
    }

    /// One refresh, one matching pass, then every surviving opportunity is
    /// handed to the notifier. Notification failures are logged and do not
    /// stop the cycle.
    #[instrument(level = "debug", skip_all)]
    pub async fn run_cycle(&mut self, shutdown: &CancellationToken) -> CycleSummary {
        let refresh = self.synchronizer.refresh(&mut self.table, shutdown).await;
        self.log_stale(&refresh);

        let opportunities = self.matcher.run(&self.table);
        for opportunity in &opportunities {
            metrics::counter!(
                "arbx_opportunities_total",
                "ask_venue" => opportunity.ask_venue.clone(),
                "bid_venue" => opportunity.bid_venue.clone()
            )
            .increment(1);
            if let Err(e) = self.notifier.publish(opportunity).await {
                warn!(
                    ask_venue = %opportunity.ask_venue,
                    bid_venue = %opportunity.bid_venue,
                    error = %e,
                    "Failed to publish opportunity"
                );
            }
        }

        CycleSummary { refresh, opportunities }
    }

    /// Loops until `shutdown` is cancelled. The token is checked between
    /// cycles and interrupts both the refresh and the delay.
    pub async fn run(&mut self, shutdown: CancellationToken) {
        info!(
            venues = ?self.synchronizer.venues().collect::<Vec<_>>(),
            refresh_interval_secs = self.refresh_interval.as_secs(),
            "Starting arbitrage loop"
        );

        let mut cycle: u64 = 0;
        while !shutdown.is_cancelled() {
            cycle += 1;
            let started = Instant::now();
            let summary = self.run_cycle(&shutdown).await;
            debug!(
                cycle,
                elapsed_ms = started.elapsed().as_millis() as u64,
                refreshed = summary.refresh.refreshed.len(),
                opportunities = summary.opportunities.len(),
                "Cycle finished"
            );

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.refresh_interval) => {}
            }
        }
        info!(cycles = cycle, "Arbitrage loop stopped");
    }

    fn log_stale(&self, refresh: &RefreshReport) {
        let now = Instant::now();
        for venue in self.synchronizer.venues() {
            if refresh.refreshed.iter().any(|v| v == venue) {
                continue;
            }
            match self.table.age(venue, now) {
                Some(age) => info!(venue, age_ms = age.as_millis() as u64, "Using stale snapshot"),
                None => debug!(venue, "No snapshot for venue yet"),
            }
        }
    }
}
