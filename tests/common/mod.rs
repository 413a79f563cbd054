#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use arbx_rs::engine::book::OrderBook;
use arbx_rs::engine::types::Opportunity;
use arbx_rs::market_data::adapters::{AdapterError, SharedAdapter, VenueAdapter};
use arbx_rs::notify::{Notifier, NotifyError};
use rust_decimal::Decimal;

pub enum Behaviour {
    Book(OrderBook),
    Delayed(Duration, OrderBook),
    Fail,
    Hang,
    OnceThenFail(OrderBook),
}

pub struct MockAdapter {
    name: String,
    behaviour: Behaviour,
    pub calls: AtomicUsize,
    pub dropped: Arc<AtomicBool>,
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl MockAdapter {
    pub fn new(name: &str, behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            behaviour,
            calls: AtomicUsize::new(0),
            dropped: Arc::new(AtomicBool::new(false)),
        })
    }
}

#[async_trait::async_trait]
impl VenueAdapter for MockAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn symbol(&self) -> &str {
        "btcusd"
    }

    async fn fetch_depth(&self) -> Result<OrderBook, AdapterError> {
        let previous = self.calls.fetch_add(1, Ordering::SeqCst);
        let _guard = DropFlag(Arc::clone(&self.dropped));
        match &self.behaviour {
            Behaviour::Book(book) => Ok(book.clone()),
            Behaviour::Delayed(delay, book) => {
                tokio::time::sleep(*delay).await;
                Ok(book.clone())
            }
            Behaviour::OnceThenFail(book) if previous == 0 => Ok(book.clone()),
            Behaviour::Fail | Behaviour::OnceThenFail(_) => Err(AdapterError::Status { venue: self.name.clone(), status: 503 }),
            Behaviour::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(OrderBook::default())
            }
        }
    }
}

pub fn shared(adapters: &[Arc<MockAdapter>]) -> Vec<SharedAdapter> {
    adapters.iter().map(|a| Arc::clone(a) as SharedAdapter).collect()
}

pub fn book(bids: &[(i64, &str)], asks: &[(i64, &str)]) -> OrderBook {
    let side = |levels: &[(i64, &str)]| {
        levels
            .iter()
            .map(|(p, a)| (Decimal::from(*p), a.parse::<Decimal>().unwrap()))
            .collect::<Vec<_>>()
    };
    OrderBook::from_pairs(&side(bids), &side(asks))
}

/// Venue X of the worked example: cheap asks.
pub fn venue_x() -> OrderBook {
    book(&[(99, "1")], &[(100, "1.0"), (101, "2.0")])
}

/// Venue Y of the worked example: rich bids.
pub fn venue_y() -> OrderBook {
    book(&[(103, "1.5"), (102, "1.0")], &[(104, "1")])
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub published: Mutex<Vec<Opportunity>>,
}

impl RecordingNotifier {
    pub fn count(&self) -> usize {
        self.published.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn publish(&self, opportunity: &Opportunity) -> Result<(), NotifyError> {
        self.published.lock().unwrap().push(opportunity.clone());
        Ok(())
    }
}

pub struct FailingNotifier;

#[async_trait::async_trait]
impl Notifier for FailingNotifier {
    async fn publish(&self, _opportunity: &Opportunity) -> Result<(), NotifyError> {
        Err(NotifyError::Api("chat not found".to_string()))
    }
}
