// Shared trait + errors for venue depth adapters
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Settings, VenueKind};
use crate::engine::book::OrderBook;
use crate::engine::types::BookError;
use crate::market_data::normaliser::Normaliser;

#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{venue} answered with status {status}")]
    Status { venue: String, status: u16 },
    #[error("malformed order book: {0}")]
    Book(#[from] BookError),
}

pub enum MarketEvent {
    // Full depth snapshot for one venue, already normalised
    Snapshot {
        venue: String,
        book: OrderBook,
        latency: Duration,
    },
}

/// A venue able to hand out a fresh depth snapshot for one symbol.
#[async_trait::async_trait]
pub trait VenueAdapter: Send + Sync {
    /// Unique venue identifier, used as the snapshot table key.
    fn name(&self) -> &str;

    fn symbol(&self) -> &str;

    async fn fetch_depth(&self) -> Result<OrderBook, AdapterError>;
}

pub type SharedAdapter = Arc<dyn VenueAdapter>;

pub fn http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("arbx-rs/", env!("CARGO_PKG_VERSION")))
        .build()
}

pub(crate) fn check_status(venue: &str, res: reqwest::Response) -> Result<reqwest::Response, AdapterError> {
    let status = res.status();
    if status.is_success() {
        Ok(res)
    } else {
        Err(AdapterError::Status { venue: venue.to_string(), status: status.as_u16() })
    }
}

/// Builds one adapter per enabled venue. Called once at startup.
pub fn build_adapters(settings: &Settings) -> Result<Vec<SharedAdapter>, AdapterError> {
    let client = http_client(settings.fetch_timeout())?;
    let normaliser = Normaliser::new(settings.max_book_depth);

    let mut adapters: Vec<SharedAdapter> = Vec::new();
    for (name, venue) in settings.venues.iter().filter(|(_, v)| v.enabled) {
        let adapter: SharedAdapter = match venue.kind {
            VenueKind::Bitfinex => Arc::new(bitfinex::BitfinexAdapter::new(
                name,
                &venue.symbol,
                venue.api_url.as_deref(),
                client.clone(),
                normaliser,
            )),
            VenueKind::Gemini => Arc::new(gemini::GeminiAdapter::new(
                name,
                &venue.symbol,
                venue.api_url.as_deref(),
                client.clone(),
                normaliser,
            )),
            VenueKind::Hyperliquid => Arc::new(hyperliquid::HyperliquidAdapter::new(
                name,
                &venue.symbol,
                venue.api_url.as_deref(),
                client.clone(),
                normaliser,
            )),
        };
        tracing::info!(venue = %name, kind = ?venue.kind, symbol = %venue.symbol, "Configured venue adapter");
        adapters.push(adapter);
    }
    Ok(adapters)
}

pub mod bitfinex;
pub mod gemini;
pub mod hyperliquid;
pub mod hyperliquid_types;
pub mod rest_types;
