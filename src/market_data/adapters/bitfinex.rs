// Bitfinex public order book, REST v1

use super::rest_types::V1Book;
use super::{check_status, AdapterError, VenueAdapter};
use crate::engine::book::OrderBook;
use crate::market_data::normaliser::Normaliser;
use tracing::{debug, instrument};

pub const BITFINEX_API_URL: &str = "https://api.bitfinex.com";

pub struct BitfinexAdapter {
    pub name: String,
    pub symbol: String,  // e.g. "btcusd"
    pub api_url: String, // "https://api.bitfinex.com"
    client: reqwest::Client,
    normaliser: Normaliser,
}

impl BitfinexAdapter {
    pub fn new(
        name: &str,
        symbol: &str,
        api_url: Option<&str>,
        client: reqwest::Client,
        normaliser: Normaliser,
    ) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_lowercase(),
            api_url: api_url.unwrap_or(BITFINEX_API_URL).trim_end_matches('/').to_string(),
            client,
            normaliser,
        }
    }

    pub fn book_url(&self) -> String {
        format!("{}/v1/book/{}", self.api_url, self.symbol)
    }
}

#[async_trait::async_trait]
impl VenueAdapter for BitfinexAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn symbol(&self) -> &str {
        &self.symbol
    }

    #[instrument(level = "debug", skip_all)]
    async fn fetch_depth(&self) -> Result<OrderBook, AdapterError> {
        let depth = self.normaliser.max_depth.to_string();
        let res = self
            .client
            .get(self.book_url())
            .query(&[("limit_bids", depth.as_str()), ("limit_asks", depth.as_str())])
            .send()
            .await?;
        let raw: V1Book = check_status(&self.name, res)?.json().await?;

        let book = self.normaliser.book(raw.bid_pairs(), raw.ask_pairs())?;
        debug!(venue = %self.name, bids = book.bids.len(), asks = book.asks.len(), "Fetched depth");
        Ok(book)
    }
}
