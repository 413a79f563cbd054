// Gemini public order book, REST v1

use super::rest_types::V1Book;
use super::{check_status, AdapterError, VenueAdapter};
use crate::engine::book::OrderBook;
use crate::market_data::normaliser::Normaliser;
use tracing::{debug, instrument};

pub const GEMINI_API_URL: &str = "https://api.gemini.com";

pub struct GeminiAdapter {
    pub name: String,
    pub symbol: String,
    pub api_url: String,
    client: reqwest::Client,
    normaliser: Normaliser,
}

impl GeminiAdapter {
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
            api_url: api_url.unwrap_or(GEMINI_API_URL).trim_end_matches('/').to_string(),
            client,
            normaliser,
        }
    }

    pub fn book_url(&self) -> String {
        format!("{}/v1/book/{}", self.api_url, self.symbol)
    }
}

#[async_trait::async_trait]
impl VenueAdapter for GeminiAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn symbol(&self) -> &str {
        &self.symbol
    }

    #[instrument(level = "debug", skip_all)]
    async fn fetch_depth(&self) -> Result<OrderBook, AdapterError> {
        // Gemini accepts 0 for "everything"; ask only for what we keep
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_url() {
        let adapter = GeminiAdapter::new("gemini", "BTCUSD", None, reqwest::Client::new(), Normaliser::new(25));
        assert_eq!(adapter.book_url(), "https://api.gemini.com/v1/book/btcusd");
        assert_eq!(adapter.symbol(), "btcusd");

        let local = GeminiAdapter::new(
            "gemini-sandbox",
            "EthUsd",
            Some("http://127.0.0.1:8080/"),
            reqwest::Client::new(),
            Normaliser::new(25),
        );
        assert_eq!(local.book_url(), "http://127.0.0.1:8080/v1/book/ethusd");
        assert_eq!(local.name(), "gemini-sandbox");
    }
}
