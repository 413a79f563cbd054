// Hyperliquid adapter: one POST /info l2Book snapshot per cycle

use super::hyperliquid_types::{L2Book, L2BookRequest, L2Level};
use super::{check_status, AdapterError, VenueAdapter};
use crate::engine::book::OrderBook;
use crate::market_data::normaliser::Normaliser;
use tracing::{debug, instrument};

pub const HYPERLIQUID_API_URL: &str = "https://api.hyperliquid.xyz";

pub struct HyperliquidAdapter {
    pub name: String,
    pub coin: String,     // e.g. "ETH"
    pub info_url: String, // "https://api.hyperliquid.xyz/info"
    client: reqwest::Client,
    normaliser: Normaliser,
}

impl HyperliquidAdapter {
    pub fn new(
        name: &str,
        coin: &str,
        api_url: Option<&str>,
        client: reqwest::Client,
        normaliser: Normaliser,
    ) -> Self {
        let base = api_url.unwrap_or(HYPERLIQUID_API_URL).trim_end_matches('/');
        Self {
            name: name.to_string(),
            coin: coin.to_uppercase(),
            info_url: format!("{base}/info"),
            client,
            normaliser,
        }
    }

    fn pairs(side: &[L2Level]) -> impl Iterator<Item = (&str, &str)> {
        side.iter().map(|lvl| (lvl.px.as_str(), lvl.sz.as_str()))
    }
}

#[async_trait::async_trait]
impl VenueAdapter for HyperliquidAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn symbol(&self) -> &str {
        &self.coin
    }

    #[instrument(level = "debug", skip_all)]
    async fn fetch_depth(&self) -> Result<OrderBook, AdapterError> {
        let res = self
            .client
            .post(&self.info_url)
            .json(&L2BookRequest::new(&self.coin))
            .send()
            .await?;
        let raw: L2Book = check_status(&self.name, res)?.json().await?;

        let (bids, asks) = &raw.levels;
        let book = self.normaliser.book(Self::pairs(bids), Self::pairs(asks))?;
        debug!(venue = %self.name, coin = %raw.coin, ts_ms = raw.time, bids = book.bids.len(), asks = book.asks.len(), "Fetched depth");
        Ok(book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_url() {
        let adapter =
            HyperliquidAdapter::new("hyperliquid", "btc", None, reqwest::Client::new(), Normaliser::new(25));
        assert_eq!(adapter.info_url, "https://api.hyperliquid.xyz/info");
        assert_eq!(adapter.symbol(), "BTC");

        let local = HyperliquidAdapter::new(
            "hl-local",
            "eth",
            Some("http://localhost:3001/"),
            reqwest::Client::new(),
            Normaliser::new(25),
        );
        assert_eq!(local.info_url, "http://localhost:3001/info");
    }
}
