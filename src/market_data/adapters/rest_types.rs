// Source: Bitfinex GET /v1/book/:symbol and Gemini GET /v1/book/:symbol share this shape
#[derive(Debug, serde::Deserialize)]
pub struct V1Book {
    #[serde(default)]
    pub bids: Vec<V1Entry>,
    #[serde(default)]
    pub asks: Vec<V1Entry>,
}

#[derive(Debug, serde::Deserialize)]
pub struct V1Entry {
    pub price: String,  // e.g. "9443.1"
    pub amount: String, // e.g. "0.25"
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl V1Book {
    pub fn bid_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bids.iter().map(|e| (e.price.as_str(), e.amount.as_str()))
    }

    pub fn ask_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.asks.iter().map(|e| (e.price.as_str(), e.amount.as_str()))
    }
}
