// Source: https://api.hyperliquid.xyz/info  {"type": "l2Book", "coin": ...}
#[derive(Debug, serde::Deserialize)]
pub struct L2Book {
    pub coin: String,
    pub levels: (Vec<L2Level>, Vec<L2Level>), // (bids, asks)
    pub time: u64,
}

#[derive(Debug, serde::Deserialize)]
pub struct L2Level {
    pub px: String, // price string, e.g. "1234.56"
    pub sz: String, // size string, e.g. "0.01"
    pub n: u32,     // number of orders at this level
}

#[derive(Debug, serde::Serialize)]
pub struct L2BookRequest<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub coin: &'a str,
}

impl<'a> L2BookRequest<'a> {
    pub fn new(coin: &'a str) -> Self {
        Self { kind: "l2Book", coin }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_l2_book() {
        let raw = r#"{
            "coin": "ETH",
            "time": 1754450974231,
            "levels": [
                [{"px": "3650.1", "sz": "12.5", "n": 3}, {"px": "3650.0", "sz": "1.0", "n": 1}],
                [{"px": "3650.3", "sz": "4.2", "n": 2}]
            ]
        }"#;
        let book: L2Book = serde_json::from_str(raw).unwrap();
        assert_eq!(book.coin, "ETH");
        assert_eq!(book.levels.0.len(), 2);
        assert_eq!(book.levels.1[0].px, "3650.3");
        assert_eq!(book.levels.1[0].n, 2);
    }

    #[test]
    fn test_request_body() {
        let body = serde_json::to_value(L2BookRequest::new("BTC")).unwrap();
        assert_eq!(body, serde_json::json!({"type": "l2Book", "coin": "BTC"}));
    }
}
