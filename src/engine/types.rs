use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    BID,
    ASK,
}

// One resting rung of a venue book. price and amount are always > 0 once normalised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: Decimal,
    pub amount: Decimal,
}

impl PriceLevel {
    pub fn new(price: Decimal, amount: Decimal) -> Self {
        Self { price, amount }
    }
}

/// Result of walking two books for one `(ask_depth, bid_depth)` level pair.
///
/// `buy_price` / `sell_price` are the un-weighted level prices at the winning
/// depths; `profit_for` leaves them at zero and the matcher fills them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpportunityResult {
    pub profit: Decimal,
    pub volume: Decimal,
    pub weighted_buy_price: Decimal,
    pub weighted_sell_price: Decimal,
    pub buy_price: Decimal,
    pub sell_price: Decimal,
}

impl OpportunityResult {
    pub fn is_empty(&self) -> bool {
        self.volume.is_zero() || self.buy_price.is_zero()
    }
}

// Event handed to the notification sink for every opportunity that clears the gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Opportunity {
    pub ask_venue: String,
    pub bid_venue: String,
    pub profit: Decimal,
    pub volume: Decimal,
    pub buy_price: Decimal,
    pub sell_price: Decimal,
    pub percent_spread: Decimal,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BookError {
    #[error("invalid {field} {value:?} on {side:?} side")]
    InvalidNumber { side: Side, field: &'static str, value: String },
    #[error("non-positive price {price} on {side:?} side")]
    NonPositivePrice { side: Side, price: Decimal },
    #[error("non-positive amount {amount} at {price} on {side:?} side")]
    NonPositiveAmount { side: Side, price: Decimal, amount: Decimal },
    #[error("amount at {price} on {side:?} side overflows")]
    AmountOverflow { side: Side, price: Decimal },
    #[error("{side:?} side out of order at level {index}")]
    OutOfOrder { side: Side, index: usize },
    #[error("crossed book: best bid {best_bid} >= best ask {best_ask}")]
    Crossed { best_bid: Decimal, best_ask: Decimal },
}
