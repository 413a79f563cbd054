use rust_decimal::Decimal;
use tracing::{instrument, trace};

use crate::engine::types::{BookError, PriceLevel, Side};

/// One venue's depth snapshot.
///
/// Bids are held best-first (descending price), asks best-first (ascending
/// price). A snapshot is never edited after it is built; a refresh replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderBook {
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

impl OrderBook {
    pub fn new(bids: Vec<PriceLevel>, asks: Vec<PriceLevel>) -> Self {
        Self { bids, asks }
    }

    /// Builds a book from `(price, amount)` pairs already in best-first order.
    pub fn from_pairs(bids: &[(Decimal, Decimal)], asks: &[(Decimal, Decimal)]) -> Self {
        let side = |levels: &[(Decimal, Decimal)]| -> Vec<PriceLevel> {
            levels.iter().map(|&(p, a)| PriceLevel::new(p, a)).collect()
        };
        Self { bids: side(bids), asks: side(asks) }
    }

    #[instrument(level = "trace", skip(self))]
    pub fn best_bid(&self) -> Option<PriceLevel> {
        let best = self.bids.first().copied();
        trace!(?best, "best bid");
        best
    }

    #[instrument(level = "trace", skip(self))]
    pub fn best_ask(&self) -> Option<PriceLevel> {
        let best = self.asks.first().copied();
        trace!(?best, "best ask");
        best
    }

    pub fn spread(&self) -> Option<Decimal> {
        let bid = self.best_bid()?;
        let ask = self.best_ask()?;
        Some(ask.price - bid.price)
    }

    // Either side empty means the book can't take part in a crossing pair
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() || self.asks.is_empty()
    }

    pub fn depth(&self) -> (usize, usize) {
        (self.bids.len(), self.asks.len())
    }

    /// Total amount resting in `bids[0..=depth]`, `None` if the sum overflows.
    pub fn bid_capacity(&self, depth: usize) -> Option<Decimal> {
        Self::capacity(&self.bids, depth)
    }

    pub fn ask_capacity(&self, depth: usize) -> Option<Decimal> {
        Self::capacity(&self.asks, depth)
    }

    fn capacity(levels: &[PriceLevel], depth: usize) -> Option<Decimal> {
        levels
            .iter()
            .take(depth + 1)
            .try_fold(Decimal::ZERO, |total, l| total.checked_add(l.amount))
    }

    /// Checks the ordering and positivity invariants of a snapshot.
    pub fn validate(&self) -> Result<(), BookError> {
        Self::validate_side(Side::BID, &self.bids, |prev, next| prev > next)?;
        Self::validate_side(Side::ASK, &self.asks, |prev, next| prev < next)?;
        if let (Some(bid), Some(ask)) = (self.best_bid(), self.best_ask()) {
            if bid.price >= ask.price {
                return Err(BookError::Crossed { best_bid: bid.price, best_ask: ask.price });
            }
        }
        Ok(())
    }

    fn validate_side(
        side: Side,
        levels: &[PriceLevel],
        better: impl Fn(Decimal, Decimal) -> bool,
    ) -> Result<(), BookError> {
        for (index, level) in levels.iter().enumerate() {
            if level.price <= Decimal::ZERO {
                return Err(BookError::NonPositivePrice { side, price: level.price });
            }
            if level.amount <= Decimal::ZERO {
                return Err(BookError::NonPositiveAmount { side, price: level.price, amount: level.amount });
            }
            if index > 0 && !better(levels[index - 1].price, level.price) {
                return Err(BookError::OutOfOrder { side, index });
            }
        }
        Ok(())
    }
}
