//! Cross-venue opportunity matching.
//!
//! For every ordered pair of distinct venues the matcher treats one venue as
//! the place to buy (walking its asks) and the other as the place to sell
//! (walking its bids). Only pairs whose top of book crosses are examined, and
//! within a pair only the levels that still beat the opposite best price.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, instrument, trace, warn};

use crate::engine::book::OrderBook;
use crate::engine::types::{Opportunity, OpportunityResult, PriceLevel};
use crate::market_data::snapshot_table::VenueSnapshotTable;

/// Largest tolerated gap between the filled buy and sell amounts.
pub const VOLUME_EPSILON: Decimal = dec!(0.00001);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatcherConfig {
    /// Upper bound on the amount traded per opportunity.
    pub max_tx_volume: Decimal,
    /// Opportunities smaller than this are dropped before the threshold gate.
    pub min_tx_volume: Decimal,
    /// Absolute profit that must be exceeded to report.
    pub profit_threshold: Decimal,
    /// Spread in percent of the buy price that must be exceeded to report.
    pub percent_threshold: Decimal,
}

impl MatcherConfig {
    pub fn new(max_tx_volume: Decimal) -> Self {
        Self {
            max_tx_volume,
            min_tx_volume: Decimal::ZERO,
            profit_threshold: Decimal::ZERO,
            percent_threshold: Decimal::ZERO,
        }
    }

    #[must_use]
    pub fn with_min_tx_volume(mut self, volume: Decimal) -> Self {
        self.min_tx_volume = volume;
        self
    }

    #[must_use]
    pub fn with_profit_threshold(mut self, profit: Decimal) -> Self {
        self.profit_threshold = profit;
        self
    }

    #[must_use]
    pub fn with_percent_threshold(mut self, percent: Decimal) -> Self {
        self.percent_threshold = percent;
        self
    }
}

#[derive(Debug, Clone)]
pub struct OpportunityMatcher {
    config: MatcherConfig,
}

impl OpportunityMatcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Runs one matching pass over the table and returns every opportunity
    /// that clears the reporting gate, in venue-name order.
    #[instrument(level = "debug", skip_all, fields(venues = table.len()))]
    pub fn run(&self, table: &VenueSnapshotTable) -> Vec<Opportunity> {
        let mut found = Vec::new();

        for (ask_venue, ask_book) in table.iter() {
            for (bid_venue, bid_book) in table.iter().filter(|(venue, _)| *venue != ask_venue) {
                if let Some(opportunity) = self.evaluate_pair(ask_venue, ask_book, bid_venue, bid_book) {
                    found.push(opportunity);
                }
            }
        }

        debug!(count = found.len(), "Matching pass completed");
        found
    }

    /// Buys on `ask_venue`, sells on `bid_venue`.
    pub fn evaluate_pair(
        &self,
        ask_venue: &str,
        ask_book: &OrderBook,
        bid_venue: &str,
        bid_book: &OrderBook,
    ) -> Option<Opportunity> {
        let (best_ask, best_bid) = match (ask_book.best_ask(), bid_book.best_bid()) {
            (Some(ask), Some(bid)) => (ask, bid),
            _ => {
                trace!(ask_venue, bid_venue, "Skipping pair with an empty side");
                return None;
            }
        };

        if best_ask.price >= best_bid.price {
            return None;
        }

        debug!(ask_venue, bid_venue, ask = %best_ask.price, bid = %best_bid.price, "Crossing pair");
        let result = self.best_depth_opportunity(ask_book, bid_book);
        self.gate(ask_venue, bid_venue, &result)
    }

    /// Searches every level pair inside the `max_depth` bounds and keeps the
    /// one with the highest strictly positive profit. Ties keep the first
    /// pair found. Returns a zero result when nothing is profitable.
    pub fn best_depth_opportunity(&self, ask_book: &OrderBook, bid_book: &OrderBook) -> OpportunityResult {
        if ask_book.asks.is_empty() || bid_book.bids.is_empty() {
            return OpportunityResult::default();
        }

        let (max_ask, max_bid) = max_depth(ask_book, bid_book);
        let mut best: Option<(usize, usize, OpportunityResult)> = None;

        for i in 0..=max_ask {
            for j in 0..=max_bid {
                let candidate = self.profit_for(ask_book, bid_book, i, j);
                if candidate.profit <= Decimal::ZERO {
                    continue;
                }
                let better = match &best {
                    Some((_, _, current)) => candidate.profit > current.profit,
                    None => true,
                };
                if better {
                    best = Some((i, j, candidate));
                }
            }
        }

        match best {
            Some((i, j, mut result)) => {
                result.buy_price = ask_book.asks[i].price;
                result.sell_price = bid_book.bids[j].price;
                trace!(ask_depth = i, bid_depth = j, profit = %result.profit, "Best level pair");
                result
            }
            None => OpportunityResult::default(),
        }
    }

    /// Depth-weighted profit of buying asks `0..=ask_depth` on one venue and
    /// selling into bids `0..=bid_depth` on the other. A level pair whose
    /// amounts or notionals overflow `Decimal` yields the zero result.
    pub fn profit_for(
        &self,
        ask_book: &OrderBook,
        bid_book: &OrderBook,
        ask_depth: usize,
        bid_depth: usize,
    ) -> OpportunityResult {
        let (ask_level, bid_level) = match (ask_book.asks.get(ask_depth), bid_book.bids.get(bid_depth)) {
            (Some(ask), Some(bid)) => (ask, bid),
            _ => return OpportunityResult::default(),
        };
        if ask_level.price >= bid_level.price {
            return OpportunityResult::default();
        }

        let max_amount = match (ask_book.ask_capacity(ask_depth), bid_book.bid_capacity(bid_depth)) {
            (Some(buy), Some(sell)) => buy.min(sell).min(self.config.max_tx_volume),
            _ => {
                warn!(ask_depth, bid_depth, "Book capacity overflows, skipping level pair");
                return OpportunityResult::default();
            }
        };

        let fills = weighted_fill(&ask_book.asks[..=ask_depth], max_amount)
            .zip(weighted_fill(&bid_book.bids[..=bid_depth], max_amount));
        let ((buy_total, weighted_buy_price), (sell_total, weighted_sell_price)) = match fills {
            Some(fills) => fills,
            None => {
                warn!(ask_depth, bid_depth, "Notional overflows, skipping level pair");
                return OpportunityResult::default();
            }
        };

        // both walks stop at max_amount, which neither capacity is below, so the totals agree
        if (sell_total - buy_total).abs() > VOLUME_EPSILON {
            warn!(%sell_total, %buy_total, ask_depth, bid_depth, "Filled volumes diverge");
        }

        let profit = sell_total
            .checked_mul(weighted_sell_price)
            .zip(buy_total.checked_mul(weighted_buy_price))
            .and_then(|(proceeds, cost)| proceeds.checked_sub(cost));
        let Some(profit) = profit else {
            warn!(ask_depth, bid_depth, "Profit overflows, skipping level pair");
            return OpportunityResult::default();
        };

        OpportunityResult {
            profit,
            volume: sell_total,
            weighted_buy_price,
            weighted_sell_price,
            buy_price: Decimal::ZERO,
            sell_price: Decimal::ZERO,
        }
    }

    fn gate(&self, ask_venue: &str, bid_venue: &str, result: &OpportunityResult) -> Option<Opportunity> {
        if result.is_empty() {
            return None;
        }

        let percent_spread = (result.weighted_sell_price - result.weighted_buy_price)
            .checked_div(result.buy_price)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED));
        let Some(percent_spread) = percent_spread else {
            warn!(ask_venue, bid_venue, buy_price = %result.buy_price, "Percent spread overflows");
            return None;
        };
        debug!(ask_venue, bid_venue, profit = %result.profit, %percent_spread, "Evaluated opportunity");

        if result.volume < self.config.min_tx_volume {
            debug!(volume = %result.volume, min = %self.config.min_tx_volume, "Below minimum volume");
            return None;
        }
        if result.profit <= self.config.profit_threshold || percent_spread <= self.config.percent_threshold {
            return None;
        }

        Some(Opportunity {
            ask_venue: ask_venue.to_string(),
            bid_venue: bid_venue.to_string(),
            profit: result.profit,
            volume: result.volume,
            buy_price: result.buy_price,
            sell_price: result.sell_price,
            percent_spread,
        })
    }
}

/// Deepest ask index still below the best bid and deepest bid index still
/// above the best ask. Both are 0 when either book side is empty.
pub fn max_depth(ask_book: &OrderBook, bid_book: &OrderBook) -> (usize, usize) {
    let (best_ask, best_bid) = match (ask_book.best_ask(), bid_book.best_bid()) {
        (Some(ask), Some(bid)) => (ask, bid),
        _ => return (0, 0),
    };

    let ask_depth = ask_book
        .asks
        .iter()
        .take_while(|level| level.price < best_bid.price)
        .count()
        .saturating_sub(1);
    let bid_depth = bid_book
        .bids
        .iter()
        .take_while(|level| level.price > best_ask.price)
        .count()
        .saturating_sub(1);

    (ask_depth, bid_depth)
}

// Returns (filled amount, volume-weighted price) after consuming levels up to
// cap, or None if the notional overflows.
fn weighted_fill(levels: &[PriceLevel], cap: Decimal) -> Option<(Decimal, Decimal)> {
    let mut total = Decimal::ZERO;
    let mut notional = Decimal::ZERO;

    for level in levels {
        // total never exceeds cap
        let amount = (cap - total).min(level.amount);
        if amount <= Decimal::ZERO {
            break;
        }
        notional = notional.checked_add(level.price.checked_mul(amount)?)?;
        total += amount;
    }

    if total.is_zero() {
        return Some((Decimal::ZERO, Decimal::ZERO));
    }
    Some((total, notional.checked_div(total)?))
}
