// Convert wire strings into a validated, best-first OrderBook.
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::engine::book::OrderBook;
use crate::engine::types::{BookError, PriceLevel, Side};

#[derive(Debug, Clone, Copy)]
pub struct Normaliser {
    pub max_depth: usize, // levels kept per side after sorting
}

impl Normaliser {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth: max_depth.max(1) }
    }

    pub fn parse_decimal(side: Side, field: &'static str, s: &str) -> Result<Decimal, BookError> {
        let s = s.trim();
        Decimal::from_str(s)
            .or_else(|_| Decimal::from_scientific(s))
            .map_err(|_| BookError::InvalidNumber { side, field, value: s.to_string() })
    }

    /// Parses one side of a book. Rungs with a non-positive amount are
    /// dropped, a non-positive price is an error, equal prices are merged
    /// and the result is sorted best-first and cut to `max_depth`.
    pub fn side<'a, I>(&self, side: Side, raw: I) -> Result<Vec<PriceLevel>, BookError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut levels = Vec::new();
        for (px, sz) in raw {
            let price = Self::parse_decimal(side, "price", px)?;
            let amount = Self::parse_decimal(side, "amount", sz)?;
            if amount <= Decimal::ZERO {
                continue;
            }
            if price <= Decimal::ZERO {
                return Err(BookError::NonPositivePrice { side, price });
            }
            levels.push(PriceLevel::new(price, amount));
        }

        match side {
            Side::BID => levels.sort_by(|a, b| b.price.cmp(&a.price)),
            Side::ASK => levels.sort_by(|a, b| a.price.cmp(&b.price)),
        }

        let mut merged: Vec<PriceLevel> = Vec::with_capacity(levels.len());
        for level in levels {
            match merged.last_mut() {
                Some(last) if last.price == level.price => {
                    last.amount = last
                        .amount
                        .checked_add(level.amount)
                        .ok_or(BookError::AmountOverflow { side, price: level.price })?;
                }
                _ => merged.push(level),
            }
        }
        merged.truncate(self.max_depth);
        Ok(merged)
    }

    pub fn book<'a, B, A>(&self, bids: B, asks: A) -> Result<OrderBook, BookError>
    where
        B: IntoIterator<Item = (&'a str, &'a str)>,
        A: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let book = OrderBook::new(self.side(Side::BID, bids)?, self.side(Side::ASK, asks)?);
        book.validate()?;
        Ok(book)
    }
}
