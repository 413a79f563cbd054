use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::engine::book::OrderBook;

#[derive(Debug, Clone)]
pub struct VenueSnapshot {
    pub book: OrderBook,
    pub updated_at: Instant,
}

/// Latest order book per venue.
///
/// Entries survive across cycles; a venue that fails to refresh keeps its
/// previous snapshot. Only the synchronizer's collector writes here, and the
/// matcher only reads, never at the same time.
#[derive(Debug, Clone, Default)]
pub struct VenueSnapshotTable {
    // venue name -> snapshot, ordered so matching passes are deterministic
    books: BTreeMap<String, VenueSnapshot>,
}

impl VenueSnapshotTable {
    pub fn new() -> Self {
        Self { books: BTreeMap::new() }
    }

    // Replace the venue's whole book with a fresh snapshot
    pub fn apply_snapshot(&mut self, venue: &str, book: OrderBook) {
        self.books.insert(venue.to_string(), VenueSnapshot { book, updated_at: Instant::now() });
    }

    pub fn get(&self, venue: &str) -> Option<&OrderBook> {
        self.books.get(venue).map(|s| &s.book)
    }

    pub fn age(&self, venue: &str, now: Instant) -> Option<Duration> {
        self.books.get(venue).map(|s| now.saturating_duration_since(s.updated_at))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OrderBook)> {
        self.books.iter().map(|(venue, s)| (venue.as_str(), &s.book))
    }

    pub fn venues(&self) -> impl Iterator<Item = &str> {
        self.books.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}
