//! Cross-venue order book arbitrage scanner.
//!
//! Every cycle the [`market_data::router::SnapshotSynchronizer`] pulls a
//! depth snapshot from each configured venue, the
//! [`engine::matcher::OpportunityMatcher`] looks for venue pairs whose books
//! cross, and whatever clears the configured thresholds goes to a
//! [`notify::Notifier`].

pub mod bot;
pub mod config;
pub mod engine;
pub mod market_data;
pub mod notify;
pub mod telemetry;
