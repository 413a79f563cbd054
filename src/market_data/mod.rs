// Market data module entrypoint
pub mod adapters;       // venue-specific depth fetchers
pub mod normaliser;     // converts wire strings -> validated books
pub mod snapshot_table; // latest book per venue
pub mod router;         // fans fetches out, fans books into the table
