pub mod book;     // per-venue depth snapshot
pub mod matcher;  // crossing pairs + depth-weighted profit search
pub mod types;
