//! In-memory caches for photo-search.
//!
//! `MemoryCache` is a cost-bounded LRU map safe for concurrent use. Two
//! instances, bundled as `PhotoCaches`, hold decoded images and location
//! metadata; both are sized as a fraction of a `MemoryBudget`.

#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short closure params are idiomatic")]

mod budget;
mod memory;
mod photo_caches;
mod stats;
mod weight;

#[cfg(test)]
mod memory_tests;

pub use budget::MemoryBudget;
pub use memory::MemoryCache;
pub use photo_caches::PhotoCaches;
pub use stats::CacheStatsSnapshot;
pub use weight::CacheWeight;
