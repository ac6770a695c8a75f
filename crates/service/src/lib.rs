//! Fetch pipeline and search session for photo-search
//!
//! Turns search pages into photo records: one paired location/image fetch per
//! result under a global admission gate, with progress, status and record
//! events for the presentation layer.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::let_underscore_untyped, reason = "Type is clear from context")]
#![allow(clippy::let_underscore_must_use, reason = "Intentionally ignoring results")]
#![allow(let_underscore_drop, reason = "Intentionally dropping values")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short error vars are idiomatic")]

mod config;
mod error;
mod events;
mod fan_out;
mod gate;
mod paired_fetcher;
mod result_set;
mod session;

#[cfg(test)]
mod test_support;

pub use config::{MAX_PER_PAGE, SessionConfig};
pub use error::{ConfigError, PairError, PairHalf, ServiceError};
pub use events::FetchEvents;
pub use fan_out::{BoundedFanOutFetcher, PageContext, PageSummary};
pub use gate::{AdmissionGate, AdmissionPermit};
pub use paired_fetcher::{PairedResourceFetcher, decode_image};
pub use result_set::ResultSet;
pub use session::{PageLoad, SearchSession};
