//! Core types and traits for photo-search
//!
//! This crate contains the domain types shared across all other crates and the
//! `PhotoSource` seam the fetch pipeline is written against.

mod constants;
mod env_config;
mod error;
mod photo;
mod search;
mod source;

pub use constants::*;
pub use env_config::*;
pub use error::*;
pub use photo::*;
pub use search::*;
pub use source::*;
