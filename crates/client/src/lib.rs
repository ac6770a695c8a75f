//! Flickr client for photo-search.
//!
//! Implements [`photo_search_core::PhotoSource`] over the Flickr REST API and
//! the static image host.

mod api_types;
pub mod client;
pub mod error;


pub use client::FlickrClient;
pub use error::ClientError;
