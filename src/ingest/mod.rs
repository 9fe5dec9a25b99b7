//! Job board ingestion: HTTP fetching and HTML parsing.

pub mod fetch;
pub mod page;

pub use fetch::{FetchError, Fetcher};
