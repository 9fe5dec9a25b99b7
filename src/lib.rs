//! Job-posting normalization and job-market aggregation.
//!
//! Raw postings (scraped HTML or a saved CSV dataset) are normalized into
//! [`model::JobRecord`]s by [`record::RecordBuilder`] using the text extractors
//! in [`extract`], narrowed with a [`filter::FilterSpec`], and summarized by
//! [`aggregate`] and [`report`].

pub mod aggregate;
pub mod conf;
pub mod extract;
pub mod filter;
pub mod ingest;
pub mod model;
pub mod record;
pub mod report;
pub mod stats;
pub mod store;
