//! Domain types for the two-stage research pipeline.

pub mod config;
pub mod content;
pub mod insight;
pub mod links;
pub mod report;
pub mod request;
