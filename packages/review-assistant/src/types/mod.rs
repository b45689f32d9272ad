//! Data types shared by the collection and query pipelines.

pub mod config;
pub mod query;
pub mod record;
pub mod report;
