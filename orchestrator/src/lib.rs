//! # Purpose Orchestrator
//!
//! Birth-date personality and life-purpose report, produced by four model
//! agents run in sequence and served as a single-page web application.
//!
//! 1. **Analyzer**: six-part personality analysis (web search enabled)
//! 2. **Improver**: improvement points for each part of the analysis
//! 3. **Success Searcher**: people born on the same date, parsed into a table
//! 4. **Reporter**: final motivational report combining everything above

pub mod agents;
pub mod api;
pub mod birth_date;
pub mod config;
pub mod error;
pub mod extractor;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod pipeline;

pub use birth_date::{BirthDate, BirthDateError};
pub use extractor::{extract, SuccessTable};
pub use models::SuccessPersonRecord;
pub use pipeline::{FinalReport, Pipeline, PipelineError, PipelineSettings, Stage};
