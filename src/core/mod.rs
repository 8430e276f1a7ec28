//! Core analysis engine.
//!
//! ## Module Structure
//!
//! - `parsers`: swc parsing and span-to-text mapping (`ParsedSource`)
//! - `bodies`: declaration bodies analyzed independently
//! - `symbols`: file-level function/method return kinds
//! - `classify`, `bindings`: node classification and binding helpers
//! - `collect`: eligible occurrences of one body, outer before inner
//! - `filter`: extraction rules applied to each occurrence
//! - `aggregate`: grouping by exact text and line-span limit
//! - `naming`, `conflict`: suggested names and catch-block conflicts
//! - `driver`: per-body pipeline producing `ExtractionCandidate`s
//! - `context`: project scan, parallel parsing and per-file analysis

pub mod aggregate;
pub mod bindings;
pub mod bodies;
pub mod classify;
pub mod collect;
pub mod conflict;
pub mod context;
pub mod data;
pub mod driver;
pub mod file_scanner;
pub mod filter;
pub mod naming;
pub mod parsers;
pub mod symbols;


pub use bodies::{BodyId, BodyKind};
pub use classify::ExprKind;
pub use data::{SourceContext, SourceLocation};
pub use driver::{AnalysisConfig, Driver, ExtractionCandidate, OccurrenceSite};
pub use filter::SkipReason;
