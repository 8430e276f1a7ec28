//! Source location types shared by the analysis and the reporters.

pub mod source;

pub use source::{SourceContext, SourceLocation};
