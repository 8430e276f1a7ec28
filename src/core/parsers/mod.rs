//! JavaScript/TypeScript parsing (swc) and span-to-text mapping.

pub mod source;

pub use source::{Dialect, ParsedSource, parse_snippet, parse_source};
