//! Hoist - repeated expression finder for JavaScript and TypeScript
//!
//! Hoist is a CLI tool and library that finds expressions evaluated more
//! than once in the same function, method or initializer and that could be
//! extracted into a single local variable without changing behavior.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (commands and reporting)
//! - `config`: Configuration file loading and parsing
//! - `core`: Analysis engine (parsing, collection, filtering, grouping)
//! - `issues`: Issue type definitions for reporting

pub mod cli;
pub mod config;
pub mod core;
pub mod issues;
