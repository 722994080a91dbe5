//! Generate Rust test suites from CommonMark specification documents.
//!
//! [`parser::parse`] turns a spec document into its examples;
//! [`emitter::emit`] writes them out as one test module per section.

pub mod cli;
pub mod commands;
pub mod config;
pub mod emitter;
pub mod error;
pub mod input;
pub mod logging;
pub mod parser;
pub mod render;

pub use error::GenerateError;
pub use parser::{SpecExample, parse};
