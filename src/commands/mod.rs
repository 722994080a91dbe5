//! Command implementations for the specgen CLI.

pub mod check;
pub mod config;
pub mod extract;
pub mod generate;
pub mod list;
