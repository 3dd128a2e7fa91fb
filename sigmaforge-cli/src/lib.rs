//! Sigmaforge CLI -- command-line interface for the Sigma conversion toolkit
//!
//! The binary entry point lives in `main.rs`; everything else is exposed
//! as a library so integration tests can drive command handlers directly.

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;
