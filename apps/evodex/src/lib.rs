//! # evodex
//!
//! Command-line front end for the Evodex evolution chain engine.
//!
//! The library half exists so integration tests can drive the commands and
//! the configuration loader directly; `main.rs` only sets up logging and
//! dispatches.

pub mod cli;
pub mod settings;
pub mod sprites;
