//! Command-line interface
//!
//! Argument definitions and command handlers for the `vague` binary.

pub mod args;
pub mod commands;
