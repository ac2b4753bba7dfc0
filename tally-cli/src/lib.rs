//! Tally CLI - command-line interface for tally migrations.
//!
//! This crate provides the `tally` binary: inspecting migration status,
//! applying and retrying migrations, overriding ledger state and scaffolding
//! new migrations.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
