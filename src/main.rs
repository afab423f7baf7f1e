//! # Chainbridge CLI
//!
//! This is the binary entry point for the `chainbridge` command-line tool.
//!
//! Its primary responsibilities are:
//! - Assembling the command tree from the binary's own commands and the
//!   collaborators' subtrees.
//! - Executing the command selected by the process arguments.
//! - Turning the outcome into diagnostics and the process exit code.
//!
//! The dispatcher itself lives in the `lib.rs` library crate, so the binary
//! is a thin wrapper around reusable library functionality.

mod cli;
mod commands;

use std::process::ExitCode;

fn main() -> ExitCode {
    cli::execute()
}
