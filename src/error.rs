//! # Error Handling
//!
//! This module defines the centralized error type for the `chainbridge`
//! dispatcher. Every failure that can happen between process start and the
//! end of one command invocation is a variant of [`Error`], and every
//! variant travels up to the execution reporter as a plain `Result` value.
//!
//! ## Error Kinds
//!
//! - **Startup errors** (`DuplicateOption`, `DuplicateCommand`, `Config`):
//!   the command tree or its configuration could not be assembled.
//! - **Usage errors** (`UnresolvedCommand`, `NoAction`, `InvalidArguments`,
//!   `InvalidOptionValue`): the argument vector does not describe a runnable
//!   command.
//! - **Action failures** (`ActionFailed`): the selected command ran and
//!   returned an error. The cause is opaque to the dispatcher and is
//!   forwarded verbatim.
//!
//! Actions themselves return `anyhow::Result<()>`, which keeps collaborator
//! code free of this crate's error type.

use std::path::PathBuf;

use thiserror::Error;

use crate::exit_codes;
use crate::suggestions;

/// Main error type for chainbridge operations
#[derive(Error, Debug)]
pub enum Error {
    /// A global option name (or short flag) was registered twice, or the
    /// registry was bound to the same root more than once.
    #[error("{}", duplicate_option(name))]
    DuplicateOption { name: String },

    /// Two sibling commands share a name.
    #[error("command \"{name}\" is already registered under \"{parent}\"")]
    DuplicateCommand { name: String, parent: String },

    /// An argument did not match any subcommand of a node that has no action.
    #[error("unknown command \"{token}\" for \"{path}\"{}", suggestions::did_you_mean(suggestions))]
    UnresolvedCommand {
        token: String,
        path: String,
        /// Sibling names close to `token`, in registration order
        suggestions: Vec<String>,
    },

    /// The selected node is a pure grouping node.
    ///
    /// Carries the node's rendered help so the reporter can show it in place
    /// of an error message.
    #[error("\"{path}\" requires a subcommand")]
    NoAction { path: String, help: String },

    /// Option parsing for the selected node failed.
    #[error("{message}")]
    InvalidArguments { path: String, message: String },

    /// A resolved option value could not be converted to the requested type.
    #[error("invalid value '{value}' for option '--{name}': {message}")]
    InvalidOptionValue {
        name: String,
        value: String,
        message: String,
    },

    /// The configuration file could not be read or parsed.
    #[error("Configuration file error: {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// The selected command's action returned an error.
    #[error("command \"{path}\" failed: {cause:#}")]
    ActionFailed { path: String, cause: anyhow::Error },
}

/// Result type alias for chainbridge operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Process exit status for this error.
    ///
    /// Usage errors exit with [`exit_codes::USAGE`]; action failures and
    /// startup errors exit with [`exit_codes::FAILURE`].
    pub fn exit_code(&self) -> u8 {
        if self.is_usage() {
            exit_codes::USAGE
        } else {
            exit_codes::FAILURE
        }
    }

    /// Whether this error is reported with the `fatal` severity marker.
    ///
    /// Everything except an action's own failure is fatal.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::ActionFailed { .. })
    }

    /// Whether the argument vector, not the program, is at fault.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Error::UnresolvedCommand { .. }
                | Error::NoAction { .. }
                | Error::InvalidArguments { .. }
                | Error::InvalidOptionValue { .. }
        )
    }

    /// The command path a usage error refers to, if known.
    pub fn command_path(&self) -> Option<&str> {
        match self {
            Error::UnresolvedCommand { path, .. }
            | Error::NoAction { path, .. }
            | Error::InvalidArguments { path, .. }
            | Error::ActionFailed { path, .. } => Some(path),
            _ => None,
        }
    }
}

fn duplicate_option(name: &str) -> String {
    if name.is_empty() {
        "global options are already bound".to_string()
    } else {
        format!("option '--{name}' is already registered")
    }
}
