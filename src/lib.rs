//! # Chainbridge Command Dispatcher
//!
//! This library assembles a command-line interface from independently
//! developed command trees and executes the one the user selected. It is the
//! core of the `chainbridge` binary, but any tool that composes several
//! command trees under one root can use it.
//!
//! ## Quick Example
//!
//! ```
//! use chainbridge::command::{compose, single_action, CommandNode};
//! use chainbridge::dispatch::{dispatch, Outcome};
//! use chainbridge::error::Error;
//! use chainbridge::options::OptionRegistry;
//!
//! let deploy = CommandNode::new("deploy")
//!     .about("Deploy bridge contracts")
//!     .action(|_ctx| Ok(()));
//! let evm = CommandNode::new("evm").with_child(deploy).unwrap();
//!
//! let mut root = CommandNode::new("chainbridge");
//! OptionRegistry::standard("chainbridge").bind(&mut root).unwrap();
//! compose(&mut root, [single_action("run", "Run example app", || Ok(())), evm]).unwrap();
//!
//! assert_eq!(dispatch(&root, ["evm", "deploy"]).unwrap(), Outcome::Completed);
//! assert!(matches!(
//!     dispatch(&root, ["evm", "missing"]),
//!     Err(Error::UnresolvedCommand { .. })
//! ));
//! ```
//!
//! ## Core Concepts
//!
//! - **Command tree (`command`)**: named nodes with optional actions and
//!   ordered children. The root only groups the subtrees contributed by
//!   collaborators.
//! - **Option registry (`options`)**: global options bound once to the root
//!   and inherited by every node.
//! - **Configuration (`config`)**: the resolved value of every global option,
//!   layered from command line, environment, configuration file and
//!   defaults.
//! - **Dispatcher (`dispatch`)**: resolves an argument vector to a node and
//!   runs its action.
//! - **Reporter (`reporter`)**: turns the result into diagnostics and an
//!   exit status.
//! - **Application (`app`)**: assembles all of the above for a binary.
//!
//! ## Execution Flow
//!
//! 1.  **Registration**: global options are registered and bound to the root.
//! 2.  **Composition**: command subtrees are appended to the root in order.
//! 3.  **Resolution**: argv is walked down the tree to the selected node.
//! 4.  **Execution**: the selected node's action runs once with its context.
//! 5.  **Reporting**: the outcome becomes output and an exit status.

pub mod app;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod exit_codes;
pub mod help;
pub mod logging;
pub mod options;
pub mod output;
pub mod reporter;
pub mod suggestions;

#[cfg(test)]
mod command_proptest;
