//! # CLI Command Implementations
//!
//! Commands the `chainbridge` binary contributes to the tree itself. Each
//! module exposes a `command()` function returning its node and an
//! `execute` function holding the action.
//!
//! Collaborator subtrees (chain-specific command trees) are composed next to
//! these in [`crate::cli`].

pub mod run;
