//! # Help and Completion Rendering
//!
//! The dispatcher walks [`CommandNode`] trees itself, but help text, option
//! parsing and shell completions are delegated to `clap`. This module
//! converts nodes into `clap::Command` values for those three purposes.
//!
//! - [`parse_command`]: the selected node's global and local options, with no
//!   subcommands, used to parse the leftover argument tokens.
//! - [`help_command`]: the node and its direct children, used to render
//!   `--help` output.
//! - [`tree_command`]: the whole tree, used by `clap_complete`.

use std::io::Write;

use clap::Command;
use clap_complete::{generate, Shell};

use crate::command::CommandNode;
use crate::options::OptionSpec;

fn base_command(node: &CommandNode, globals: &[OptionSpec]) -> Command {
    let mut command = Command::new(node.name().to_string())
        .disable_help_flag(true)
        .disable_version_flag(true)
        .args(globals.iter().map(OptionSpec::to_arg))
        .args(node.args().iter().cloned());
    if let Some(about) = node.get_about() {
        command = command.about(about.to_string());
    }
    if let Some(long_about) = node.get_long_about() {
        command = command.long_about(long_about.to_string());
    }
    command
}

/// Command used to parse the options of the selected node.
///
/// `path` is the command path shown in `clap`'s usage lines.
pub fn parse_command(node: &CommandNode, globals: &[OptionSpec], path: &str) -> Command {
    base_command(node, globals)
        .no_binary_name(true)
        .bin_name(path.to_string())
}

/// Command rendering the help of `node`, listing its direct children.
pub fn help_command(node: &CommandNode, globals: &[OptionSpec], path: &str) -> Command {
    let mut command = base_command(node, globals)
        .bin_name(path.to_string())
        .disable_help_flag(false)
        .subcommand_value_name("COMMAND");
    if let Some(version) = node.get_version() {
        command = command.version(version.to_string()).disable_version_flag(false);
    }
    if !node.has_action() && !node.children().is_empty() {
        command = command.subcommand_required(true);
    }
    command.subcommands(node.children().iter().map(|child| {
        let mut sub = Command::new(child.name().to_string());
        if let Some(about) = child.get_about() {
            sub = sub.about(about.to_string());
        }
        sub
    }))
}

/// Long help text of `node`.
pub fn render_help(node: &CommandNode, globals: &[OptionSpec], path: &str) -> String {
    help_command(node, globals, path)
        .render_long_help()
        .to_string()
}

/// Command describing the complete tree under `node`.
pub fn tree_command(node: &CommandNode, globals: &[OptionSpec]) -> Command {
    let mut command = base_command(node, globals).disable_help_flag(false);
    if let Some(version) = node.get_version() {
        command = command.version(version.to_string()).disable_version_flag(false);
    }
    command.subcommands(
        node.children()
            .iter()
            .map(|child| tree_command(child, &[])),
    )
}

/// Write a completion script for `shell` covering the tree under `root`.
pub fn write_completions(
    shell: Shell,
    root: &CommandNode,
    globals: &[OptionSpec],
    out: &mut dyn Write,
) {
    let mut command = tree_command(root, globals);
    let bin_name = root.name().to_string();
    generate(shell, &mut command, bin_name, out);
}
