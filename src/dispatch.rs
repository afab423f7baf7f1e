//! # Dispatcher
//!
//! Resolves an argument vector against a command tree and runs the selected
//! node's action.
//!
//! ## Resolution
//!
//! Starting at the root, leading tokens that name a child move the cursor
//! one level down. Registered global options may be interleaved with the
//! command names (`chainbridge --log-level debug evm deploy`); they are
//! collected and parsed together with the remaining tokens once the walk
//! stops. The walk stops at the first token that is not a child name, at a
//! bare `--`, or when the arguments run out.
//!
//! The node where the walk stops is the selected node:
//!
//! - an unmatched positional token at a node without an action fails with
//!   [`Error::UnresolvedCommand`];
//! - `-h`/`--help`, or `help <path>` at a grouping node, renders help;
//! - `-V`/`--version` at the root prints the version;
//! - a node without an action fails with [`Error::NoAction`];
//! - otherwise the leftover tokens are parsed as options and the action is
//!   returned ready to run.
//!
//! [`resolve`] performs all of this without running anything, so it can be
//! tested in isolation. [`dispatch`] resolves and then runs the action.

use std::ffi::OsString;

use crate::command::{CommandNode, Context};
use crate::config::{default_config_file, Config};
use crate::error::{Error, Result};
use crate::help::{parse_command, render_help};
use crate::suggestions::similar_commands;

/// Result of a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The selected action ran and succeeded.
    Completed,
    /// Help was requested; the text is meant for stdout.
    Help(String),
    /// The version was requested; the text is meant for stdout.
    Version(String),
}

/// What an argument vector resolves to.
#[derive(Debug)]
pub enum Resolution<'a> {
    Invoke(Invocation<'a>),
    Help(String),
    Version(String),
}

/// A selected action together with its parsed context.
#[derive(Debug)]
pub struct Invocation<'a> {
    node: &'a CommandNode,
    context: Context,
}

impl<'a> Invocation<'a> {
    pub fn node(&self) -> &'a CommandNode {
        self.node
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Run the action once.
    ///
    /// A failing action is wrapped in [`Error::ActionFailed`] with the
    /// command path; the cause itself is passed through untouched.
    pub fn run(self) -> Result<Outcome> {
        let path = self.context.command_line();
        let action = self.node.get_action().ok_or_else(|| Error::NoAction {
            path: path.clone(),
            help: String::new(),
        })?;
        log::debug!("running \"{path}\"");
        action(&self.context).map_err(|cause| Error::ActionFailed { path, cause })?;
        Ok(Outcome::Completed)
    }
}

/// Where the walk over the tree ended.
struct Walk<'a> {
    node: &'a CommandNode,
    path: Vec<String>,
    /// Tokens left for option parsing, global options included.
    rest: Vec<String>,
    /// Positional token that stopped the walk.
    stopped_at: Option<String>,
    /// Whether the walk went through the `help` command.
    help_command: bool,
    help: bool,
    version: bool,
}

fn walk<'a>(root: &'a CommandNode, argv: &[String]) -> Walk<'a> {
    let globals = root.globals();
    let mut node = root;
    let mut path = vec![root.name().to_string()];
    let mut rest = Vec::new();
    let mut help = false;
    let mut version = false;
    let mut help_command = false;
    let mut stopped_at = None;
    let mut separated = false;
    let mut tokens = argv.iter();

    while let Some(token) = tokens.next() {
        match token.as_str() {
            "--" => {
                rest.push(token.clone());
                separated = true;
                break;
            }
            "-h" | "--help" => {
                help = true;
                continue;
            }
            "-V" | "--version" if path.len() == 1 && !help_command => {
                version = true;
                continue;
            }
            _ => {}
        }

        if token.starts_with('-') && token.len() > 1 {
            let global = globals
                .iter()
                .find_map(|spec| spec.matches_token(token).map(|inline| (spec, inline)));
            match global {
                Some((spec, inline)) => {
                    rest.push(token.clone());
                    if spec.takes_value() && !inline {
                        if let Some(value) = tokens.next() {
                            rest.push(value.clone());
                        }
                    }
                    continue;
                }
                None => {
                    rest.push(token.clone());
                    break;
                }
            }
        }

        if let Some(child) = node.find(token) {
            node = child;
            path.push(token.clone());
            continue;
        }

        if token == "help" && !help_command && !node.children().is_empty() {
            help_command = true;
            help = true;
            continue;
        }

        stopped_at = Some(token.clone());
        rest.push(token.clone());
        break;
    }
    // `-h`/`--help` among the leftover tokens still selects help
    for token in tokens {
        if token == "--" {
            separated = true;
        } else if !separated && (token == "-h" || token == "--help") {
            help = true;
            continue;
        }
        rest.push(token.clone());
    }

    Walk {
        node,
        path,
        rest,
        stopped_at,
        help_command,
        help,
        version,
    }
}

/// Resolve `argv` against the tree under `root` without running anything.
///
/// `argv` excludes the program name. Global options must already be bound
/// to `root`.
pub fn resolve<I, T>(root: &CommandNode, argv: I) -> Result<Resolution<'_>>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let argv: Vec<String> = argv
        .into_iter()
        .map(|arg| arg.into().to_string_lossy().into_owned())
        .collect();
    let globals = root.globals();
    let walk = walk(root, &argv);
    let path = walk.path.join(" ");
    log::debug!("resolved {:?} to \"{}\"", argv, path);

    let unmatched = walk
        .stopped_at
        .filter(|_| walk.help_command || !walk.node.has_action());
    if let Some(token) = unmatched {
        let suggestions = similar_commands(
            &token,
            walk.node.children().iter().map(CommandNode::name),
        );
        return Err(Error::UnresolvedCommand {
            token,
            path,
            suggestions,
        });
    }

    if walk.help {
        return Ok(Resolution::Help(render_help(walk.node, globals, &path)));
    }

    if walk.version {
        let version = root.get_version().unwrap_or("unknown");
        return Ok(Resolution::Version(format!("{} {}\n", root.name(), version)));
    }

    let matches = match parse_command(walk.node, globals, &path).try_get_matches_from(&walk.rest) {
        Ok(matches) => matches,
        Err(e) => {
            return Err(Error::InvalidArguments {
                path,
                message: clap_message(&e),
            })
        }
    };

    if !walk.node.has_action() {
        return Err(Error::NoAction {
            help: render_help(walk.node, globals, &path),
            path,
        });
    }

    let default_file = default_config_file(root.name());
    let config = Config::resolve(globals, &matches, default_file.as_deref())?;

    Ok(Resolution::Invoke(Invocation {
        node: walk.node,
        context: Context::new(walk.path, config, matches),
    }))
}

/// Resolve `argv` and run the selected action.
pub fn dispatch<I, T>(root: &CommandNode, argv: I) -> Result<Outcome>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    match resolve(root, argv)? {
        Resolution::Invoke(invocation) => invocation.run(),
        Resolution::Help(text) => Ok(Outcome::Help(text)),
        Resolution::Version(text) => Ok(Outcome::Version(text)),
    }
}

/// First line of a `clap` error without its `error:` prefix.
fn clap_message(error: &clap::Error) -> String {
    let rendered = error.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).to_string()
}
