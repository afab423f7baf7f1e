//! # Command Tree
//!
//! A [`CommandNode`] is a named unit of work with an optional action, local
//! options and an ordered list of children. The program's root node has no
//! action; it only groups the subtrees contributed by collaborators.
//!
//! ## Assembly
//!
//! Trees are built by ordinary function calls returning owned values. A
//! parent exclusively owns its children; once the dispatcher starts
//! resolving arguments the tree is only read.
//!
//! ```
//! use chainbridge::command::{compose, single_action, CommandNode};
//!
//! let deploy = CommandNode::new("deploy")
//!     .about("Deploy bridge contracts")
//!     .action(|_ctx| Ok(()));
//! let evm = CommandNode::new("evm").about("EVM CLI").with_child(deploy).unwrap();
//!
//! let mut root = CommandNode::new("chainbridge");
//! compose(&mut root, [single_action("run", "Run example app", || Ok(())), evm]).unwrap();
//!
//! assert_eq!(root.children().len(), 2);
//! assert!(root.find("evm").and_then(|evm| evm.find("deploy")).is_some());
//! ```
//!
//! ## Collaborators
//!
//! A collaborator contributes either a whole subtree through
//! [`CommandProvider`], or a single no-argument callable wrapped with
//! [`single_action`].

use std::fmt;

use clap::{Arg, ArgMatches};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::options::{check_local_options, OptionSpec};

/// Callable run when its node is selected.
pub type Action = Box<dyn Fn(&Context) -> anyhow::Result<()>>;

/// Everything an action receives about its invocation.
#[derive(Debug)]
pub struct Context {
    path: Vec<String>,
    config: Config,
    matches: ArgMatches,
}

impl Context {
    pub fn new(path: Vec<String>, config: Config, matches: ArgMatches) -> Self {
        Self {
            path,
            config,
            matches,
        }
    }

    /// Names from the root to the selected node, root included.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// The command path as typed by the user, e.g. `chainbridge evm deploy`.
    pub fn command_line(&self) -> String {
        self.path.join(" ")
    }

    /// Resolved global options.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parsed local options of the selected node.
    pub fn matches(&self) -> &ArgMatches {
        &self.matches
    }
}

/// A named node in the command tree.
pub struct CommandNode {
    name: String,
    about: Option<String>,
    long_about: Option<String>,
    version: Option<String>,
    action: Option<Action>,
    args: Vec<Arg>,
    globals: Vec<OptionSpec>,
    bound: bool,
    children: Vec<CommandNode>,
}

impl CommandNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            about: None,
            long_about: None,
            version: None,
            action: None,
            args: Vec::new(),
            globals: Vec::new(),
            bound: false,
            children: Vec::new(),
        }
    }

    /// Short description shown in the parent's command list.
    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = Some(about.into());
        self
    }

    /// Long description shown in this node's own help.
    pub fn long_about(mut self, long_about: impl Into<String>) -> Self {
        self.long_about = Some(long_about.into());
        self
    }

    /// Version printed for `--version`; only consulted on the root.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn action<F>(mut self, action: F) -> Self
    where
        F: Fn(&Context) -> anyhow::Result<()> + 'static,
    {
        self.action = Some(Box::new(action));
        self
    }

    /// Add an option parsed only when this node is selected.
    pub fn arg(mut self, arg: impl Into<Arg>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Builder form of [`CommandNode::add_child`].
    pub fn with_child(mut self, child: CommandNode) -> Result<Self> {
        self.add_child(child)?;
        Ok(self)
    }

    /// Append `child`, rejecting a name already used by a sibling.
    pub fn add_child(&mut self, child: CommandNode) -> Result<()> {
        if self.find(&child.name).is_some() {
            return Err(Error::DuplicateCommand {
                name: child.name,
                parent: self.name.clone(),
            });
        }
        self.children.push(child);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get_about(&self) -> Option<&str> {
        self.about.as_deref()
    }

    pub fn get_long_about(&self) -> Option<&str> {
        self.long_about.as_deref()
    }

    pub fn get_version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }

    pub(crate) fn get_action(&self) -> Option<&Action> {
        self.action.as_ref()
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    /// Global options bound to this node; empty everywhere but the root.
    pub fn globals(&self) -> &[OptionSpec] {
        &self.globals
    }

    /// Whether a registry has been bound to this node.
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    pub(crate) fn set_globals(&mut self, globals: Vec<OptionSpec>) {
        self.globals = globals;
        self.bound = true;
    }

    /// Children in registration order.
    pub fn children(&self) -> &[CommandNode] {
        &self.children
    }

    /// Child with the given name. The first registered child wins.
    pub fn find(&self, name: &str) -> Option<&CommandNode> {
        self.children.iter().find(|child| child.name == name)
    }
}

impl fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandNode")
            .field("name", &self.name)
            .field("about", &self.about)
            .field("has_action", &self.action.is_some())
            .field("args", &self.args.len())
            .field("globals", &self.globals.len())
            .field("bound", &self.bound)
            .field("children", &self.children)
            .finish()
    }
}

/// Supplies a fully-formed command subtree.
pub trait CommandProvider {
    fn command(&self) -> CommandNode;
}

impl<F> CommandProvider for F
where
    F: Fn() -> CommandNode,
{
    fn command(&self) -> CommandNode {
        self()
    }
}

/// Wrap a no-argument unit of work as a leaf command.
pub fn single_action<F>(name: &str, about: &str, work: F) -> CommandNode
where
    F: Fn() -> anyhow::Result<()> + 'static,
{
    CommandNode::new(name)
        .about(about)
        .long_about(about)
        .action(move |_ctx| work())
}

/// Append `children` to `root` in order.
///
/// Stops at the first child whose name is already taken by a sibling. When
/// global options are already bound to `root`, a child whose subtree
/// declares a local option with a global option's name is rejected too.
pub fn compose<I>(root: &mut CommandNode, children: I) -> Result<()>
where
    I: IntoIterator<Item = CommandNode>,
{
    for child in children {
        check_local_options(&child, root.globals())?;
        log::debug!("composing '{}' under '{}'", child.name(), root.name());
        root.add_child(child)?;
    }
    Ok(())
}
