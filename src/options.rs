//! # Option Registry
//!
//! Global options are flags that every command in the tree accepts, such as
//! the log level or the configuration file path. Collaborators register the
//! options they need into an [`OptionRegistry`] during startup; the registry
//! is then bound to the root [`CommandNode`] exactly once, after which the
//! options are visible at every level of the tree.
//!
//! ## Uniqueness
//!
//! Option names are unique across the whole tree. Registering a name twice,
//! binding the same registry to a root twice, or composing a subtree whose
//! local options shadow a global option all fail with
//! [`Error::DuplicateOption`]. The `help` and `version` flags are reserved
//! by the dispatcher.

use clap::builder::PossibleValuesParser;
use clap::{Arg, ArgAction};

use crate::command::CommandNode;
use crate::error::{Error, Result};

/// Long flags handled by the dispatcher itself.
pub(crate) const RESERVED_NAMES: [&str; 2] = ["help", "version"];
/// Short flags handled by the dispatcher itself.
pub(crate) const RESERVED_SHORTS: [char; 2] = ['h', 'V'];

/// Name of the configuration file option.
pub const CONFIG: &str = "config";
/// Name of the log level option.
pub const LOG_LEVEL: &str = "log-level";
/// Name of the color option.
pub const COLOR: &str = "color";
/// Name of the output format option.
pub const OUTPUT: &str = "output";

/// Whether an option is a boolean switch or carries a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// `--name` with no value
    Flag,
    /// `--name <VALUE>` or `--name=<VALUE>`
    Value,
}

/// A single global option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    name: String,
    short: Option<char>,
    help: String,
    kind: OptionKind,
    default: Option<String>,
    env: Option<String>,
    value_name: Option<String>,
    possible_values: Vec<String>,
}

impl OptionSpec {
    /// An option that takes a value.
    pub fn value(name: impl Into<String>) -> Self {
        Self::new(name.into(), OptionKind::Value)
    }

    /// A boolean switch.
    pub fn flag(name: impl Into<String>) -> Self {
        Self::new(name.into(), OptionKind::Flag)
    }

    fn new(name: String, kind: OptionKind) -> Self {
        Self {
            name,
            short: None,
            help: String::new(),
            kind,
            default: None,
            env: None,
            value_name: None,
            possible_values: Vec::new(),
        }
    }

    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// Value used when neither the command line, the environment, nor the
    /// configuration file sets the option.
    pub fn default_value(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Environment variable consulted when the flag is absent.
    pub fn env(mut self, env: impl Into<String>) -> Self {
        self.env = Some(env.into());
        self
    }

    pub fn value_name(mut self, value_name: impl Into<String>) -> Self {
        self.value_name = Some(value_name.into());
        self
    }

    /// Restrict the option to a fixed set of values.
    pub fn possible_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.possible_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn short_flag(&self) -> Option<char> {
        self.short
    }

    pub fn kind(&self) -> OptionKind {
        self.kind
    }

    pub fn default(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn env_var(&self) -> Option<&str> {
        self.env.as_deref()
    }

    /// Values the option is restricted to; empty when any value goes.
    pub fn allowed_values(&self) -> &[String] {
        &self.possible_values
    }

    pub fn takes_value(&self) -> bool {
        self.kind == OptionKind::Value
    }

    /// Whether a command-line token names this option.
    ///
    /// Returns `Some(true)` when the token also carries the value inline
    /// (`--name=value`), `Some(false)` when it is the bare flag, and `None`
    /// when the token is a different option.
    pub(crate) fn matches_token(&self, token: &str) -> Option<bool> {
        if let Some(long) = token.strip_prefix("--") {
            if long == self.name {
                return Some(false);
            }
            return match long.split_once('=') {
                Some((name, _)) if name == self.name => Some(true),
                _ => None,
            };
        }
        let short = self.short?;
        let rest = token.strip_prefix('-')?;
        let mut chars = rest.chars();
        if chars.next() != Some(short) {
            return None;
        }
        match chars.as_str() {
            "" => Some(false),
            _ if self.takes_value() => Some(true),
            _ => None,
        }
    }

    /// Value given to this option on the command line, or else through its
    /// environment variable, found by scanning `argv` up to `--` without
    /// resolving a command path. The last occurrence wins.
    ///
    /// Used for settings needed before resolution can fail, such as the
    /// color of the diagnostic it produces.
    pub fn scan_value(&self, argv: &[String]) -> Option<String> {
        if !self.takes_value() {
            return None;
        }
        let mut found = None;
        let mut tokens = argv.iter();
        while let Some(token) = tokens.next() {
            if token == "--" {
                break;
            }
            match self.matches_token(token) {
                Some(true) => found = inline_value(token).map(str::to_string),
                Some(false) => found = tokens.next().cloned(),
                None => {}
            }
        }
        found.or_else(|| {
            self.env
                .as_deref()
                .and_then(|var| std::env::var(var).ok())
                .filter(|value| !value.is_empty())
        })
    }

    /// The `clap` argument parsing this option.
    ///
    /// Defaults are applied by [`crate::config::Config`] rather than by
    /// `clap`, so the configuration file can sit between the environment and
    /// the registered default.
    pub fn to_arg(&self) -> Arg {
        let mut arg = Arg::new(self.name.clone())
            .long(self.name.clone())
            .global(true)
            .help(self.help.clone());
        if let Some(short) = self.short {
            arg = arg.short(short);
        }
        if let Some(env) = &self.env {
            arg = arg.env(env.clone());
        }
        match self.kind {
            OptionKind::Flag => arg.action(ArgAction::SetTrue),
            OptionKind::Value => {
                arg = arg.action(ArgAction::Set);
                if let Some(value_name) = &self.value_name {
                    arg = arg.value_name(value_name.clone());
                }
                if let Some(default) = &self.default {
                    arg = arg.help(format!("{} [default: {}]", self.help, default));
                }
                if !self.possible_values.is_empty() {
                    arg = arg.value_parser(PossibleValuesParser::new(self.possible_values.clone()));
                }
                arg
            }
        }
    }
}

/// Table of global options, populated once at startup.
#[derive(Debug, Clone, Default)]
pub struct OptionRegistry {
    specs: Vec<OptionSpec>,
}

impl OptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the standard options.
    ///
    /// Every option reads the environment variable `<PREFIX>_<NAME>`, e.g.
    /// `CHAINBRIDGE_LOG_LEVEL` for `--log-level` with prefix `chainbridge`.
    pub fn standard(prefix: &str) -> Self {
        let env = |name: &str| {
            format!("{}_{}", prefix, name)
                .to_uppercase()
                .replace('-', "_")
        };
        let specs = vec![
            OptionSpec::value(CONFIG)
                .short('c')
                .value_name("FILE")
                .help("Path to a YAML, JSON or TOML configuration file")
                .env(env(CONFIG)),
            OptionSpec::value(LOG_LEVEL)
                .value_name("LEVEL")
                .help("Set log level")
                .default_value("info")
                .possible_values(["off", "error", "warn", "info", "debug", "trace"])
                .env(env(LOG_LEVEL)),
            OptionSpec::value(COLOR)
                .value_name("WHEN")
                .help("Colorize output")
                .default_value("auto")
                .possible_values(["auto", "always", "never"])
                .env(env(COLOR)),
            OptionSpec::value(OUTPUT)
                .value_name("FORMAT")
                .help("Output format")
                .default_value("text")
                .possible_values(["text", "json"])
                .env(env(OUTPUT)),
        ];
        Self { specs }
    }

    /// Register an option.
    ///
    /// Fails if the long name or the short flag is taken or reserved.
    pub fn register(&mut self, spec: OptionSpec) -> Result<()> {
        let taken = RESERVED_NAMES.contains(&spec.name())
            || spec.short.is_some_and(|s| RESERVED_SHORTS.contains(&s))
            || self.specs.iter().any(|existing| collides(existing, &spec));
        if taken {
            return Err(Error::DuplicateOption {
                name: spec.name().to_string(),
            });
        }
        self.specs.push(spec);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&OptionSpec> {
        self.specs.iter().find(|spec| spec.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OptionSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Attach every registered option to `root`.
    ///
    /// Binding is all-or-nothing: on failure `root` is left unchanged. A
    /// root accepts exactly one bind; any later bind, even of an empty or
    /// disjoint registry, fails with [`Error::DuplicateOption`] naming the
    /// first option it would have attached (empty when there is none).
    pub fn bind(&self, root: &mut CommandNode) -> Result<()> {
        if root.is_bound() {
            let name = self
                .specs
                .first()
                .or_else(|| root.globals().first())
                .map(|spec| spec.name().to_string())
                .unwrap_or_default();
            return Err(Error::DuplicateOption { name });
        }
        let bound = self.specs.clone();
        check_local_options(root, &bound)?;
        log::debug!(
            "bound {} global option(s) to '{}'",
            self.specs.len(),
            root.name()
        );
        root.set_globals(bound);
        Ok(())
    }
}

/// Value part of `--name=value` or `-xvalue`.
fn inline_value(token: &str) -> Option<&str> {
    if let Some(long) = token.strip_prefix("--") {
        return long.split_once('=').map(|(_, value)| value);
    }
    let mut chars = token.strip_prefix('-')?.chars();
    chars.next()?;
    Some(chars.as_str())
}

/// Same long name, or same short flag.
fn collides(a: &OptionSpec, b: &OptionSpec) -> bool {
    a.name == b.name || (a.short.is_some() && a.short == b.short)
}

/// Verify no local option anywhere under `node` shadows a global option or
/// another local option of the same node.
pub(crate) fn check_local_options(node: &CommandNode, globals: &[OptionSpec]) -> Result<()> {
    let mut longs: Vec<String> = globals.iter().map(|g| g.name().to_string()).collect();
    let mut shorts: Vec<char> = globals.iter().filter_map(OptionSpec::short_flag).collect();
    longs.extend(RESERVED_NAMES.iter().map(|name| name.to_string()));
    shorts.extend(RESERVED_SHORTS);

    for arg in node.args() {
        let long = arg
            .get_long()
            .map(str::to_string)
            .unwrap_or_else(|| arg.get_id().as_str().to_string());
        if longs.contains(&long) {
            return Err(Error::DuplicateOption { name: long });
        }
        if let Some(short) = arg.get_short() {
            if shorts.contains(&short) {
                return Err(Error::DuplicateOption { name: long });
            }
            shorts.push(short);
        }
        longs.push(long);
    }

    for child in node.children() {
        check_local_options(child, globals)?;
    }
    Ok(())
}
