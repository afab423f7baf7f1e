//! # Application Assembly
//!
//! [`App`] ties the pieces together for a binary's `main`:
//!
//! 1. create the root node and bind the global options to it;
//! 2. compose the program's own commands and the collaborators' subtrees,
//!    in the order they were added;
//! 3. add the built-in `completion` command unless the name is taken;
//! 4. per invocation: resolve arguments, set up logging and colors from the
//!    resolved options, run the action, and report the outcome.
//!
//! ```no_run
//! use chainbridge::app::App;
//! use chainbridge::command::single_action;
//!
//! let app = App::builder("chainbridge")
//!     .version("0.1.0")
//!     .command(single_action("run", "Run example app", || Ok(())))
//!     .build()
//!     .unwrap();
//! std::process::exit(app.run(std::env::args_os().skip(1)).into());
//! ```

use std::ffi::OsString;
use std::io::{self, Write};

use clap::builder::EnumValueParser;
use clap::{Arg, Command};
use clap_complete::Shell;

use crate::command::{compose, CommandNode, CommandProvider};
use crate::dispatch::{resolve, Outcome, Resolution};
use crate::error::Result;
use crate::help::{tree_command, write_completions};
use crate::logging;
use crate::options::{self, OptionRegistry, OptionSpec};
use crate::output::OutputConfig;
use crate::reporter::Reporter;

/// Name of the built-in completion command.
pub const COMPLETION: &str = "completion";

/// Builder for [`App`].
pub struct AppBuilder {
    name: String,
    version: Option<String>,
    about: Option<String>,
    registry: OptionRegistry,
    options: Vec<OptionSpec>,
    commands: Vec<CommandNode>,
}

impl AppBuilder {
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = Some(about.into());
        self
    }

    /// Register an extra global option, e.g. a collaborator's endpoint.
    pub fn option(mut self, spec: OptionSpec) -> Self {
        self.options.push(spec);
        self
    }

    /// Add a command as a direct child of the root.
    pub fn command(mut self, node: CommandNode) -> Self {
        self.commands.push(node);
        self
    }

    /// Add a collaborator's subtree as a direct child of the root.
    pub fn provide(self, provider: &dyn CommandProvider) -> Self {
        let node = provider.command();
        self.command(node)
    }

    /// Assemble the tree.
    ///
    /// Fails on duplicate options or sibling commands; these are startup
    /// errors and the caller should report them and stop.
    pub fn build(self) -> Result<App> {
        let mut registry = self.registry;
        for spec in self.options {
            registry.register(spec)?;
        }

        let mut root = CommandNode::new(self.name.clone());
        if let Some(version) = self.version {
            root = root.version(version);
        }
        if let Some(about) = self.about {
            root = root.about(about.clone()).long_about(about);
        }

        registry.bind(&mut root)?;
        compose(&mut root, self.commands)?;

        if root.find(COMPLETION).is_none() {
            let completion = completion_command(&root);
            compose(&mut root, [completion])?;
        }

        log::debug!(
            "assembled '{}' with {} command(s)",
            root.name(),
            root.children().len()
        );
        Ok(App { root })
    }
}

/// An assembled command tree ready to run.
#[derive(Debug)]
pub struct App {
    root: CommandNode,
}

impl App {
    /// Start building an application; `name` is the root command and the
    /// prefix of the standard options' environment variables.
    pub fn builder(name: impl Into<String>) -> AppBuilder {
        let name = name.into();
        AppBuilder {
            registry: OptionRegistry::standard(&name),
            name,
            version: None,
            about: None,
            options: Vec::new(),
            commands: Vec::new(),
        }
    }

    pub fn root(&self) -> &CommandNode {
        &self.root
    }

    /// Run one invocation against stdout/stderr and return the exit status.
    pub fn run<I, T>(&self, args: I) -> u8
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        self.run_with(args, &mut Reporter::stdio())
    }

    /// Run one invocation with a caller-owned reporter.
    pub fn run_with<I, T, O, E>(&self, args: I, reporter: &mut Reporter<O, E>) -> u8
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
        O: Write,
        E: Write,
    {
        let result = self.execute(args, reporter);
        reporter.report(result)
    }

    fn execute<I, T, O, E>(&self, args: I, reporter: &mut Reporter<O, E>) -> Result<Outcome>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
        O: Write,
        E: Write,
    {
        let argv: Vec<String> = args
            .into_iter()
            .map(|arg| arg.into().to_string_lossy().into_owned())
            .collect();
        // Diagnostics raised during resolution honour `--color` too
        let early_color = self
            .root
            .globals()
            .iter()
            .find(|spec| spec.name() == options::COLOR)
            .and_then(|spec| spec.scan_value(&argv));
        if let Some(color) = early_color {
            reporter.set_output(OutputConfig::from_env_and_flag(&color));
        }

        match resolve(&self.root, &argv)? {
            Resolution::Invoke(invocation) => {
                let config = invocation.context().config();
                reporter.set_output(OutputConfig::from_env_and_flag(config.color()));
                logging::init(
                    config.log_level()?,
                    &logging::directives_var(self.root.name()),
                );
                log::info!("executing \"{}\"", invocation.context().command_line());
                invocation.run()
            }
            Resolution::Help(text) => Ok(Outcome::Help(text)),
            Resolution::Version(text) => Ok(Outcome::Version(text)),
        }
    }
}

/// Built-in `completion <shell>` command for the tree under `root`.
///
/// The tree is captured as it is when this is called, plus the completion
/// command itself, so it must be built after every other child has been
/// composed.
fn completion_command(root: &CommandNode) -> CommandNode {
    let node = completion_node(root.name());
    let tree = completion_tree(root, &node);
    let bin_name = root.name().to_string();
    node.action(move |ctx| {
        let shell = *ctx
            .matches()
            .get_one::<Shell>("shell")
            .ok_or_else(|| anyhow::anyhow!("missing shell"))?;
        let mut command = tree.clone();
        let mut stdout = io::stdout();
        clap_complete::generate(shell, &mut command, bin_name.clone(), &mut stdout);
        stdout.flush()?;
        Ok(())
    })
}

fn completion_node(bin_name: &str) -> CommandNode {
    CommandNode::new(COMPLETION)
        .about("Generate shell completion scripts")
        .long_about(format!(
            "Generate a completion script for the given shell.\n\n\
             Example: {bin_name} completion bash > ~/.local/share/bash-completion/completions/{bin_name}"
        ))
        .arg(
            Arg::new("shell")
                .required(true)
                .value_parser(EnumValueParser::<Shell>::new())
                .help("The shell to generate completions for"),
        )
}

/// The clap tree the completion scripts are generated from.
fn completion_tree(root: &CommandNode, completion: &CommandNode) -> Command {
    tree_command(root, root.globals()).subcommand(tree_command(completion, &[]))
}

/// Write completions for an assembled application.
pub fn completions(app: &App, shell: Shell, out: &mut dyn Write) {
    write_completions(shell, app.root(), app.root().globals(), out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::single_action;
    use crate::error::Error;
    use crate::exit_codes;
    use std::cell::Cell;
    use std::rc::Rc;

    fn quiet() -> Reporter<Vec<u8>, Vec<u8>> {
        Reporter::new(Vec::new(), Vec::new(), OutputConfig::without_color())
    }

    #[test]
    fn test_build_adds_completion_command() {
        let app = App::builder("chainbridge")
            .command(single_action("run", "Run example app", || Ok(())))
            .build()
            .unwrap();

        let names: Vec<&str> = app.root().children().iter().map(CommandNode::name).collect();
        assert_eq!(names, vec!["run", COMPLETION]);
        assert_eq!(app.root().globals().len(), 4);
    }

    #[test]
    fn test_collaborator_completion_is_kept() {
        let app = App::builder("chainbridge")
            .command(CommandNode::new(COMPLETION).about("custom"))
            .build()
            .unwrap();

        assert_eq!(app.root().children().len(), 1);
        assert_eq!(app.root().find(COMPLETION).unwrap().get_about(), Some("custom"));
    }

    #[test]
    fn test_build_rejects_duplicate_commands() {
        let result = App::builder("chainbridge")
            .command(CommandNode::new("evm"))
            .command(CommandNode::new("evm"))
            .build();

        assert!(matches!(result, Err(Error::DuplicateCommand { .. })));
    }

    #[test]
    fn test_build_rejects_duplicate_option() {
        let result = App::builder("chainbridge")
            .option(OptionSpec::value("log-level"))
            .build();

        assert!(matches!(result, Err(Error::DuplicateOption { name }) if name == "log-level"));
    }

    #[test]
    fn test_provider_subtree_is_composed() {
        let provider = || {
            CommandNode::new("evm")
                .about("EVM CLI")
                .with_child(CommandNode::new("deploy").action(|_| Ok(())))
                .unwrap()
        };
        let app = App::builder("chainbridge").provide(&provider).build().unwrap();

        let mut reporter = quiet();
        assert_eq!(app.run_with(["evm", "deploy"], &mut reporter), exit_codes::SUCCESS);
    }

    #[test]
    fn test_run_with_reports_outcome() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let app = App::builder("chainbridge")
            .command(single_action("run", "Run example app", move || {
                counter.set(counter.get() + 1);
                Ok(())
            }))
            .build()
            .unwrap();

        let mut reporter = quiet();
        assert_eq!(app.run_with(["run"], &mut reporter), exit_codes::SUCCESS);
        assert_eq!(app.run_with(Vec::<String>::new(), &mut reporter), exit_codes::USAGE);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_color_flag_applies_to_usage_errors() {
        let app = App::builder("chainbridge")
            .command(single_action("run", "Run example app", || Ok(())))
            .build()
            .unwrap();

        let mut colored = quiet();
        assert_eq!(app.run_with(["--color", "always", "bogus"], &mut colored), exit_codes::USAGE);
        let (_, err) = colored.into_inner();
        let err = String::from_utf8(err).unwrap();
        assert!(err.starts_with('\u{1b}'));
        assert!(err.contains("unknown command \"bogus\""));

        let mut plain = Reporter::new(Vec::new(), Vec::new(), OutputConfig::with_color());
        assert_eq!(app.run_with(["run", "--nope", "--color=never"], &mut plain), exit_codes::USAGE);
        let (_, err) = plain.into_inner();
        assert!(String::from_utf8(err).unwrap().starts_with("fatal: "));
    }

    #[test]
    fn test_completion_tree_offers_itself() {
        let mut root = CommandNode::new("chainbridge");
        OptionRegistry::standard("chainbridge").bind(&mut root).unwrap();
        compose(&mut root, [single_action("run", "Run example app", || Ok(()))]).unwrap();

        let tree = completion_tree(&root, &completion_node("chainbridge"));
        let names: Vec<&str> = tree.get_subcommands().map(Command::get_name).collect();
        assert_eq!(names, vec!["run", COMPLETION]);

        let completion = tree.find_subcommand(COMPLETION).unwrap();
        assert!(completion.get_arguments().any(|arg| arg.get_id() == "shell"));
    }

    #[test]
    fn test_completions_list_commands() {
        let app = App::builder("chainbridge")
            .command(single_action("run", "Run example app", || Ok(())))
            .build()
            .unwrap();

        let mut out = Vec::new();
        completions(&app, Shell::Zsh, &mut out);
        let script = String::from_utf8(out).unwrap();
        assert!(script.contains("run"));
        assert!(script.contains("#compdef chainbridge"));
    }
}
