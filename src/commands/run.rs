//! # Run Command Implementation
//!
//! This module implements the `run` subcommand, the example workload shipped
//! with the binary. It stands in for a relayer app: it reports the
//! configuration it was started with and returns.
//!
//! ## Output
//!
//! With `--output text` (the default) every resolved option is printed as
//! `name: value`; with `--output json` the same data is printed as one JSON
//! object, suitable for scripting.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;

use chainbridge::command::{CommandNode, Context};
use chainbridge::config::{Config, OutputFormat};

/// Snapshot of the configuration the workload starts with.
#[derive(Debug, Serialize)]
struct Summary<'a> {
    command: String,
    config_file: Option<String>,
    options: BTreeMap<&'a str, &'a str>,
}

/// The `run` command node.
pub fn command() -> CommandNode {
    CommandNode::new("run")
        .about("Run example app")
        .long_about("Run example app")
        .action(execute)
}

/// Execute the `run` command.
pub fn execute(ctx: &Context) -> Result<()> {
    let config = ctx.config();
    log::info!("starting example app");

    let summary = summarize(ctx.command_line(), config);
    let rendered = render(&summary, config.output_format()?)?;
    print!("{rendered}");

    log::info!("example app finished");
    Ok(())
}

fn summarize(command: String, config: &Config) -> Summary<'_> {
    Summary {
        command,
        config_file: config.config_file().map(|path| path.display().to_string()),
        options: config.iter().collect(),
    }
}

fn render(summary: &Summary<'_>, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(summary)?)),
        OutputFormat::Text => {
            let mut out = format!("{}\n", summary.command);
            if let Some(file) = &summary.config_file {
                out.push_str(&format!("  config file: {file}\n"));
            }
            for (name, value) in &summary.options {
                out.push_str(&format!("  {name}: {value}\n"));
            }
            Ok(out)
        }
    }
}
