//! Command tree assembly and process-level execution

use std::env;
use std::process::ExitCode;

use chainbridge::app::App;
use chainbridge::error::Result;
use chainbridge::reporter::Reporter;

use crate::commands;

/// Assemble the `chainbridge` command tree.
pub fn build() -> Result<App> {
    App::builder("chainbridge")
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .command(commands::run::command())
        .build()
}

/// Build the tree, run the command selected by the process arguments and
/// turn the outcome into an exit code.
pub fn execute() -> ExitCode {
    let app = match build() {
        Ok(app) => app,
        Err(e) => return ExitCode::from(Reporter::stdio().report(Err(e))),
    };
    ExitCode::from(app.run(env::args_os().skip(1)))
}
