//! # Execution Reporter
//!
//! The single place where the outcome of a dispatch becomes something the
//! operator can observe: text on stdout or stderr, and a process exit
//! status.
//!
//! | outcome                     | stream | exit status |
//! |-----------------------------|--------|-------------|
//! | action completed            | -      | 0           |
//! | help or version requested   | stdout | 0           |
//! | grouping node selected      | stderr (help text) | 2 |
//! | usage error                 | stderr (`fatal:`)  | 2 |
//! | startup error               | stderr (`fatal:`)  | 1 |
//! | action failed               | stderr (`error:`)  | 1 |
//!
//! Nothing is retried here.

use std::io::{self, Stderr, Stdout, Write};

use crate::dispatch::Outcome;
use crate::error::{Error, Result};
use crate::exit_codes;
use crate::output::{OutputConfig, Severity};

/// Writes diagnostics and decides the exit status.
#[derive(Debug)]
pub struct Reporter<O: Write, E: Write> {
    out: O,
    err: E,
    output: OutputConfig,
}

impl Reporter<Stdout, Stderr> {
    /// Reporter writing to the process's stdout and stderr.
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr(), OutputConfig::default())
    }
}

impl<O: Write, E: Write> Reporter<O, E> {
    pub fn new(out: O, err: E, output: OutputConfig) -> Self {
        Self { out, err, output }
    }

    /// Replace the color settings, e.g. once `--color` has been resolved.
    pub fn set_output(&mut self, output: OutputConfig) {
        self.output = output;
    }

    /// Report a dispatch result and return the exit status.
    pub fn report(&mut self, result: Result<Outcome>) -> u8 {
        let written = match result {
            Ok(Outcome::Completed) => Ok(exit_codes::SUCCESS),
            Ok(Outcome::Help(text)) | Ok(Outcome::Version(text)) => self
                .out
                .write_all(text.as_bytes())
                .map(|()| exit_codes::SUCCESS),
            Err(error) => self.write_error(&error).map(|()| error.exit_code()),
        };
        // A closed stream must not turn a failure into success.
        written.unwrap_or(exit_codes::FAILURE)
    }

    fn write_error(&mut self, error: &Error) -> io::Result<()> {
        if let Error::NoAction { help, .. } = error {
            log::debug!("{error}");
            return self.err.write_all(help.as_bytes());
        }

        let severity = if error.is_fatal() {
            Severity::Fatal
        } else {
            Severity::Error
        };
        log::debug!("reporting {} diagnostic: {error:?}", severity.label());
        writeln!(self.err, "{} {}", self.output.severity(severity), error)?;

        if error.is_usage() {
            if let Some(path) = error.command_path() {
                writeln!(self.err, "Run '{path} --help' for usage.")?;
            }
        }
        Ok(())
    }

    /// Consume the reporter, returning its streams.
    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }
}
