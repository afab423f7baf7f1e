//! Shared test utilities for integration and E2E tests.
//!
//! This module provides fixtures and helpers to reduce duplication across
//! test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let tree = BridgeTree::new();
//!     let (code, _, _) = tree.run(["evm", "deploy"]);
//!     assert_eq!(code, 0);
//! }
//! ```

use std::cell::Cell;
use std::rc::Rc;

use assert_fs::prelude::*;
use chainbridge::app::App;
use chainbridge::command::{single_action, CommandNode};
use chainbridge::output::OutputConfig;
use chainbridge::reporter::Reporter;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{BridgeTree, ConfigFixture};
}

/// An application shaped like the production binary: a built-in `run`
/// command plus an `evm` subtree contributed by a collaborator.
///
/// Every action counts its invocations so tests can assert which one ran.
pub struct BridgeTree {
    pub app: App,
    pub run_calls: Rc<Cell<usize>>,
    pub deploy_calls: Rc<Cell<usize>>,
}

impl BridgeTree {
    pub fn new() -> Self {
        let run_calls = Rc::new(Cell::new(0));
        let deploy_calls = Rc::new(Cell::new(0));

        let run_counter = Rc::clone(&run_calls);
        let run = single_action("run", "Run example app", move || {
            run_counter.set(run_counter.get() + 1);
            Ok(())
        });

        let deploy_counter = Rc::clone(&deploy_calls);
        let evm_provider = move || {
            let counter = Rc::clone(&deploy_counter);
            let deploy = CommandNode::new("deploy")
                .about("Deploy bridge contracts")
                .action(move |_ctx| {
                    counter.set(counter.get() + 1);
                    Ok(())
                });
            CommandNode::new("evm")
                .about("EVM CLI")
                .long_about("Root command for starting EVM CLI")
                .with_child(deploy)
                .expect("deploy is the only child")
        };

        let app = App::builder("chainbridge")
            .version("0.1.0")
            .command(run)
            .provide(&evm_provider)
            .build()
            .expect("tree assembles");

        Self {
            app,
            run_calls,
            deploy_calls,
        }
    }

    /// Run one invocation and capture exit status, stdout and stderr.
    pub fn run<const N: usize>(&self, args: [&str; N]) -> (u8, String, String) {
        let mut reporter = Reporter::new(Vec::new(), Vec::new(), OutputConfig::without_color());
        let code = self.app.run_with(args, &mut reporter);
        let (out, err) = reporter.into_inner();
        (
            code,
            String::from_utf8(out).expect("stdout is UTF-8"),
            String::from_utf8(err).expect("stderr is UTF-8"),
        )
    }

    /// Total number of actions invoked so far.
    pub fn total_calls(&self) -> usize {
        self.run_calls.get() + self.deploy_calls.get()
    }
}

impl Default for BridgeTree {
    fn default() -> Self {
        Self::new()
    }
}

/// A temporary directory holding a configuration file.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = ConfigFixture::new("config.yaml", "output: json\n");
///
/// let mut cmd = cargo_bin_cmd!("chainbridge");
/// cmd.arg("--config").arg(fixture.path()).arg("run").assert().success();
/// ```
pub struct ConfigFixture {
    temp_dir: assert_fs::TempDir,
    file_name: String,
}

impl ConfigFixture {
    pub fn new(file_name: &str, content: &str) -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        temp_dir
            .child(file_name)
            .write_str(content)
            .expect("Failed to write config file");
        Self {
            temp_dir,
            file_name: file_name.to_string(),
        }
    }

    /// Path to the configuration file.
    pub fn path(&self) -> std::path::PathBuf {
        self.temp_dir.path().join(&self.file_name)
    }
}
