//! Logger setup.
//!
//! Log records go to stderr through `env_logger`, filtered at the level
//! resolved from `--log-level`. `RUST_LOG`-style directives can be appended
//! with `<PREFIX>_LOG` for per-module filtering.

use env_logger::{Builder, Target};
use log::LevelFilter;

/// Install the global logger.
///
/// Only the first call in a process has an effect; later calls return
/// `false`.
pub fn init(level: LevelFilter, directives_var: &str) -> bool {
    let mut builder = Builder::new();
    builder.filter_level(level).target(Target::Stderr);
    if let Ok(directives) = std::env::var(directives_var) {
        builder.parse_filters(&directives);
    }
    let installed = builder.try_init().is_ok();
    if installed {
        log::debug!("logger initialised at {level}");
    }
    installed
}

/// Name of the directives variable for `program`, e.g. `CHAINBRIDGE_LOG`.
pub fn directives_var(program: &str) -> String {
    format!("{}_LOG", program.to_uppercase().replace('-', "_"))
}
