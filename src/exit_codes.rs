//! Process exit statuses.
//!
//! - `0`: the selected command succeeded, or help/version was printed
//! - `1`: the command failed, or the command tree could not be assembled
//! - `2`: invalid command-line usage

/// Successful termination
pub const SUCCESS: u8 = 0;

/// General failure
pub const FAILURE: u8 = 1;

/// Command line usage error
pub const USAGE: u8 = 2;
