//! Stable exit codes for the `tasks` binary.

/// Every step of the selected task succeeded.
pub const OK: i32 = 0;
/// A step failed: missing tool, launch failure, or non-success child exit.
pub const FAILED: i32 = 1;
/// Missing or unknown subcommand (reported by clap before any task runs).
pub const USAGE: i32 = 2;
