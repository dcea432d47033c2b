//! Developer task runner for the viz application.
//!
//! Every task is a fixed, ordered list of external tool invocations. The
//! crate keeps the same split the tasks need to stay testable:
//!
//! - **[`core`]**: Pure types (tasks, steps, platforms, host family).
//!   No I/O; a task's step list can be asserted on without spawning anything.
//! - **[`io`]**: Side-effecting operations (process execution, search-path
//!   lookup, managed tool resolution, configuration loading).
//!
//! [`plan`] turns a task plus configuration into its step list, and
//! [`dispatch`] walks that list against the I/O layer, stopping at the first
//! failure.

pub mod core;
pub mod dispatch;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod plan;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
