//! Deterministic, pure types shared by planning and execution.
//!
//! Core modules must be free of I/O side effects. They describe what a task
//! will do, never do it.

pub mod platform;
pub mod types;
