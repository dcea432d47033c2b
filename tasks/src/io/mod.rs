//! I/O helpers for task execution.

pub mod config;
pub mod process;
pub mod resolver;
