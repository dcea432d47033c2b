//! Diagnostic tracing for the task runner.
//!
//! Operator output is the command echo (`> go run ...`), the found/install
//! notices on stdout, the child's own stderr, and the final error chain
//! printed by `main`. Tracing stays silent on top of that unless `RUST_LOG`
//! asks for it: failure paths log at `debug`, never at the default level.

use std::io::IsTerminal;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter applied when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "warn";

/// Initialize the stderr subscriber.
///
/// Colors are only emitted when stderr is a terminal.
///
/// # Example
/// ```bash
/// RUST_LOG=tasks=debug tasks production
/// ```
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .compact(),
        )
        .init();
}
