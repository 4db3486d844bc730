//! # Weekly CLI
//!
//! The binary is intentionally thin: the CLI lives in `cli/`, while this file sets
//! up logging, calls `cli::run()` and handles process termination.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/)                                           │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - Context wiring + dispatch (commands.rs)                  │
//! │  - Terminal rendering (render.rs)                           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Library (weekly_companion)                                 │
//! │  - AppStore operations and read models                      │
//! │  - LocalAdapter over FileKv for persistence                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Diagnostics go to stderr through `tracing`. Set `WEEKLY_LOG` to an
//! `EnvFilter` directive (for example `weekly_companion=debug`) to see more.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;

const LOG_ENV: &str = "WEEKLY_LOG";

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env(LOG_ENV)
                .unwrap_or_else(|_| EnvFilter::new("weekly_companion=warn,weekly=warn")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();

    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
