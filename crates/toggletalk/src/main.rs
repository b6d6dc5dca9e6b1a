// SPDX-FileCopyrightText: 2026 ToggleTalk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! ToggleTalk - a home-automation chat client.
//!
//! This is the headless binary entry point: an interactive terminal
//! session over the same client core a mobile shell would embed.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod host;
mod run;
mod status;

/// ToggleTalk - a home-automation chat client.
#[derive(Parser, Debug)]
#[command(name = "toggletalk", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start an interactive chat session (polling in the background).
    Run,
    /// Probe server health and print recent activity.
    Status,
    /// Print the effective configuration.
    Config,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match toggletalk_config::load_and_validate() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("toggletalk: {e}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Run) | None => run::run(config).await,
        Some(Commands::Status) => status::status(config).await,
        Some(Commands::Config) => match serde_json::to_string_pretty(&config) {
            Ok(rendered) => {
                println!("{rendered}");
                Ok(())
            }
            Err(e) => Err(toggletalk_core::error::ToggleTalkError::Internal(
                e.to_string(),
            )),
        },
    };

    if let Err(e) = result {
        eprintln!("toggletalk: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Verify jemalloc is the global allocator by advancing the epoch.
        // Only jemalloc supports this -- the system allocator would fail.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }
}
