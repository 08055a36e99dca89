//! Dial-peer resolver CLI.
//!
//! Loads a dialplan, resolves one call and prints the resulting call state
//! as JSON. The detailed per-step log is emitted via tracing; raise the
//! filter (e.g. `RUST_LOG=dialplan_sim=debug`) to see every translation.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dialplan_sim::{load_config, OriginTag, Resolver};

#[derive(Parser)]
#[command(name = "dialplan-sim")]
#[command(about = "Resolve a call through a dial-peer table", long_about = None)]
struct Cli {
    /// Path to the dialplan TOML file.
    #[arg(short, long, default_value = "dialplan.example.toml")]
    config: PathBuf,

    /// Origin identity tag (e.g. zoom, cucm, itsp).
    #[arg(short, long)]
    origin: String,

    /// Calling-party number (CPN).
    #[arg(long)]
    calling: String,

    /// Called-party number (CDPN).
    #[arg(long)]
    called: String,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dialplan_sim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(config = %cli.config.display(), error = %e, "failed to load dialplan");
            return ExitCode::FAILURE;
        }
    };
    let resolver = match Resolver::from_config(&config) {
        Ok(resolver) => resolver,
        Err(e) => {
            tracing::error!(error = %e, "failed to compile dialplan");
            return ExitCode::FAILURE;
        }
    };

    let state = resolver.resolve(OriginTag::new(&cli.origin), &cli.calling, &cli.called);

    match serde_json::to_string_pretty(&state) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize call state");
            return ExitCode::FAILURE;
        }
    }

    if state.error.is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
