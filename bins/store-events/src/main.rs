mod cmd;
mod config;
mod error;

use clap::Parser;
use config::{Cli, Commands, Effective};
use tracing_subscriber::EnvFilter;

/// `LOG_LEVEL` (INFO, debug, ...) имеет приоритет над `RUST_LOG`.
fn env_filter() -> EnvFilter {
    std::env::var("LOG_LEVEL")
        .ok()
        .and_then(|level| EnvFilter::try_new(level.to_lowercase()).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| "info".into())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_env_filter(env_filter()).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Serve(args) => match Effective::new(&args.common, args.port, None) {
            Ok(eff) => cmd::serve::run(eff).await,
            Err(e) => Err(e),
        },
        Commands::Generate(args) => match Effective::new(&args.common, None, args.count) {
            Ok(eff) => cmd::generate::run(eff).await,
            Err(e) => Err(e),
        },
    };
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
