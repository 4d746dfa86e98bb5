use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod cli;
mod core;
mod config;
mod error;

use cli::Cli;
use crate::core::Engine;
use crate::error::SigscribeError;

fn main() {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting Sigscribe v{}", env!("CARGO_PKG_VERSION"));

    let result = Engine::new(cli.config.as_deref()).and_then(|engine| cli.execute(engine));

    if let Err(err) = result {
        // Fatal errors are logged here and nowhere else
        match err.downcast_ref::<SigscribeError>() {
            Some(fatal) => error!(event = fatal.event(), "{}", fatal),
            None => error!("{:#}", err),
        }
        std::process::exit(1);
    }
}
