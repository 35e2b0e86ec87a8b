mod cli;
mod diagnostics;
mod handler;
mod launch;
mod model;
mod orchestrator;
mod output;
mod service;
mod variables;

use clap::Parser;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Cli::parse();

    // Exit explicitly: an interactive session may leave a blocking stdin read behind.
    match cli::run(args).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}
