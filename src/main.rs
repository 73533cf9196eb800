//! Indagar CLI — scene-graph question answering.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "indagar",
    version,
    about = "Scene-graph question answering — typed functional programs, taxonomy-aware matching, categorized faults"
)]
struct Cli {
    #[command(subcommand)]
    command: indagar::cli::Commands,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if let Err(e) = indagar::cli::dispatch(cli.command) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
