//! simforge CLI — prepare, run and package declaratively-configured
//! interactive simulations.

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "simforge",
    version,
    about = "Prepare, run, and package declaratively-configured interactive simulations for web, desktop, and mobile runners"
)]
struct Cli {
    #[command(subcommand)]
    command: simforge::cli::Commands,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("SIMFORGE_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    if let Err(e) = simforge::cli::dispatch(cli.command) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
