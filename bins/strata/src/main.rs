use clap::{Parser, Subcommand};

mod store;

#[allow(unused_imports)]
use tracing::{debug, error, info, trace, warn};

#[derive(Parser)]
#[clap(author = "chunger", version, about = "Strata CLI utility")]
#[clap(propagate_version = true)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store inspection commands
    Store(store::Command),
}

fn main() -> anyhow::Result<()> {
    strata_core::telemetry::init_dev_subscriber_with_env_filter();

    let cli = Cli::parse();

    match cli.command {
        Commands::Store(args) => store::run(&args),
    }
}
