use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use dripfeed::adapter::inbound::cli;
use dripfeed::config::Config;

#[derive(Parser)]
#[command(name = "dripfeed", version, about = "Batch cryptocurrency withdrawals")]
struct Args {
    /// Path to the configuration file.
    #[arg(long, default_value = "config.toml")]
    config: std::path::PathBuf,

    /// Path to the targets CSV; overrides the configured file.
    #[arg(long)]
    targets: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load config: {err}");
            std::process::exit(1);
        }
    };

    config.init_logging();
    info!("dripfeed starting");

    let targets_file = args.targets.unwrap_or_else(|| config.batch.targets_file.clone());
    let targets = match cli::targets::load_targets(&targets_file) {
        Ok(targets) => targets,
        Err(err) => {
            error!(error = %err, "Failed to load withdrawal targets");
            std::process::exit(1);
        }
    };

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            interrupt.cancel();
        }
    });

    if let Err(err) = cli::run(&config, &targets, &cancel).await {
        error!(error = %err, "Fatal error");
        std::process::exit(1);
    }

    info!("dripfeed stopped");
}
