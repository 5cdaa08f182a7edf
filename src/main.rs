use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use ddnsync::config::Config;
use ddnsync::daemon::Daemon;
use ddnsync::error::Error;

mod args;

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }

    tracing_subscriber::fmt::init();

    info!("Starting ddnsync updater");

    let args = args::Args::parse();
    let config_path = args.config.unwrap_or_else(Config::default_path);

    let daemon = match Daemon::init(config_path).await {
        Ok(daemon) => daemon,
        Err(Error::ConfigMissing { path }) => {
            Config::write_template(&path).context("Failed to write the config template")?;
            error!(
                "no config found; wrote a template to {} - fill in the api key and run ddnsync-setup",
                path.display()
            );
            std::process::exit(1);
        }
        Err(err) => {
            error!("startup failed: {err}");
            std::process::exit(1);
        }
    };

    info!(
        "watching {} record(s), polling every {}s",
        daemon.record_count(),
        daemon.interval().as_secs()
    );

    daemon.run().await;

    Ok(())
}
