use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use ddnsync::api::DEFAULT_BASE_URL;
use ddnsync::config::Config;
use ddnsync::setup;

/// Interactive setup: pick the DNS records to monitor and set the polling
/// interval.
#[derive(Clone, Debug, Parser)]
struct Args {
    /// Config file path; defaults to ddnsync.json next to the executable
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Only change the polling interval and exit; prompts when no value given
    #[clap(long, num_args = 0..=1, value_name = "SECONDS")]
    set_interval: Option<Option<u64>>,
}

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }

    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config_path = args.config.unwrap_or_else(Config::default_path);

    setup::run(&config_path, args.set_interval, DEFAULT_BASE_URL).await?;

    Ok(())
}
