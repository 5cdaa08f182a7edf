use std::path::PathBuf;

use clap::Parser;

/// Keep configured DNS A records pointed at this host's public IP.
#[derive(Clone, Debug, Parser)]
pub struct Args {
    /// Config file path; defaults to ddnsync.json next to the executable
    #[clap(short, long)]
    pub config: Option<PathBuf>,
}
