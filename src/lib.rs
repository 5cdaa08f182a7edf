//! Keep a set of DNS A records pointed at this host's current public IP.
//!
//! The updater binary polls an external IP-lookup service on a timer and, when
//! the address changes, pushes one record-edit call per configured record to
//! the provider's HTTP API. The companion `ddnsync-setup` binary walks a human
//! through picking records and writes the selection into the config file.

pub mod api;
pub mod config;
pub mod daemon;
pub mod error;
pub mod ip;
pub mod rate;
pub mod setup;

pub use error::{Error, Result};
