use std::path::PathBuf;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::api::{self, ApiClient};
use crate::config::Config;
use crate::error::Result;
use crate::ip;

/// Per-cycle tally of record updates. Individual failures are swallowed, but
/// the summary line still says how many went through.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub updated: usize,
    pub failed: usize,
}

/// The polling loop and its state: the last IP we pushed, the config as of the
/// last reload, and the interval currently in effect.
pub struct Daemon {
    config_path: PathBuf,
    ip_endpoint: String,
    api_base_url: String,
    http: reqwest::Client,
    api: ApiClient,
    config: Config,
    last_ip: Option<String>,
    interval: Duration,
}

impl std::fmt::Debug for Daemon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Daemon")
            .field("config_path", &self.config_path)
            .field("last_ip", &self.last_ip)
            .field("interval", &self.interval)
            .field("records", &self.config.domains.len())
            .finish_non_exhaustive()
    }
}

impl Daemon {
    /// Load, validate, resolve the initial IP and push it to every record.
    /// Any failure here is fatal; the binary turns it into exit code 1.
    pub async fn init(config_path: PathBuf) -> Result<Daemon> {
        Self::init_with_endpoints(config_path, ip::DEFAULT_IP_ENDPOINT, api::DEFAULT_BASE_URL)
            .await
    }

    pub async fn init_with_endpoints(
        config_path: PathBuf,
        ip_endpoint: &str,
        api_base_url: &str,
    ) -> Result<Daemon> {
        let mut config = Config::load(&config_path)?;
        config.validate_for_update()?;
        config.normalize_interval(&config_path)?;

        let api = ApiClient::with_base_url(&config.api_key, api_base_url)?;
        let http = reqwest::Client::new();
        let current = ip::resolve(&http, ip_endpoint).await?;

        let mut daemon = Daemon {
            interval: Duration::from_secs(config.interval()),
            config_path,
            ip_endpoint: ip_endpoint.to_string(),
            api_base_url: api_base_url.to_string(),
            http,
            api,
            config,
            last_ip: None,
        };

        let outcome = daemon.push_updates(&current).await;
        info!(
            "initial sync: {} now on {} record(s), {} failed",
            current, outcome.updated, outcome.failed
        );
        daemon.last_ip = Some(current);

        Ok(daemon)
    }

    /// Poll forever. Never returns; the process is killed externally.
    pub async fn run(mut self) {
        loop {
            self.run_cycle().await;
            sleep(self.interval).await;
        }
    }

    /// One poll cycle: resolve, compare, push on change, re-read the
    /// interval. A failed lookup skips everything, straight to the sleep.
    pub async fn run_cycle(&mut self) {
        match ip::resolve(&self.http, &self.ip_endpoint).await {
            Ok(current) => {
                if self.last_ip.as_deref() != Some(current.as_str()) {
                    self.handle_change(current).await;
                }
                self.adopt_interval();
            }
            Err(err) => warn!("public ip lookup failed, skipping this cycle: {}", err),
        }
    }

    /// The config may have been edited while we slept, so re-read it before
    /// pushing; the key and record set on disk win over what we cached.
    async fn handle_change(&mut self, current: String) {
        if !self.reload_config() {
            // Keep last_ip as-is so the change is retried next cycle.
            return;
        }

        if self.config.domains.is_empty() {
            warn!(
                "public ip changed to {} but no records are configured",
                current
            );
            self.last_ip = Some(current);
            return;
        }

        let outcome = self.push_updates(&current).await;
        info!(
            "public ip changed to {}: {} record(s) updated, {} failed",
            current, outcome.updated, outcome.failed
        );
        self.last_ip = Some(current);
    }

    /// One edit call per configured record. Errors are logged and counted,
    /// never propagated; nothing verifies the provider accepted the change.
    async fn push_updates(&self, ip: &str) -> UpdateOutcome {
        let mut outcome = UpdateOutcome::default();

        for (record_id, label) in &self.config.domains {
            match self.api.update_record(record_id, ip).await {
                Ok(()) => {
                    info!("updated record {} ({}) -> {}", record_id, label, ip);
                    outcome.updated += 1;
                }
                Err(err) => {
                    warn!("update of record {} ({}) failed: {}", record_id, label, err);
                    outcome.failed += 1;
                }
            }
        }

        outcome
    }

    fn reload_config(&mut self) -> bool {
        let fresh = match Config::load(&self.config_path) {
            Ok(fresh) => fresh,
            Err(err) => {
                warn!("config reload failed, keeping previous settings: {}", err);
                return false;
            }
        };

        if fresh.api_key.trim().is_empty() || fresh.api_key == crate::config::API_KEY_PLACEHOLDER {
            warn!("reloaded config has no usable api_key, skipping this cycle");
            return false;
        }

        if fresh.api_key != self.config.api_key {
            match ApiClient::with_base_url(&fresh.api_key, &self.api_base_url) {
                Ok(client) => self.api = client,
                Err(err) => {
                    warn!("could not rebuild api client for new key: {}", err);
                    return false;
                }
            }
        }

        self.config = fresh;
        true
    }

    /// Step 3 of the cycle: the interval on disk wins whenever it is valid.
    fn adopt_interval(&mut self) {
        match Config::load(&self.config_path) {
            Ok(on_disk) if on_disk.interval_is_valid() => {
                let fresh = Duration::from_secs(on_disk.interval());
                if fresh != self.interval {
                    info!("monitor interval changed to {}s", on_disk.interval());
                    self.interval = fresh;
                }
            }
            Ok(_) => {}
            Err(err) => warn!("could not re-read interval from config: {}", err),
        }
    }

    pub fn last_ip(&self) -> Option<&str> {
        self.last_ip.as_deref()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn record_count(&self) -> usize {
        self.config.domains.len()
    }
}
