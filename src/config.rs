use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

use crate::error::{Error, Result};

/// Fallback polling interval when the configured one is missing or invalid.
pub const DEFAULT_INTERVAL: u64 = 3600;

/// Sentinel written by the first-run template; refuses to operate until replaced.
pub const API_KEY_PLACEHOLDER: &str = "PASTE_YOUR_API_KEY_HERE";

pub const CONFIG_FILE_NAME: &str = "ddnsync.json";

/// The on-disk JSON config. `domains` maps provider record ids to free-text
/// labels shown in logs; the ids are what the record-edit endpoint wants.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    pub api_key: String,
    pub domains: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "lenient_interval")]
    pub monitor_interval: Option<i64>,
}

/// Accept anything JSON puts in `monitor_interval` (null, strings, floats)
/// rather than failing the whole parse; non-integers surface as `None` and get
/// corrected to the default later.
fn lenient_interval<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_i64())
}

impl Config {
    /// The fixed location next to the executable, for zero-argument runs.
    pub fn default_path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_FILE_NAME)
    }

    pub fn load(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(Error::ConfigMissing {
                path: path.to_path_buf(),
            });
        }

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_json::from_reader(reader)
            .map_err(|e| Error::ConfigInvalid(format!("malformed config file: {e}")))?;

        Ok(config)
    }

    /// Atomically replace the config on disk: serialize to a sibling temp
    /// file, then rename over the target. An external editor never observes a
    /// half-written file.
    pub fn store(&self, path: &Path) -> Result<()> {
        let tmp = path.with_extension("tmp");
        let data = serde_json::to_vec_pretty(self)?;
        fs::write(&tmp, data)?;
        fs::rename(&tmp, path)?;

        Ok(())
    }

    /// First-run template: placeholder key, no records, default interval.
    pub fn write_template(path: &Path) -> Result<()> {
        let template = Config {
            api_key: API_KEY_PLACEHOLDER.to_string(),
            domains: BTreeMap::new(),
            monitor_interval: Some(DEFAULT_INTERVAL as i64),
        };

        template.store(path)
    }

    /// The effective polling interval in seconds, falling back to the default
    /// when the configured value is unusable.
    pub fn interval(&self) -> u64 {
        match self.monitor_interval {
            Some(secs) if secs > 0 => secs as u64,
            _ => DEFAULT_INTERVAL,
        }
    }

    pub fn interval_is_valid(&self) -> bool {
        matches!(self.monitor_interval, Some(secs) if secs > 0)
    }

    /// Correct an absent or non-positive interval to the default and persist
    /// the fix immediately so external editors see the value in effect.
    pub fn normalize_interval(&mut self, path: &Path) -> Result<()> {
        if !self.interval_is_valid() {
            info!(
                "monitor_interval missing or not a positive integer, resetting to {}s",
                DEFAULT_INTERVAL
            );
            self.monitor_interval = Some(DEFAULT_INTERVAL as i64);
            self.store(path)?;
        }

        Ok(())
    }

    /// Normal operation needs a real key and at least one record.
    pub fn validate_for_update(&self) -> Result<()> {
        if self.api_key.trim().is_empty() || self.api_key == API_KEY_PLACEHOLDER {
            return Err(Error::ConfigInvalid(
                "api_key is empty or still the placeholder; run ddnsync-setup".to_string(),
            ));
        }

        if self.domains.is_empty() {
            return Err(Error::ConfigInvalid(
                "no records configured; run ddnsync-setup".to_string(),
            ));
        }

        Ok(())
    }
}
