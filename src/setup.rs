//! Interactive setup: authenticate, pick A records off the account and write
//! the selection into the config file. Runs in a terminal with a human on the
//! other end, so API failures are surfaced instead of swallowed.

use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::api::{ApiClient, DnsRecord, Domain};
use crate::config::{Config, API_KEY_PLACEHOLDER};
use crate::error::{Error, Result};
use crate::rate;

/// Entry point for the `ddnsync-setup` binary. `set_interval` is the
/// `--set-interval` flag: `Some(Some(n))` with a value, `Some(None)` without
/// one (prompt), `None` for the full interactive flow.
pub async fn run(
    config_path: &Path,
    set_interval: Option<Option<u64>>,
    base_url: &str,
) -> Result<()> {
    let mut config = load_or_create(config_path)?;

    if let Some(maybe_secs) = set_interval {
        let secs = match maybe_secs {
            Some(secs) if secs > 0 => secs,
            Some(_) => {
                return Err(Error::ConfigInvalid(
                    "interval must be a positive number of seconds".to_string(),
                ))
            }
            None => prompt_interval(config.interval())?,
        };

        print_advisory(secs, config.domains.len());
        config.monitor_interval = Some(secs as i64);
        config.store(config_path)?;
        println!("monitor interval set to {secs}s");
        return Ok(());
    }

    if config.api_key.trim().is_empty() || config.api_key == API_KEY_PLACEHOLDER {
        config.api_key = prompt_api_key()?;
    }

    let client = ApiClient::with_base_url(&config.api_key, base_url)?;

    let domains = client.list_domains().await?;
    if domains.is_empty() {
        return Err(Error::Api("the account has no domains".to_string()));
    }

    let domain = pick_domain(&domains)?;

    let records: Vec<DnsRecord> = client
        .list_records(domain.id)
        .await?
        .into_iter()
        .filter(|record| record.r#type == "A")
        .collect();
    if records.is_empty() {
        println!("{} has no A records; nothing to monitor", domain.name);
        return Ok(());
    }

    let picks = pick_records(&records)?;
    for idx in picks {
        let record = &records[idx];
        config
            .domains
            .insert(record.id.to_string(), record_label(record, domain));
    }

    let secs = prompt_interval(config.interval())?;
    print_advisory(secs, config.domains.len());
    config.monitor_interval = Some(secs as i64);

    config.store(config_path)?;
    println!(
        "saved {} record(s) to {}",
        config.domains.len(),
        config_path.display()
    );

    Ok(())
}

fn load_or_create(config_path: &Path) -> Result<Config> {
    match Config::load(config_path) {
        Ok(config) => Ok(config),
        Err(Error::ConfigMissing { .. }) => {
            Config::write_template(config_path)?;
            println!("created a fresh config at {}", config_path.display());
            Config::load(config_path)
        }
        Err(err) => Err(err),
    }
}

/// Label stored next to the record id, purely for humans reading logs.
fn record_label(record: &DnsRecord, domain: &Domain) -> String {
    if record.name.is_empty() || record.name == "@" {
        domain.name.clone()
    } else {
        format!("{}.{}", record.name, domain.name)
    }
}

fn pick_domain<'a>(domains: &'a [Domain]) -> Result<&'a Domain> {
    println!("Domains on this account:");
    for (i, domain) in domains.iter().enumerate() {
        println!("  {}. {}", i + 1, domain.name);
    }

    loop {
        let input = prompt(&format!("Pick a domain [1-{}]: ", domains.len()))?;
        match input.parse::<usize>() {
            Ok(n) if (1..=domains.len()).contains(&n) => return Ok(&domains[n - 1]),
            _ => println!("enter a number between 1 and {}", domains.len()),
        }
    }
}

fn pick_records(records: &[DnsRecord]) -> Result<Vec<usize>> {
    println!("A records:");
    for (i, record) in records.iter().enumerate() {
        let name = if record.name.is_empty() { "@" } else { &record.name };
        println!("  {}. {} (currently {})", i + 1, name, record.data);
    }

    loop {
        let input = prompt("Records to monitor (e.g. 1,3) or 'all': ")?;
        match parse_selection(&input, records.len()) {
            Some(picks) => return Ok(picks),
            None => println!("enter comma-separated numbers between 1 and {}, or 'all'", records.len()),
        }
    }
}

/// Parse "1,3,2" or "all" into zero-based indices. `None` on anything out of
/// range or empty; duplicates collapse to the first occurrence.
pub fn parse_selection(input: &str, len: usize) -> Option<Vec<usize>> {
    if input.eq_ignore_ascii_case("all") {
        return if len > 0 { Some((0..len).collect()) } else { None };
    }

    let mut picks = Vec::new();
    for part in input.split(',') {
        let n = part.trim().parse::<usize>().ok()?;
        if n < 1 || n > len {
            return None;
        }
        if !picks.contains(&(n - 1)) {
            picks.push(n - 1);
        }
    }

    if picks.is_empty() {
        None
    } else {
        Some(picks)
    }
}

fn prompt_api_key() -> Result<String> {
    loop {
        let key = prompt("API key: ")?;
        if !key.is_empty() && key != API_KEY_PLACEHOLDER {
            return Ok(key);
        }
        println!("the key cannot be empty");
    }
}

fn prompt_interval(current: u64) -> Result<u64> {
    loop {
        let input = prompt(&format!("Polling interval in seconds [{current}]: "))?;
        if input.is_empty() {
            return Ok(current);
        }
        match input.parse::<u64>() {
            Ok(secs) if secs > 0 => return Ok(secs),
            _ => println!("the interval must be a positive number of seconds"),
        }
    }
}

fn print_advisory(interval_secs: u64, record_count: usize) {
    let advisory = rate::advise(interval_secs, record_count as u64);
    println!(
        "worst case at this interval: {} calls/hour, {} calls/day",
        advisory.per_hour, advisory.per_day
    );

    if advisory.exceeds {
        println!(
            "warning: that exceeds half the provider limits ({}/hour, {}/day)",
            rate::PROVIDER_HOURLY_LIMIT,
            rate::PROVIDER_DAILY_LIMIT
        );
        if let Some(suggested) = advisory.suggested_interval {
            println!("consider an interval of at least {suggested}s");
        }
    }
}

fn prompt(question: &str) -> Result<String> {
    print!("{question}");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;

    Ok(line.trim().to_string())
}
