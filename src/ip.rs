use serde::Deserialize;

use crate::error::Result;

pub const DEFAULT_IP_ENDPOINT: &str = "https://api.ipify.org?format=json";

#[derive(Debug, Clone, Deserialize)]
struct IpResponse {
    ip: String,
}

/// Ask the lookup endpoint what our public address is. One shot, no retry;
/// the caller skips the cycle if this fails.
pub async fn resolve(client: &reqwest::Client, endpoint: &str) -> Result<String> {
    let response = client
        .get(endpoint)
        .send()
        .await?
        .error_for_status()?
        .json::<IpResponse>()
        .await?;

    Ok(response.ip)
}
