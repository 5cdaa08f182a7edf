use reqwest::header;
use serde::Deserialize;

use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://adm.tools/action";

/// HTTP client for the provider's record API. The bearer token rides along as
/// a default header on every request.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

/// Every list endpoint wraps its payload the same way.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub result: bool,
    pub response: Option<ListBody<T>>,
    #[serde(default)]
    pub messages: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListBody<T> {
    #[serde(default = "Vec::new")]
    pub list: Vec<T>,
}

impl<T> Envelope<T> {
    fn into_list(self) -> Result<Vec<T>> {
        if !self.result {
            let detail = if self.messages.is_empty() {
                "request rejected with no message".to_string()
            } else {
                self.messages
                    .iter()
                    .map(|m| match m.as_str() {
                        Some(text) => text.to_string(),
                        None => m.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join("; ")
            };
            return Err(Error::Api(detail));
        }

        Ok(self.response.map(|body| body.list).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Domain {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DnsRecord {
    pub id: i64,
    pub r#type: String,
    pub name: String,
    #[serde(default)]
    pub data: String,
}

impl ApiClient {
    pub fn new(api_key: &str) -> Result<ApiClient> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Same client pointed at a different base URL. Tests aim this at a local
    /// mock server.
    pub fn with_base_url(api_key: &str, base_url: impl Into<String>) -> Result<ApiClient> {
        let mut headers = header::HeaderMap::new();
        let bearer = format!("Bearer {}", api_key);
        let auth_header = header::HeaderValue::from_str(&bearer)
            .map_err(|e| Error::ConfigInvalid(format!("api_key is not a usable header: {e}")))?;
        headers.insert("Authorization", auth_header);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(ApiClient {
            client,
            base_url: base_url.into(),
        })
    }

    /// Point one record at `ip`. Fire-and-forget: the response body and status
    /// are ignored, only transport failures surface.
    pub async fn update_record(&self, record_id: &str, ip: &str) -> Result<()> {
        let endpoint = format!("{}/dns/record/edit", self.base_url);
        let params = [("data", ip), ("subdomain_id", record_id), ("priority", "0")];

        self.client.post(endpoint).form(&params).send().await?;

        Ok(())
    }

    /// All domains on the account, first page sorted by name. Wizard only.
    pub async fn list_domains(&self) -> Result<Vec<Domain>> {
        let endpoint = format!("{}/domain/list", self.base_url);
        let params = [
            ("page", "1"),
            ("per_page", "100"),
            ("sort_field", "domain_name"),
            ("sort_dir", "asc"),
        ];

        let envelope = self
            .client
            .post(endpoint)
            .form(&params)
            .send()
            .await?
            .json::<Envelope<Domain>>()
            .await?;

        envelope.into_list()
    }

    /// All DNS records of one domain, every type; callers filter to A records.
    pub async fn list_records(&self, domain_id: i64) -> Result<Vec<DnsRecord>> {
        let endpoint = format!("{}/dns/record/list", self.base_url);
        let params = [("domain_id", domain_id.to_string())];

        let envelope = self
            .client
            .post(endpoint)
            .form(&params)
            .send()
            .await?
            .json::<Envelope<DnsRecord>>()
            .await?;

        envelope.into_list()
    }
}
