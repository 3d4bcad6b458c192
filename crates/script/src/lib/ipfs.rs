use std::path::Path;
use std::time::Duration;

use anyhow::anyhow;
use reqwest::{multipart, Client, ClientBuilder, RequestBuilder};
use serde::{Deserialize, Serialize};

use crate::utils;

pub const DEFAULT_PINATA_API_BASE: &str = "https://api.pinata.cloud";

/// Response body shared by Pinata's pinning endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PinResponse {
    pub ipfs_hash: String,
    pub pin_size: u64,
    pub timestamp: String,
}

/// Seam between the token URI builder and the pinning service, so tests can
/// substitute an in-memory implementation.
pub trait IpfsPinner {
    #[allow(async_fn_in_trait)]
    async fn pin_file(&self, path: &Path) -> anyhow::Result<PinResponse>;

    #[allow(async_fn_in_trait)]
    async fn pin_json(&self, name: &str, content: &serde_json::Value) -> anyhow::Result<PinResponse>;
}

pub struct PinataClient {
    api_base: String,
    api_key: String,
    api_secret: String,
    client: Client,
}

impl PinataClient {
    pub fn new(api_key: &str, api_secret: &str) -> Self {
        Self::with_api_base(DEFAULT_PINATA_API_BASE, api_key, api_secret)
    }

    pub fn with_api_base(api_base: &str, api_key: &str, api_secret: &str) -> Self {
        let client = ClientBuilder::new()
            .timeout(Duration::new(300, 0))
            .build()
            .expect("Failed to create http client");

        Self {
            api_base: Self::normalize_url(api_base),
            api_key: api_key.to_owned(),
            api_secret: api_secret.to_owned(),
            client,
        }
    }

    fn normalize_url(base_url: &str) -> String {
        base_url.strip_suffix('/').unwrap_or(base_url).to_owned()
    }

    fn map_err(label: &str, e: reqwest::Error) -> anyhow::Error {
        anyhow!("{}: {:#?}", label, e)
    }

    fn authenticated(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("pinata_api_key", &self.api_key)
            .header("pinata_secret_api_key", &self.api_secret)
    }

    async fn pin_file_impl(&self, path: &Path) -> anyhow::Result<PinResponse> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_owned());
        tracing::info!("Pinning file {file_name}");

        let bytes = utils::read_binary(path)
            .map_err(|e| anyhow!("Failed to read {}: {e:#?}", path.display()))?;
        let url = format!("{}/pinning/pinFileToIPFS", self.api_base);
        let part = multipart::Part::bytes(bytes).file_name(file_name.clone());
        let form = multipart::Form::new().part("file", part);

        let response = self
            .authenticated(self.client.post(url.clone()).multipart(form))
            .send()
            .await
            .map_err(|e| Self::map_err(&format!("Failed to upload {file_name} to {url}"), e))?;

        tracing::debug!(
            "Received response with status {} for {file_name}",
            response.status()
        );

        let res = response
            .error_for_status()
            .map_err(|e| Self::map_err(&format!("Unsuccessful status pinning {file_name}"), e))?
            .json::<PinResponse>()
            .await
            .map_err(|e| Self::map_err("Failed to parse pin response", e))?;

        tracing::info!("Pinned {file_name} as {}", res.ipfs_hash);
        Ok(res)
    }

    async fn pin_json_impl(
        &self,
        name: &str,
        content: &serde_json::Value,
    ) -> anyhow::Result<PinResponse> {
        tracing::info!("Pinning JSON document {name}");
        let url = format!("{}/pinning/pinJSONToIPFS", self.api_base);
        let body = serde_json::json!({
            "pinataMetadata": { "name": name },
            "pinataContent": content,
        });

        let response = self
            .authenticated(self.client.post(url.clone()).json(&body))
            .send()
            .await
            .map_err(|e| Self::map_err(&format!("Failed to upload {name} to {url}"), e))?;

        let res = response
            .error_for_status()
            .map_err(|e| Self::map_err(&format!("Unsuccessful status pinning {name}"), e))?
            .json::<PinResponse>()
            .await
            .map_err(|e| Self::map_err("Failed to parse pin response", e))?;

        tracing::info!("Pinned {name} as {}", res.ipfs_hash);
        Ok(res)
    }
}

impl IpfsPinner for PinataClient {
    async fn pin_file(&self, path: &Path) -> anyhow::Result<PinResponse> {
        self.pin_file_impl(path).await
    }

    async fn pin_json(&self, name: &str, content: &serde_json::Value) -> anyhow::Result<PinResponse> {
        self.pin_json_impl(name, content).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_response_uses_pinata_field_names() {
        let raw = r#"{
            "IpfsHash": "QmaVkBn2tKmjbhphU7eyztbvSQU5EXDdqRyXZtRhSGgJGo",
            "PinSize": 174,
            "Timestamp": "2023-01-01T00:00:00.000Z"
        }"#;
        let parsed: PinResponse = serde_json::from_str(raw).expect("Failed to parse");
        assert_eq!(
            parsed.ipfs_hash,
            "QmaVkBn2tKmjbhphU7eyztbvSQU5EXDdqRyXZtRhSGgJGo"
        );
        assert_eq!(parsed.pin_size, 174);
    }

    #[test]
    fn api_base_is_normalized() {
        let client = PinataClient::with_api_base("https://api.pinata.cloud/", "key", "secret");
        assert_eq!(client.api_base, "https://api.pinata.cloud");
    }
}
