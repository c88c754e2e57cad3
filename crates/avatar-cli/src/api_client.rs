//! HTTP client for the avatar service.
//!
//! Settings calls (upload, delete) carry the owner identity headers the upstream
//! gateway would normally add. Resolve is public and needs no identity.

use anyhow::{Context, Result};
use avatar_core::constants::{AVATAR_FIELD, OWNER_ID_HEADER, OWNER_NAME_HEADER};
use avatar_core::{AvatarView, Owner, OwnerId, VariantName};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Error body returned by the service.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
    code: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    owner: Option<Owner>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, owner: Option<Owner>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            owner,
        })
    }

    /// Create client from environment: AVATAR_API_URL (or API_URL), AVATAR_OWNER_ID,
    /// AVATAR_OWNER_NAME. Explicit arguments take precedence over the environment.
    pub fn from_env(
        base_url: Option<String>,
        owner_id: Option<OwnerId>,
        owner_name: Option<String>,
    ) -> Result<Self> {
        let base_url = base_url
            .or_else(|| std::env::var("AVATAR_API_URL").ok())
            .or_else(|| std::env::var("API_URL").ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let owner_id = match owner_id {
            Some(id) => Some(id),
            None => match std::env::var("AVATAR_OWNER_ID") {
                Ok(raw) => Some(
                    raw.trim()
                        .parse::<OwnerId>()
                        .context("AVATAR_OWNER_ID must be a UUID")?,
                ),
                Err(_) => None,
            },
        };

        let owner = owner_id.map(|id| {
            let name = owner_name
                .or_else(|| std::env::var("AVATAR_OWNER_NAME").ok())
                .unwrap_or_default();
            Owner::new(id, name)
        });

        Self::new(base_url, owner)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn owner(&self) -> Option<&Owner> {
        self.owner.as_ref()
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_owner(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let owner = self
            .owner
            .as_ref()
            .context("Missing owner identity. Set AVATAR_OWNER_ID or pass --owner-id")?;

        Ok(request
            .header(OWNER_ID_HEADER, owner.id.to_string())
            .header(OWNER_NAME_HEADER, urlencoding::encode(&owner.name).into_owned()))
    }

    async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = match serde_json::from_str::<ApiErrorBody>(&text) {
                Ok(body) => match body.code {
                    Some(code) => format!("{} ({})", body.error, code),
                    None => body.error,
                },
                Err(_) => text,
            };
            return Err(anyhow::anyhow!(
                "API request failed with status {}: {}",
                status,
                message
            ));
        }

        response
            .json()
            .await
            .context("Failed to parse response as JSON")
    }

    /// Upload (replace) the configured owner's avatar.
    pub async fn upload_avatar(
        &self,
        data: Vec<u8>,
        file_name: &str,
        content_type: &str,
    ) -> Result<AvatarView> {
        let part = reqwest::multipart::Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .with_context(|| format!("Invalid content type: {}", content_type))?;
        let form = reqwest::multipart::Form::new().part(AVATAR_FIELD, part);

        let request = self
            .client
            .post(self.build_url("/settings/avatar"))
            .multipart(form);
        let response = self
            .apply_owner(request)?
            .send()
            .await
            .context("Failed to send request")?;

        Self::parse_response(response).await
    }

    /// Remove the configured owner's avatar.
    pub async fn delete_avatar(&self) -> Result<AvatarView> {
        let request = self.client.delete(self.build_url("/settings/avatar"));
        let response = self
            .apply_owner(request)?
            .send()
            .await
            .context("Failed to send request")?;

        Self::parse_response(response).await
    }

    /// Resolve the avatar shown for `owner_id`.
    pub async fn resolve_avatar(
        &self,
        owner_id: OwnerId,
        variant: Option<VariantName>,
        name: Option<&str>,
    ) -> Result<AvatarView> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(variant) = variant {
            query.push(("variant", variant.to_string()));
        }
        if let Some(name) = name {
            query.push(("name", name.to_string()));
        }

        let response = self
            .client
            .get(self.build_url(&format!("/avatars/{}", owner_id)))
            .query(&query)
            .send()
            .await
            .context("Failed to send request")?;

        Self::parse_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:3000/", None).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(
            client.build_url("/settings/avatar"),
            "http://localhost:3000/settings/avatar"
        );
    }

    #[test]
    fn test_explicit_owner_wins_over_environment() {
        let id = OwnerId::new();
        let client = ApiClient::from_env(
            Some("http://avatars.test".to_string()),
            Some(id),
            Some("Ada Lovelace".to_string()),
        )
        .unwrap();

        let owner = client.owner().unwrap();
        assert_eq!(owner.id, id);
        assert_eq!(owner.name, "Ada Lovelace");
        assert_eq!(client.base_url(), "http://avatars.test");
    }

    #[test]
    fn test_settings_calls_require_owner() {
        let client = ApiClient::new("http://localhost:3000", None).unwrap();
        let request = client.client.delete(client.build_url("/settings/avatar"));
        assert!(client.apply_owner(request).is_err());
    }

    #[test]
    fn test_owner_name_header_is_percent_encoded() {
        let owner = Owner::new(OwnerId::new(), "Zoë Ng");
        let client = ApiClient::new("http://localhost:3000", Some(owner.clone())).unwrap();
        let request = client
            .apply_owner(client.client.delete(client.build_url("/settings/avatar")))
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(
            request.headers()[OWNER_ID_HEADER],
            owner.id.to_string().as_str()
        );
        assert_eq!(request.headers()[OWNER_NAME_HEADER], "Zo%C3%AB%20Ng");
    }
}
