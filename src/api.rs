//! Mullvad account API
//!
//! Three calls are used:
//!   POST   /auth/v1/token              {"account_number": "..."}
//!   GET    /accounts/v1/devices        Authorization: Bearer <token>
//!   DELETE /accounts/v1/devices/{id}   Authorization: Bearer <token>

use crate::device::{Device, decode_device_listing};
use crate::error::{CleanerError, Result, snippet};
use reqwest::Url;
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.mullvad.net";

/// Per-request timeout used when none is configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Short-lived bearer token. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        AccessToken(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Raw answer to a delete request. The caller decides whether it counts as success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub status: u16,
    pub body: String,
}

impl DeleteOutcome {
    pub fn is_deleted(&self) -> bool {
        matches!(self.status, 200 | 204)
    }
}

/// Operations the reconciliation loop needs from the account API
pub trait AccountApi {
    /// Exchange the account number for an access token
    fn authenticate(&self, account_number: &str) -> Result<AccessToken>;

    /// List every device registered on the account
    fn list_devices(&self, token: &AccessToken) -> Result<Vec<Device>>;

    /// Remove one device by id
    fn delete_device(&self, token: &AccessToken, device_id: &str) -> Result<DeleteOutcome>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// Blocking HTTP client for the Mullvad API
#[derive(Debug, Clone)]
pub struct MullvadClient {
    client: Client,
    base: Url,
}

impl MullvadClient {
    pub fn new(api_base: &str, timeout: Duration) -> Result<Self> {
        let base = parse_api_base(api_base)?;

        let client = Client::builder()
            .user_agent(concat!("mullvad-device-cleaner/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| CleanerError::transport("Failed to create HTTP client", e))?;

        Ok(Self { client, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Build an endpoint URL below the API base. Each segment is percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| CleanerError::InvalidSetting {
                message: format!("API base URL cannot have a path: {}", self.base),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// URL of a single device. Ids that would not stay one path segment are refused.
    fn device_endpoint(&self, device_id: &str) -> Result<Url> {
        if matches!(device_id, "" | "." | "..") {
            return Err(CleanerError::contract(format!(
                "Refusing to delete device with unusable id '{}'",
                device_id
            )));
        }
        self.endpoint(&["accounts", "v1", "devices", device_id])
    }
}

fn parse_api_base(api_base: &str) -> Result<Url> {
    let trimmed = api_base.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|e| CleanerError::InvalidSetting {
        message: format!("Invalid API base URL '{}': {}", api_base, e),
    })?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(CleanerError::InvalidSetting {
            message: format!("API base URL must be an http(s) URL: {}", api_base),
        });
    }
    Ok(url)
}

/// Read the status and body of a response, failing on transport errors only
fn read_response(response: Response, context: &str) -> Result<(u16, String)> {
    let status = response.status().as_u16();
    let body = response
        .text()
        .map_err(|e| CleanerError::transport(format!("{} (reading body)", context), e))?;
    Ok((status, body))
}

impl AccountApi for MullvadClient {
    fn authenticate(&self, account_number: &str) -> Result<AccessToken> {
        let url = self.endpoint(&["auth", "v1", "token"])?;
        tracing::debug!(%url, "Requesting access token");

        let response = self
            .client
            .post(url)
            .json(&serde_json::json!({ "account_number": account_number }))
            .send()
            .map_err(|e| CleanerError::transport("Token request", e))?;

        let (status, body) = read_response(response, "Token request")?;
        if status != 200 {
            return Err(CleanerError::Api {
                operation: "Token request",
                status,
                body: snippet(&body),
            });
        }

        let parsed: TokenResponse = serde_json::from_str(&body).map_err(|_| {
            CleanerError::contract("Token response could not be decoded as a token object")
        })?;

        // The body holds the token on success, so it is never echoed here
        match parsed.access_token {
            Some(token) if !token.is_empty() => Ok(AccessToken::new(token)),
            _ => Err(CleanerError::contract("Token response missing access_token")),
        }
    }

    fn list_devices(&self, token: &AccessToken) -> Result<Vec<Device>> {
        let url = self.endpoint(&["accounts", "v1", "devices"])?;
        tracing::debug!(%url, "Listing devices");

        let response = self
            .client
            .get(url)
            .bearer_auth(token.as_str())
            .send()
            .map_err(|e| CleanerError::transport("List devices", e))?;

        let (status, body) = read_response(response, "List devices")?;
        if status != 200 {
            return Err(CleanerError::Api {
                operation: "List devices",
                status,
                body: snippet(&body),
            });
        }

        let devices = decode_device_listing(&body)?;
        tracing::debug!(count = devices.len(), "Listed devices");
        Ok(devices)
    }

    fn delete_device(&self, token: &AccessToken, device_id: &str) -> Result<DeleteOutcome> {
        let url = self.device_endpoint(device_id)?;
        tracing::debug!(%url, "Deleting device");

        let response = self
            .client
            .delete(url)
            .bearer_auth(token.as_str())
            .send()
            .map_err(|e| CleanerError::transport(format!("Delete device {}", device_id), e))?;

        let (status, body) = read_response(response, "Delete device")?;
        tracing::debug!(status, "Delete answered");
        Ok(DeleteOutcome {
            status,
            body: snippet(&body),
        })
    }
}
