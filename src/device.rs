//! Device model and the removal-set computation

use crate::allowlist::Allowlist;
use crate::error::{CleanerError, Result, snippet};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A device registered on the account, as returned by the listing endpoint.
/// Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Device {
    #[serde(default, deserialize_with = "scalar_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub created: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub created_at: Option<String>,
}

impl Device {
    pub fn new(name: &str, id: &str) -> Self {
        Device {
            name: Some(name.to_string()),
            id: Some(id.to_string()),
            ..Default::default()
        }
    }

    /// Name used for allowlist matching: trimmed and lowercased
    pub fn normalized_name(&self) -> String {
        self.name
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_lowercase()
    }

    pub fn normalized_id(&self) -> String {
        self.id.as_deref().unwrap_or_default().trim().to_string()
    }

    /// Creation timestamp for display, `created` wins over `created_at`
    pub fn created_display(&self) -> &str {
        self.created
            .as_deref()
            .or(self.created_at.as_deref())
            .unwrap_or_default()
    }
}

/// Accept strings, numbers and booleans; `null` counts as absent
fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// The two payload shapes the listing endpoint is known to return
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DeviceListing {
    Bare(Vec<Device>),
    Wrapped { devices: Vec<Device> },
}

impl DeviceListing {
    fn into_devices(self) -> Vec<Device> {
        match self {
            DeviceListing::Bare(devices) => devices,
            DeviceListing::Wrapped { devices } => devices,
        }
    }
}

/// Decode a listing response body, accepting either `[...]` or `{"devices": [...]}`
pub fn decode_device_listing(body: &str) -> Result<Vec<Device>> {
    let listing: DeviceListing = serde_json::from_str(body).map_err(|_| {
        CleanerError::contract(format!(
            "Unexpected devices payload (expected a list or an object with a devices list): {}",
            snippet(body)
        ))
    })?;
    Ok(listing.into_devices())
}

/// A device selected for removal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalCandidate {
    pub name: String,
    pub id: String,
}

/// Devices whose name is not on the allowlist, in listing order.
/// Devices with an empty name or id are left alone entirely.
pub fn removal_set(devices: &[Device], allowlist: &Allowlist) -> Vec<RemovalCandidate> {
    devices
        .iter()
        .filter_map(|device| {
            let name = device.normalized_name();
            let id = device.normalized_id();
            if name.is_empty() || id.is_empty() {
                tracing::debug!(?device, "Skipping device without name or id");
                return None;
            }
            if allowlist.contains(&name) {
                return None;
            }
            Some(RemovalCandidate { name, id })
        })
        .collect()
}

/// One inventory line as printed for each device on the account
pub fn format_inventory_line(device: &Device) -> String {
    let name = device.name.as_deref().unwrap_or_default().to_lowercase();
    format!(
        "  - {:<20}  id={}  created={}",
        name,
        device.id.as_deref().unwrap_or_default(),
        device.created_display()
    )
}
