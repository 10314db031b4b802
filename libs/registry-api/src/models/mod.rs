//! Registry API models

use serde::{Deserialize, Deserializer, Serialize};

pub const ACTION_PUSH: &str = "push";

/// Notification envelope posted by the registry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Notifications {
    #[serde(default, deserialize_with = "null_as_default")]
    pub events: Vec<Event>,
}

/// A single registry event.
///
/// Registries also send `request`, `actor` and `source` records; the deployer
/// has no use for them and they are ignored on decode. Fields the deployer
/// only carries along are kept loosely typed so that one odd value does not
/// reject the whole envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub id: Option<String>,

    /// As sent by the registry, not necessarily RFC 3339
    #[serde(default)]
    pub timestamp: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub action: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub target: Target,
}

impl Event {
    pub fn is_push(&self) -> bool {
        self.action == ACTION_PUSH
    }

    pub fn has_tag(&self) -> bool {
        !self.target.tag.is_empty()
    }
}

/// What an event acted upon
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    #[serde(default)]
    pub media_type: Option<String>,

    #[serde(default)]
    pub digest: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub repository: String,

    /// Empty for pushes of layers and untagged manifests
    #[serde(default, deserialize_with = "null_as_default")]
    pub tag: String,
}

/// Decode JSON `null` as the type's empty value
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Version response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionResponse {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}
