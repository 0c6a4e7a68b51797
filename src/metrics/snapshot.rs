use serde::{Deserialize, Deserializer, Serialize};

/// One `/metrics` payload. Rebuilt from scratch on every successful poll.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub wa_ready: bool,
    pub prof_ready: u64,
    pub prof_total: u64,
    pub queued_jobs: u64,
    pub running_jobs: u64,
    pub pending_targets: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub profiles: Vec<Profile>,
}

/// A browser profile hosting one WhatsApp session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub key: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ready: bool,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub pid: Option<i64>,
    #[serde(default)]
    pub last_seen: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub windows: Vec<Window>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Window {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub wa_ready: bool,
    #[serde(default)]
    pub last_seen: Option<String>,
}

// The backend passes profile state through as-is, so `null` shows up where a
// list or flag is expected.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
