use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Opaque, stable identifier assigned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Server-reported analysis status.
///
/// Unrecognised strings are preserved in `Other` so a record always
/// round-trips exactly as the backend sent it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    Queued,
    Running,
    Done,
    Error,
    Stopped,
    Other(String),
}

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Status::Queued => "queued",
            Status::Running => "running",
            Status::Done => "done",
            Status::Error => "error",
            Status::Stopped => "stopped",
            Status::Other(raw) => raw,
        }
    }

    /// Analysis has settled and will not change without a new request.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Done | Status::Error | Status::Stopped)
    }

    /// Whether (re)analysis may be requested from this status.
    pub fn can_start(&self) -> bool {
        self.is_terminal()
    }

    pub fn can_stop(&self) -> bool {
        matches!(self, Status::Running)
    }
}

impl From<String> for Status {
    fn from(value: String) -> Self {
        match value.as_str() {
            "queued" => Status::Queued,
            "running" => Status::Running,
            "done" => Status::Done,
            "error" => Status::Error,
            "stopped" => Status::Stopped,
            _ => Status::Other(value),
        }
    }
}

impl From<Status> for String {
    fn from(value: Status) -> Self {
        match value {
            Status::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokenLink {
    pub url: String,
    pub status: u16,
}

/// One tracked crawl target and its latest known analysis result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub url: String,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_version: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub internal_links: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub external_links: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub accessible_links: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_login_form: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub headings: BTreeMap<String, u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub broken_links: Vec<BrokenLink>,
}

impl Record {
    /// A freshly submitted record before any analysis result is known.
    pub fn queued(id: impl Into<RecordId>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            status: Status::Queued,
            title: None,
            html_version: None,
            internal_links: 0,
            external_links: 0,
            accessible_links: 0,
            has_login_form: false,
            headings: BTreeMap::new(),
            broken_links: Vec::new(),
        }
    }
}

// Nil slices and maps on the backend serialize as `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
