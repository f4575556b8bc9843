//! UI-agnostic conversation state types
//!
//! These are shared by the controllers and whatever front end renders them
//! (the TUI, one-shot CLI commands) and don't depend on any UI framework.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Reads an explicit `null` the same as a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Who produced a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

/// A document the backend cited for an answer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_content: Option<String>,
}

impl Source {
    /// Source with only a `metadata.source` identifier
    pub fn named(name: impl Into<String>) -> Self {
        let mut metadata = Map::new();
        metadata.insert("source".to_string(), Value::String(name.into()));
        Self {
            metadata,
            page_content: None,
        }
    }

    /// The `metadata.source` identifier, if the backend sent one
    pub fn name(&self) -> Option<&str> {
        self.metadata.get("source").and_then(Value::as_str)
    }

    pub fn label(&self) -> &str {
        self.name().unwrap_or("Unknown source")
    }
}

/// One transcript entry.
///
/// Fields are only reachable through accessors: an entry never changes after
/// it has been built.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    role: Role,
    content: String,
    sources: Vec<Source>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            sources: Vec::new(),
        }
    }

    pub fn assistant(content: impl Into<String>, sources: Vec<Source>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            sources,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            sources: Vec::new(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }
}

/// Phase of the upload status slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadPhase {
    #[default]
    Idle,
    Uploading,
    Done,
    Error,
}

/// What the upload panel currently shows
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadStatus {
    pub phase: UploadPhase,
    pub label: String,
}

impl UploadStatus {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn new(phase: UploadPhase, label: impl Into<String>) -> Self {
        Self {
            phase,
            label: label.into(),
        }
    }
}
