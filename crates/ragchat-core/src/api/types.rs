use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::state::{null_as_default, Role, Source};

/// One `{role, content}` pair of the `chat_history` sent with a query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    pub chat_history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sources: Vec<Source>,
}

/// Body the backend returns after ingesting a document. Nothing in it is
/// required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub document_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub services: HashMap<String, String>,
}

/// Error body FastAPI-style backends send with a non-2xx status
#[derive(Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: serde_json::Value,
}
