pub mod client;
pub mod types;

use async_trait::async_trait;

use crate::document::UploadFile;
use crate::error::TransportError;

pub use client::HttpTransport;
pub use types::{HealthReport, HistoryEntry, QueryRequest, QueryResponse, UploadReceipt};

/// Request/response seam between the controllers and the RAG backend.
///
/// The controllers only ever see decoded bodies or a [`TransportError`];
/// tests swap in scripted implementations.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, TransportError>;

    async fn upload(&self, file: &UploadFile) -> Result<UploadReceipt, TransportError>;

    async fn health(&self) -> Result<HealthReport, TransportError>;
}
