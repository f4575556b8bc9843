use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use tracing::{debug, instrument};

use super::types::{ErrorBody, HealthReport, QueryRequest, QueryResponse, UploadReceipt};
use super::Transport;
use crate::document::UploadFile;
use crate::error::TransportError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// HTTP transport for the RAG backend's `/query`, `/upload` and `/health`
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Use a preconfigured client (timeouts, proxies, TLS roots)
    pub fn with_client(base_url: &str, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

/// Turns a non-2xx response into [`TransportError::Api`], keeping the
/// backend's `detail` text when it sent one.
async fn check_status(response: Response) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let detail = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(detail),
        }) => detail,
        Ok(body) => body.detail.to_string(),
        Err(_) if text.is_empty() => status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string(),
        Err(_) => text,
    };

    Err(TransportError::Api {
        status: status.as_u16(),
        detail,
    })
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(history = request.chat_history.len()))]
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, TransportError> {
        debug!("Sending query");

        let response = self
            .client
            .post(self.url("query"))
            .json(request)
            .send()
            .await?;
        let response = check_status(response).await?;

        let body = response.bytes().await?;
        let query_response: QueryResponse = serde_json::from_slice(&body)?;

        debug!(sources = query_response.sources.len(), "Received answer");
        Ok(query_response)
    }

    #[instrument(skip(self, file), fields(file = %file.file_name, bytes = file.bytes.len()))]
    async fn upload(&self, file: &UploadFile) -> Result<UploadReceipt, TransportError> {
        let mut part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        if let Some(mime) = &file.mime {
            part = part.mime_str(mime)?;
        }
        let form = Form::new().part("file", part);

        debug!("Uploading document");

        let response = self
            .client
            .post(self.url("upload"))
            .multipart(form)
            .send()
            .await?;
        let response = check_status(response).await?;

        // Any 2xx counts; the body is informational only.
        let body = response.bytes().await?;
        let receipt: UploadReceipt = serde_json::from_slice(&body).unwrap_or_default();

        debug!(document_id = ?receipt.document_id, "Upload accepted");
        Ok(receipt)
    }

    #[instrument(skip(self))]
    async fn health(&self) -> Result<HealthReport, TransportError> {
        let response = self.client.get(self.url("health")).send().await?;
        let response = check_status(response).await?;

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
