// src/services/backend.rs
use std::future::Future;

use reqwest::header::CONTENT_TYPE;

use crate::{
    error::BackendError,
    message::{AskRequest, AskResponse},
};

pub const DEFAULT_ASK_URL: &str = "http://127.0.0.1:5000/ask";

/// The remote Q&A service, seen from the widget.
pub trait AskBackend: Send + Sync + 'static {
    fn ask(
        &self,
        request: &AskRequest,
    ) -> impl Future<Output = Result<AskResponse, BackendError>> + Send;
}

/// Plain JSON-over-HTTP client. One POST per question, no timeout, no retry.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: reqwest::Client,
    url: String,
}

impl HttpBackend {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Default for HttpBackend {
    fn default() -> Self {
        Self::new(DEFAULT_ASK_URL)
    }
}

impl AskBackend for HttpBackend {
    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, BackendError> {
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let parsed = serde_json::from_slice(&body)?;
        Ok(parsed)
    }
}
