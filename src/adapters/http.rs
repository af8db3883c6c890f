use crate::domain::ports::{ServerResponse, SubmissionRequest, Transport};
use crate::utils::error::{Result, SubmitError};
use async_trait::async_trait;
use reqwest::multipart;
use reqwest::{Client, Method};
use std::time::Duration;

const UNKNOWN_REASON: &str = "<unknown>";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Sends form entries as `multipart/form-data` with reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// No timeout unless one is given.
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct HttpResponse {
    inner: reqwest::Response,
}

#[async_trait]
impl ServerResponse for HttpResponse {
    fn status(&self) -> u16 {
        self.inner.status().as_u16()
    }

    /// Standard phrase for the status code. reqwest does not expose the phrase
    /// the server sent, so non-standard phrases are not available here.
    fn reason(&self) -> &str {
        self.inner.status().canonical_reason().unwrap_or(UNKNOWN_REASON)
    }

    async fn json(self) -> Result<serde_json::Value> {
        let bytes = self.inner.bytes().await?;
        tracing::debug!("Read response body ({} bytes)", bytes.len());
        let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes[..]);
        Ok(serde_json::from_slice(body)?)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    type Response = HttpResponse;

    async fn send(&self, request: SubmissionRequest) -> Result<HttpResponse> {
        let method = Method::from_bytes(request.method.as_bytes()).map_err(|_| {
            SubmitError::InvalidMethod {
                method: request.method.clone(),
            }
        })?;

        if method == Method::GET || method == Method::HEAD {
            return Err(SubmitError::BodyNotAllowed {
                method: method.to_string(),
            });
        }

        let body = request
            .fields
            .into_iter()
            .fold(multipart::Form::new(), |form, (name, value)| form.text(name, value));

        tracing::debug!("Making {} request to: {}", method, request.url);
        let response = self
            .client
            .request(method, &request.url)
            .multipart(body)
            .send()
            .await?;

        Ok(HttpResponse { inner: response })
    }
}
