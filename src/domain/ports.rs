use crate::utils::error::Result;
use async_trait::async_trait;

/// A request ready to leave the process: target, verb and multipart entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub url: String,
    pub method: String,
    pub fields: Vec<(String, String)>,
}

/// Response whose headers have arrived but whose body is still unread.
#[async_trait]
pub trait ServerResponse: Send + Sized {
    fn status(&self) -> u16;
    fn reason(&self) -> &str;

    fn is_success(&self) -> bool {
        (200..300).contains(&self.status())
    }

    async fn json(self) -> Result<serde_json::Value>;
}

#[async_trait]
pub trait Transport: Send + Sync {
    type Response: ServerResponse;

    /// Resolves once response headers are in.
    async fn send(&self, request: SubmissionRequest) -> Result<Self::Response>;
}

/// Displays a field's validation message to the user.
pub trait ValidityReporter: Send + Sync {
    fn report_validity(&self, form_id: &str, field: &str, message: &str);
}
