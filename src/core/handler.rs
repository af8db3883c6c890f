use crate::domain::model::{
    FieldViolation, Form, StatusColor, StatusNode, SubmissionResult, SubmitEvent, SubmitOutcome,
    EMAIL_FIELD, FAILURE_TEXT, INVALID_EMAIL_MESSAGE, MISSING_PLAN_MESSAGE, PLAN_FIELD,
    SUCCESS_TEXT,
};
use crate::domain::ports::{ServerResponse, SubmissionRequest, Transport, ValidityReporter};
use crate::utils::error::{Result, SubmitError};
use crate::utils::validation::{is_present, is_valid_email};
use serde::Deserialize;

/// What happens to earlier status nodes when a new submission starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusPolicy {
    /// Every submission adds a node; earlier ones stay.
    #[default]
    Append,
    /// Earlier status nodes are removed before the new one is added.
    Replace,
}

/// Validates a subscription form and submits it through a [`Transport`].
///
/// The handler owns the form it was attached to. Each call to
/// [`on_submit`](Self::on_submit) is one submission attempt: field checks,
/// then (when valid) a single request whose outcome is written into a status
/// node on the form.
pub struct SubscriptionFormHandler<T: Transport, R: ValidityReporter> {
    form: Form,
    transport: T,
    reporter: R,
    status_policy: StatusPolicy,
}

impl<T: Transport, R: ValidityReporter> SubscriptionFormHandler<T, R> {
    pub fn attach(form: Form, transport: T, reporter: R) -> Result<Self> {
        for name in [EMAIL_FIELD, PLAN_FIELD] {
            if form.field(name).is_none() {
                return Err(SubmitError::MissingField {
                    field: name.to_string(),
                });
            }
        }

        tracing::debug!("Submit handler attached to form '{}'", form.id());
        Ok(Self {
            form,
            transport,
            reporter,
            status_policy: StatusPolicy::default(),
        })
    }

    pub fn with_status_policy(mut self, policy: StatusPolicy) -> Self {
        self.status_policy = policy;
        self
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut Form {
        &mut self.form
    }

    /// Runs one submission attempt and reports its outcome.
    ///
    /// Takes `&mut self`, so two attempts on one handler never overlap. Nothing
    /// else gates a resubmission once the previous call has returned.
    pub async fn on_submit(&mut self, event: &mut SubmitEvent) -> SubmitOutcome {
        event.prevent_default();

        let violations = self.validate_fields();
        if !violations.is_empty() {
            tracing::debug!("Submission blocked by {} invalid field(s)", violations.len());
            return SubmitOutcome::Invalid(violations);
        }

        let request = SubmissionRequest {
            url: self.form.action().to_string(),
            method: self.form.effective_method(),
            fields: self.form.entries(),
        };

        if self.status_policy == StatusPolicy::Replace {
            self.form.remove_status_nodes();
        }
        let status = self.form.append_status(StatusNode::pending());

        let result = match self.send(request).await {
            Ok(data) => {
                if let Some(node) = self.form.status_mut(status) {
                    node.set(SUCCESS_TEXT, StatusColor::Green);
                }
                SubmissionResult::Success(data)
            }
            Err(e) => {
                tracing::error!("❌ Submission failed: {}", e);
                if let Some(node) = self.form.status_mut(status) {
                    node.set(FAILURE_TEXT, StatusColor::Red);
                }
                SubmissionResult::Failure(e.to_string())
            }
        };

        SubmitOutcome::Completed(result)
    }

    async fn send(&self, request: SubmissionRequest) -> Result<serde_json::Value> {
        let sent: serde_json::Map<String, serde_json::Value> = request
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();
        tracing::info!(
            "🔹 Sending data to {} {}: {}",
            request.method,
            request.url,
            serde_json::Value::Object(sent)
        );

        let response = self.transport.send(request).await?;
        tracing::info!("🔹 Response status: {} {}", response.status(), response.reason());

        if !response.is_success() {
            return Err(SubmitError::ServerStatus {
                status: response.status(),
                reason: response.reason().to_string(),
            });
        }

        let data = response.json().await?;
        tracing::info!("✅ Server response: {}", data);
        Ok(data)
    }

    fn validate_fields(&mut self) -> Vec<FieldViolation> {
        [
            self.check_field(EMAIL_FIELD, is_valid_email, INVALID_EMAIL_MESSAGE),
            self.check_field(PLAN_FIELD, is_present, MISSING_PLAN_MESSAGE),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn check_field(
        &mut self,
        name: &str,
        rule: fn(&str) -> bool,
        message: &str,
    ) -> Option<FieldViolation> {
        let form_id = self.form.id().to_string();
        let valid = match self.form.field_mut(name) {
            Some(field) if rule(field.value()) => {
                field.set_custom_validity("");
                true
            }
            Some(field) => {
                field.set_custom_validity(message);
                false
            }
            None => false,
        };

        if valid {
            return None;
        }

        self.reporter.report_validity(&form_id, name, message);
        Some(FieldViolation {
            field: name.to_string(),
            message: message.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{FieldKind, FormField, SENDING_TEXT};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    struct MockResponse {
        status: u16,
        reason: String,
        body: String,
    }

    #[async_trait]
    impl ServerResponse for MockResponse {
        fn status(&self) -> u16 {
            self.status
        }

        fn reason(&self) -> &str {
            &self.reason
        }

        async fn json(self) -> Result<serde_json::Value> {
            Ok(serde_json::from_str(&self.body)?)
        }
    }

    #[derive(Clone)]
    struct MockTransport {
        requests: Arc<Mutex<Vec<SubmissionRequest>>>,
        reply: Option<(u16, &'static str, &'static str)>,
    }

    impl MockTransport {
        fn replying(status: u16, reason: &'static str, body: &'static str) -> Self {
            Self {
                requests: Arc::new(Mutex::new(Vec::new())),
                reply: Some((status, reason, body)),
            }
        }

        fn unreachable() -> Self {
            Self {
                requests: Arc::new(Mutex::new(Vec::new())),
                reply: None,
            }
        }

        fn requests(&self) -> Vec<SubmissionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        type Response = MockResponse;

        async fn send(&self, request: SubmissionRequest) -> Result<MockResponse> {
            self.requests.lock().unwrap().push(request);
            match self.reply {
                Some((status, reason, body)) => Ok(MockResponse {
                    status,
                    reason: reason.to_string(),
                    body: body.to_string(),
                }),
                None => Err(SubmitError::IoError(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "connection refused",
                ))),
            }
        }
    }

    #[derive(Clone, Default)]
    struct RecordingReporter {
        reports: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl ValidityReporter for RecordingReporter {
        fn report_validity(&self, _form_id: &str, field: &str, message: &str) {
            self.reports
                .lock()
                .unwrap()
                .push((field.to_string(), message.to_string()));
        }
    }

    fn form(email: &str, plan: &str) -> Form {
        Form::new("http://example.com/subscribe")
            .with_field(FormField::new(EMAIL_FIELD, FieldKind::Email, email))
            .with_field(FormField::new(PLAN_FIELD, FieldKind::Select, plan))
    }

    #[test]
    fn test_attach_requires_email_and_plan() {
        let form = Form::new("http://example.com/subscribe")
            .with_field(FormField::new(EMAIL_FIELD, FieldKind::Email, "a@b.com"));
        let result = SubscriptionFormHandler::attach(
            form,
            MockTransport::unreachable(),
            RecordingReporter::default(),
        );

        match result {
            Err(SubmitError::MissingField { field }) => assert_eq!(field, "plan"),
            _ => panic!("expected a missing plan field"),
        }
    }

    #[test]
    fn test_invalid_fields_block_the_request() {
        let transport = MockTransport::replying(200, "OK", "{}");
        let reporter = RecordingReporter::default();
        let mut handler =
            SubscriptionFormHandler::attach(form("not-an-email", ""), transport.clone(), reporter.clone())
                .unwrap();

        let mut event = SubmitEvent::new();
        let outcome = tokio_test::block_on(handler.on_submit(&mut event));

        assert!(event.default_prevented());
        assert_eq!(
            outcome,
            SubmitOutcome::Invalid(vec![
                FieldViolation {
                    field: "email".to_string(),
                    message: INVALID_EMAIL_MESSAGE.to_string(),
                },
                FieldViolation {
                    field: "plan".to_string(),
                    message: MISSING_PLAN_MESSAGE.to_string(),
                },
            ])
        );
        assert!(transport.requests().is_empty());
        assert!(handler.form().status_nodes().is_empty());
        assert_eq!(reporter.reports.lock().unwrap().len(), 2);
        assert_eq!(
            handler.form().field(EMAIL_FIELD).unwrap().custom_validity(),
            INVALID_EMAIL_MESSAGE
        );
    }

    #[tokio::test]
    async fn test_empty_email_blocks_the_request() {
        let transport = MockTransport::replying(200, "OK", "{}");
        let mut handler =
            SubscriptionFormHandler::attach(form("", "basic"), transport.clone(), RecordingReporter::default())
                .unwrap();

        let outcome = handler.on_submit(&mut SubmitEvent::new()).await;

        assert!(matches!(outcome, SubmitOutcome::Invalid(ref v) if v.len() == 1 && v[0].field == "email"));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_valid_form_sends_one_request() {
        let transport = MockTransport::replying(200, "OK", r#"{"subscribed": true}"#);
        let mut handler = SubscriptionFormHandler::attach(
            form("a@b.com", "basic").with_field(FormField::new("source", FieldKind::Text, "footer")),
            transport.clone(),
            RecordingReporter::default(),
        )
        .unwrap();

        let outcome = handler.on_submit(&mut SubmitEvent::new()).await;

        assert_eq!(
            outcome,
            SubmitOutcome::Completed(SubmissionResult::Success(serde_json::json!({"subscribed": true})))
        );
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "http://example.com/subscribe");
        assert_eq!(requests[0].method, "POST");
        assert_eq!(
            requests[0].fields,
            vec![
                ("email".to_string(), "a@b.com".to_string()),
                ("plan".to_string(), "basic".to_string()),
                ("source".to_string(), "footer".to_string()),
            ]
        );

        let status = handler.form().latest_status().unwrap();
        assert_eq!(status.id, "status");
        assert_eq!(status.text, SUCCESS_TEXT);
        assert_eq!(status.color, Some(StatusColor::Green));
    }

    #[tokio::test]
    async fn test_server_error_shows_failure() {
        let transport = MockTransport::replying(500, "Internal Server Error", "{}");
        let mut handler =
            SubscriptionFormHandler::attach(form("a@b.com", "basic"), transport, RecordingReporter::default())
                .unwrap();

        let outcome = handler.on_submit(&mut SubmitEvent::new()).await;

        assert_eq!(
            outcome,
            SubmitOutcome::Completed(SubmissionResult::Failure(
                "Server responded with 500 Internal Server Error".to_string()
            ))
        );
        let status = handler.form().latest_status().unwrap();
        assert_eq!(status.text, FAILURE_TEXT);
        assert_eq!(status.color, Some(StatusColor::Red));
    }

    #[tokio::test]
    async fn test_unparseable_body_shows_failure() {
        let transport = MockTransport::replying(200, "OK", "<html>thanks</html>");
        let mut handler =
            SubscriptionFormHandler::attach(form("a@b.com", "basic"), transport, RecordingReporter::default())
                .unwrap();

        let outcome = handler.on_submit(&mut SubmitEvent::new()).await;

        assert!(matches!(outcome, SubmitOutcome::Completed(SubmissionResult::Failure(_))));
        assert_eq!(handler.form().latest_status().unwrap().text, FAILURE_TEXT);
    }

    #[tokio::test]
    async fn test_connection_failure_shows_failure() {
        let mut handler = SubscriptionFormHandler::attach(
            form("a@b.com", "basic"),
            MockTransport::unreachable(),
            RecordingReporter::default(),
        )
        .unwrap();

        handler.on_submit(&mut SubmitEvent::new()).await;

        let status = handler.form().latest_status().unwrap();
        assert_eq!(status.text, FAILURE_TEXT);
        assert_eq!(status.color, Some(StatusColor::Red));
    }

    #[tokio::test]
    async fn test_custom_validity_cleared_after_fix() {
        let transport = MockTransport::replying(200, "OK", "{}");
        let reporter = RecordingReporter::default();
        let mut handler =
            SubscriptionFormHandler::attach(form("broken", "basic"), transport.clone(), reporter.clone())
                .unwrap();

        handler.on_submit(&mut SubmitEvent::new()).await;
        assert!(handler.form().field(EMAIL_FIELD).unwrap().has_custom_error());

        handler
            .form_mut()
            .field_mut(EMAIL_FIELD)
            .unwrap()
            .set_value("fixed@example.com");
        let outcome = handler.on_submit(&mut SubmitEvent::new()).await;

        assert!(outcome.is_success());
        assert!(!handler.form().field(EMAIL_FIELD).unwrap().has_custom_error());
        assert_eq!(transport.requests().len(), 1);
        assert_eq!(reporter.reports.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_append_policy_keeps_previous_status_nodes() {
        let transport = MockTransport::replying(200, "OK", "{}");
        let mut handler =
            SubscriptionFormHandler::attach(form("a@b.com", "basic"), transport, RecordingReporter::default())
                .unwrap();

        handler.on_submit(&mut SubmitEvent::new()).await;
        handler.on_submit(&mut SubmitEvent::new()).await;

        assert_eq!(handler.form().status_nodes().len(), 2);
    }

    #[tokio::test]
    async fn test_replace_policy_keeps_one_status_node() {
        let transport = MockTransport::replying(500, "Internal Server Error", "");
        let mut handler =
            SubscriptionFormHandler::attach(form("a@b.com", "basic"), transport, RecordingReporter::default())
                .unwrap()
                .with_status_policy(StatusPolicy::Replace);

        handler.on_submit(&mut SubmitEvent::new()).await;
        handler.on_submit(&mut SubmitEvent::new()).await;

        let nodes = handler.form().status_nodes();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].text, FAILURE_TEXT);
        assert_ne!(nodes[0].text, SENDING_TEXT);
    }
}
