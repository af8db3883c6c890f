use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_FORM_ID: &str = "subscriptionForm";
pub const DEFAULT_METHOD: &str = "POST";
pub const STATUS_NODE_ID: &str = "status";

pub const EMAIL_FIELD: &str = "email";
pub const PLAN_FIELD: &str = "plan";

pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address.";
pub const MISSING_PLAN_MESSAGE: &str = "Please select a subscription plan.";

pub const SENDING_TEXT: &str = "⏳ Sending...";
pub const SUCCESS_TEXT: &str = "✅ Subscription successful! Thank you.";
pub const FAILURE_TEXT: &str = "❌ Could not send. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Email,
    Text,
    Select,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    name: String,
    kind: FieldKind,
    value: String,
    custom_validity: String,
}

impl FormField {
    pub fn new(name: impl Into<String>, kind: FieldKind, value: impl Into<String>) -> Self {
        let mut field = Self {
            name: name.into(),
            kind,
            value: String::new(),
            custom_validity: String::new(),
        };
        field.set_value(value);
        field
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Email values are sanitised: newlines dropped, surrounding ASCII whitespace trimmed.
    pub fn set_value(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.value = match self.kind {
            FieldKind::Email => value
                .chars()
                .filter(|c| *c != '\n' && *c != '\r')
                .collect::<String>()
                .trim_matches(|c: char| c.is_ascii_whitespace())
                .to_string(),
            FieldKind::Text | FieldKind::Select => value,
        };
    }

    pub fn custom_validity(&self) -> &str {
        &self.custom_validity
    }

    /// An empty message clears the custom error.
    pub fn set_custom_validity(&mut self, message: impl Into<String>) {
        self.custom_validity = message.into();
    }

    pub fn has_custom_error(&self) -> bool {
        !self.custom_validity.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    Green,
    Red,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusNode {
    pub id: String,
    pub text: String,
    pub color: Option<StatusColor>,
}

impl StatusNode {
    pub fn pending() -> Self {
        Self {
            id: STATUS_NODE_ID.to_string(),
            text: SENDING_TEXT.to_string(),
            color: None,
        }
    }

    pub fn set(&mut self, text: &str, color: StatusColor) {
        self.text = text.to_string();
        self.color = Some(color);
    }
}

/// Index of a status node among a form's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusHandle(usize);

#[derive(Debug, Clone)]
pub struct Form {
    id: String,
    action: String,
    method: Option<String>,
    fields: Vec<FormField>,
    status_nodes: Vec<StatusNode>,
}

impl Form {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            id: DEFAULT_FORM_ID.to_string(),
            action: action.into(),
            method: None,
            fields: Vec::new(),
            status_nodes: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_field(mut self, field: FormField) -> Self {
        self.add_field(field);
        self
    }

    /// Appends a field. Repeated names are kept, like repeated checkboxes.
    pub fn add_field(&mut self, field: FormField) {
        self.fields.push(field);
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn method(&self) -> Option<&str> {
        self.method.as_deref().filter(|m| !m.is_empty())
    }

    /// Upper-cased method, POST when unset.
    pub fn effective_method(&self) -> String {
        self.method().unwrap_or(DEFAULT_METHOD).to_ascii_uppercase()
    }

    /// First field with this name.
    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Name/value pairs of every named field, in document order.
    pub fn entries(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .filter(|f| !f.name.is_empty())
            .map(|f| (f.name.clone(), f.value.clone()))
            .collect()
    }

    pub fn append_status(&mut self, node: StatusNode) -> StatusHandle {
        self.status_nodes.push(node);
        StatusHandle(self.status_nodes.len() - 1)
    }

    pub fn remove_status_nodes(&mut self) {
        self.status_nodes.retain(|n| n.id != STATUS_NODE_ID);
    }

    pub fn status_mut(&mut self, handle: StatusHandle) -> Option<&mut StatusNode> {
        self.status_nodes.get_mut(handle.0)
    }

    pub fn status_nodes(&self) -> &[StatusNode] {
        &self.status_nodes
    }

    pub fn latest_status(&self) -> Option<&StatusNode> {
        self.status_nodes.last()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SubmitEvent {
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionResult {
    Success(serde_json::Value),
    Failure(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Invalid(Vec<FieldViolation>),
    Completed(SubmissionResult),
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Completed(SubmissionResult::Success(_)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    Invalid,
    Success,
    Failure,
}

/// Serialisable summary of one submission attempt.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionRecord {
    pub form_id: String,
    pub action: String,
    pub method: String,
    pub outcome: OutcomeKind,
    pub status: Option<StatusNode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<FieldViolation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

impl SubmissionRecord {
    pub fn new(form: &Form, outcome: &SubmitOutcome, submitted_at: DateTime<Utc>) -> Self {
        let elapsed_ms = (Utc::now() - submitted_at).num_milliseconds().max(0) as u64;
        let (kind, violations, payload, reason) = match outcome {
            SubmitOutcome::Invalid(v) => (OutcomeKind::Invalid, v.clone(), None, None),
            SubmitOutcome::Completed(SubmissionResult::Success(data)) => {
                (OutcomeKind::Success, Vec::new(), Some(data.clone()), None)
            }
            SubmitOutcome::Completed(SubmissionResult::Failure(reason)) => {
                (OutcomeKind::Failure, Vec::new(), None, Some(reason.clone()))
            }
        };

        Self {
            form_id: form.id().to_string(),
            action: form.action().to_string(),
            method: form.effective_method(),
            outcome: kind,
            status: match kind {
                OutcomeKind::Invalid => None,
                _ => form.latest_status().cloned(),
            },
            violations,
            payload,
            reason,
            submitted_at,
            elapsed_ms,
        }
    }
}
