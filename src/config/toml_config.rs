use crate::core::handler::StatusPolicy;
use crate::domain::model::{FieldKind, Form, FormField, DEFAULT_FORM_ID, EMAIL_FIELD, PLAN_FIELD};
use crate::utils::error::{Result, SubmitError};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern compiles"));

/// Form definition file.
///
/// ```toml
/// [form]
/// id = "subscriptionForm"
/// action = "https://example.com/subscribe"
/// method = "POST"
///
/// [[form.fields]]
/// name = "email"
/// kind = "email"
///
/// [[form.fields]]
/// name = "plan"
/// kind = "select"
/// value = "basic"
///
/// [handler]
/// status_policy = "replace"
/// timeout_seconds = 30
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct FormConfig {
    pub form: FormSection,
    #[serde(default)]
    pub handler: HandlerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormSection {
    pub id: Option<String>,
    pub action: String,
    pub method: Option<String>,
    #[serde(default = "default_fields")]
    pub fields: Vec<FieldConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    pub kind: Option<FieldKind>,
    #[serde(default)]
    pub value: String,
}

impl FieldConfig {
    /// Declared kind, else inferred from the name: `email` and `plan` keep
    /// their input types, everything else is text.
    pub fn kind(&self) -> FieldKind {
        self.kind.unwrap_or(match self.name.as_str() {
            EMAIL_FIELD => FieldKind::Email,
            PLAN_FIELD => FieldKind::Select,
            _ => FieldKind::Text,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HandlerConfig {
    #[serde(default)]
    pub status_policy: StatusPolicy,
    pub timeout_seconds: Option<u64>,
}

/// The two inputs a subscription form always carries.
fn default_fields() -> Vec<FieldConfig> {
    vec![
        FieldConfig {
            name: EMAIL_FIELD.to_string(),
            kind: Some(FieldKind::Email),
            value: String::new(),
        },
        FieldConfig {
            name: PLAN_FIELD.to_string(),
            kind: Some(FieldKind::Select),
            value: String::new(),
        },
    ]
}

impl FormConfig {
    /// A config with the default email/plan fields posting to `action`.
    pub fn for_action(action: impl Into<String>) -> Self {
        Self {
            form: FormSection {
                id: None,
                action: action.into(),
                method: None,
                fields: default_fields(),
            },
            handler: HandlerConfig::default(),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SubmitError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| SubmitError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_PATTERN
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// Sets the value of the first field with this name, adding the field when
    /// the form lacks it.
    pub fn set_field(&mut self, name: &str, value: &str) {
        match self.form.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => field.value = value.to_string(),
            None => self.add_field(name, value),
        }
    }

    /// Appends a field; an existing field with the same name is kept.
    pub fn add_field(&mut self, name: &str, value: &str) {
        self.form.fields.push(FieldConfig {
            name: name.to_string(),
            kind: None,
            value: value.to_string(),
        });
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.handler.timeout_seconds.map(Duration::from_secs)
    }

    pub fn to_form(&self) -> Form {
        let mut form = Form::new(self.form.action.clone())
            .with_id(self.form.id.as_deref().unwrap_or(DEFAULT_FORM_ID));
        if let Some(method) = &self.form.method {
            form = form.with_method(method.clone());
        }
        for field in &self.form.fields {
            form.add_field(FormField::new(field.name.clone(), field.kind(), field.value.clone()));
        }
        form
    }
}

impl Validate for FormConfig {
    fn validate(&self) -> Result<()> {
        use crate::utils::validation::*;

        validate_url("form.action", &self.form.action)?;

        if let Some(method) = &self.form.method {
            validate_http_method("form.method", method)?;
        }

        for field in &self.form.fields {
            validate_non_empty_string("form.fields.name", &field.name)?;
            if field.name == EMAIL_FIELD && field.kind() != FieldKind::Email {
                return Err(SubmitError::InvalidConfigValueError {
                    field: "form.fields.kind".to_string(),
                    value: format!("{:?}", field.kind()).to_lowercase(),
                    reason: "the email field must have kind \"email\"".to_string(),
                });
            }
        }

        if let Some(timeout) = self.handler.timeout_seconds {
            validate_range("handler.timeout_seconds", timeout, 1, 3600)?;
        }

        Ok(())
    }
}
