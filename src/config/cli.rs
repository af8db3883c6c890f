use super::toml_config::FormConfig;
use super::CliConfig;
use crate::core::handler::StatusPolicy;
use crate::domain::model::{EMAIL_FIELD, PLAN_FIELD};
use crate::utils::error::{Result, SubmitError};
use crate::utils::validation::Validate;

/// Parses a `NAME=VALUE` pair for `--field`.
pub fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    if name.is_empty() {
        return Err(format!("field name missing in '{}'", s));
    }
    Ok((name.to_string(), value.to_string()))
}

impl CliConfig {
    /// Loads the config file (if any) and layers the command-line flags on top.
    pub fn resolve(&self) -> Result<FormConfig> {
        let mut config = match (&self.config, &self.action) {
            (Some(path), _) => {
                tracing::debug!("Loading form definition from {}", path.display());
                FormConfig::from_file(path)?
            }
            (None, Some(action)) => FormConfig::for_action(action.clone()),
            (None, None) => {
                return Err(SubmitError::ConfigValidationError {
                    field: "action".to_string(),
                    message: "either --config or --action is required".to_string(),
                })
            }
        };

        if let Some(action) = &self.action {
            config.form.action = action.clone();
        }
        if let Some(method) = &self.method {
            config.form.method = Some(method.clone());
        }
        if let Some(email) = &self.email {
            config.set_field(EMAIL_FIELD, email);
        }
        if let Some(plan) = &self.plan {
            config.set_field(PLAN_FIELD, plan);
        }
        for (name, value) in &self.fields {
            config.add_field(name, value);
        }
        if self.replace_status {
            config.handler.status_policy = StatusPolicy::Replace;
        }
        if self.timeout.is_some() {
            config.handler.timeout_seconds = self.timeout;
        }

        config.validate()?;
        Ok(config)
    }
}
