use crate::domain::ports::ValidityReporter;

/// Shows validation messages as warnings in the log and, optionally, on stderr.
#[derive(Debug, Clone, Default)]
pub struct TracingReporter {
    echo_to_stderr: bool,
}

impl TracingReporter {
    pub fn new(echo_to_stderr: bool) -> Self {
        Self { echo_to_stderr }
    }
}

impl ValidityReporter for TracingReporter {
    fn report_validity(&self, form_id: &str, field: &str, message: &str) {
        tracing::warn!("⚠️ {}#{}: {}", form_id, field, message);
        if self.echo_to_stderr {
            eprintln!("⚠️ {}: {}", field, message);
        }
    }
}
