pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{http::HttpTransport, reporter::TracingReporter};
pub use config::toml_config::FormConfig;
pub use crate::core::handler::{StatusPolicy, SubscriptionFormHandler};
pub use domain::model::{
    Form, FormField, FieldKind, StatusColor, StatusNode, SubmissionRecord, SubmissionResult,
    SubmitEvent, SubmitOutcome,
};
pub use utils::error::{Result, SubmitError};
