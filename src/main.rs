use chrono::Utc;
use clap::Parser;
use subscribe_form::utils::logger;
use subscribe_form::{
    CliConfig, HttpTransport, SubmissionRecord, SubmitError, SubmitEvent, SubmitOutcome,
    SubscriptionFormHandler, TracingReporter,
};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::debug!("CLI config: {:?}", cli);

    let exit_code = match run(&cli).await {
        Ok(outcome) if outcome.is_success() => 0,
        Ok(SubmitOutcome::Invalid(_)) => 2,
        Ok(SubmitOutcome::Completed(_)) => 3,
        Err(e) => {
            tracing::error!("❌ {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            if e.is_config_error() {
                1
            } else {
                3
            }
        }
    };

    std::process::exit(exit_code);
}

async fn run(cli: &CliConfig) -> Result<SubmitOutcome, SubmitError> {
    let config = cli.resolve()?;
    let transport = HttpTransport::with_timeout(config.timeout())?;
    let reporter = TracingReporter::new(!cli.json);

    let mut handler = SubscriptionFormHandler::attach(config.to_form(), transport, reporter)?
        .with_status_policy(config.handler.status_policy);

    let submitted_at = Utc::now();
    let outcome = handler.on_submit(&mut SubmitEvent::new()).await;
    let record = SubmissionRecord::new(handler.form(), &outcome, submitted_at);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else if let Some(status) = &record.status {
        println!("{}", status.text);
    }

    Ok(outcome)
}
