#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "subscribe-form")]
#[command(about = "Validate a subscription form and submit it to its action URL")]
pub struct CliConfig {
    #[arg(long, help = "TOML form definition")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Form action URL (overrides the config file)")]
    pub action: Option<String>,

    #[arg(long, help = "HTTP method, POST when unset")]
    pub method: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub plan: Option<String>,

    #[arg(long = "field", value_name = "NAME=VALUE", value_parser = cli::parse_key_val)]
    pub fields: Vec<(String, String)>,

    #[arg(long, help = "Replace the previous status node instead of appending")]
    pub replace_status: bool,

    #[arg(long, help = "Request timeout in seconds (none by default)")]
    pub timeout: Option<u64>,

    #[arg(long, help = "Print the submission record as JSON")]
    pub json: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}
