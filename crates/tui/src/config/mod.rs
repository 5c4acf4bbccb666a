use clap::Parser;
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/tui.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the expense service.
    pub base_url: String,
    /// Per-request budget in milliseconds; no retries happen within it.
    pub request_timeout_ms: u64,
    /// Log level for the stderr tracing output.
    pub log: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout_ms: 5000,
            log: "error".to_string(),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "spese_tui", disable_version_flag = true)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override base URL (e.g. http://localhost:8000).
    #[arg(long)]
    base_url: Option<String>,
    /// Override the per-request timeout in milliseconds.
    #[arg(long)]
    request_timeout_ms: Option<u64>,
    /// Override the log level (error, warn, info, debug, trace).
    #[arg(long)]
    log: Option<String>,
}

pub fn load() -> Result<AppConfig> {
    let args = Args::parse();

    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("SPESE_TUI"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(request_timeout_ms) = args.request_timeout_ms {
        settings.request_timeout_ms = request_timeout_ms;
    }
    if let Some(log) = args.log {
        settings.log = log;
    }

    Ok(settings)
}
