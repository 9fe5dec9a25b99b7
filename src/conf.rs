use std::path::PathBuf;
use std::time::Duration;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

const CONFIG_FILE: &str = "job_market";
const ENV_PREFIX: &str = "JOB_MARKET";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Dataset CSV read by `report`/`list` and written by `scrape`.
    pub data_path: PathBuf,
    pub base_url: String,
    /// Listing location filter, as the job board expects it.
    pub location: String,
    pub max_pages: u32,
    pub max_jobs: usize,
    pub request_delay_ms: u64,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_ms: u64,
    pub user_agent: String,
    pub top_n: usize,
}

impl Settings {
    /// Defaults, then `job_market.toml` if present, then `JOB_MARKET_*` variables.
    pub fn load() -> Result<Self, ConfigError> {
        defaults()?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()
    }

    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("data_path", "data/job_market.csv")?
        .set_default("base_url", "https://aijobs.ai")?
        .set_default("location", "United%20States")?
        .set_default("max_pages", 3_i64)?
        .set_default("max_jobs", 50_i64)?
        .set_default("request_delay_ms", 2000_i64)?
        .set_default("timeout_secs", 10_i64)?
        .set_default("max_retries", 3_i64)?
        .set_default("backoff_ms", 2000_i64)?
        .set_default(
            "user_agent",
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36",
        )?
        .set_default("top_n", 15_i64)
}
