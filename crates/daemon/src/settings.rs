//! Daemon settings
//!
//! Precedence: built-in defaults, then an optional `reelcast.toml` in the
//! working directory, then `REELCAST_*` environment variables.

use anyhow::{bail, Context, Result};
use config::{Config, ConfigBuilder, Environment, File};
use reelcast_core::application::publish::constants::{DEFAULT_POLL_INTERVAL, DEFAULT_POLL_MAX_WAIT};
use reelcast_core::application::scheduler::constants::DEFAULT_TICK_INTERVAL;
use reelcast_core::application::PollSettings;
use reelcast_infra_graph::{GraphApiConfig, DEFAULT_API_VERSION, DEFAULT_BASE_URL, DEFAULT_HTTP_TIMEOUT};
use serde::Deserialize;
use std::time::Duration;

const CONFIG_BASENAME: &str = "reelcast";
const ENV_PREFIX: &str = "REELCAST";
const DEFAULT_DB_PATH: &str = "~/.reelcast/reelcast.db";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// SQLite URL or plain file path (`~` is expanded)
    pub database_url: String,
    /// Public address media files are served from
    pub public_base_url: String,
    pub graph_base_url: String,
    pub graph_api_version: String,
    pub tick_interval_secs: u64,
    pub poll_interval_secs: u64,
    pub poll_max_wait_secs: u64,
    pub http_timeout_secs: u64,
}

impl Settings {
    /// Load from defaults, `reelcast.toml` and the environment
    pub fn load() -> Result<Self> {
        let builder = with_defaults(Config::builder())?
            .add_source(File::with_name(CONFIG_BASENAME).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        Self::from_config(builder.build().context("Failed to read configuration")?)
    }

    fn from_config(config: Config) -> Result<Self> {
        let settings: Settings = config
            .try_deserialize()
            .context("Invalid configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("tick_interval_secs", self.tick_interval_secs),
            ("poll_interval_secs", self.poll_interval_secs),
            ("poll_max_wait_secs", self.poll_max_wait_secs),
            ("http_timeout_secs", self.http_timeout_secs),
        ] {
            if value == 0 {
                bail!("{} must be greater than zero", key);
            }
        }
        if self.http_timeout_secs >= self.poll_max_wait_secs {
            bail!(
                "http_timeout_secs ({}) must be shorter than poll_max_wait_secs ({})",
                self.http_timeout_secs,
                self.poll_max_wait_secs
            );
        }
        if self.public_base_url.trim().is_empty() {
            bail!("public_base_url must be set (REELCAST_PUBLIC_BASE_URL)");
        }
        Ok(())
    }

    /// sqlx connection URL
    pub fn database_url(&self) -> String {
        if self.database_url.starts_with("sqlite:") {
            return self.database_url.clone();
        }
        format!("sqlite://{}", shellexpand::tilde(&self.database_url))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            interval: Duration::from_secs(self.poll_interval_secs),
            max_wait: Duration::from_secs(self.poll_max_wait_secs),
        }
    }

    pub fn graph_api(&self) -> GraphApiConfig {
        GraphApiConfig {
            base_url: self.graph_base_url.clone(),
            api_version: self.graph_api_version.clone(),
            timeout: Duration::from_secs(self.http_timeout_secs),
        }
    }
}

fn with_defaults<St: config::builder::BuilderState>(
    builder: ConfigBuilder<St>,
) -> Result<ConfigBuilder<St>> {
    Ok(builder
        .set_default("database_url", DEFAULT_DB_PATH)?
        .set_default("public_base_url", "")?
        .set_default("graph_base_url", DEFAULT_BASE_URL)?
        .set_default("graph_api_version", DEFAULT_API_VERSION)?
        .set_default("tick_interval_secs", DEFAULT_TICK_INTERVAL.as_secs())?
        .set_default("poll_interval_secs", DEFAULT_POLL_INTERVAL.as_secs())?
        .set_default("poll_max_wait_secs", DEFAULT_POLL_MAX_WAIT.as_secs())?
        .set_default("http_timeout_secs", DEFAULT_HTTP_TIMEOUT.as_secs())?)
}
