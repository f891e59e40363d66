//! Process-wide settings for the ingestion pipeline.
//!
//! [`PipelineConfig`] is built once at start-up (defaults, then an optional
//! TOML file, then CLI overrides) and handed to [`Pipeline::new`]. Nothing in
//! the pipeline reads ambient state after that.
//!
//! ```toml
//! [pipeline]
//! chunk_size_days = 2
//! fallback_to_daily = true
//!
//! [pipeline.execution]
//! mode = "parallel"
//! max_workers = 6
//! ```
//!
//! [`Pipeline::new`]: crate::pipeline::Pipeline::new

use std::{path::Path, path::PathBuf, time::Duration};

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use shared_utils::env::{MissingEnvVarError, get_env_var};

use crate::{
    errors::{Error, Result},
    models::Adjustment,
    pipeline::{BoundaryPolicy, SessionWindow},
    providers::alpaca_rest::{Feed, params::MAX_PAGE_SIZE},
};

pub const API_KEY_VAR: &str = "API_KEY";
pub const API_SECRET_VAR: &str = "API_SECRET";
pub const BASE_URL_VAR: &str = "BASE_URL";

/// How chunks are dispatched to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ExecutionMode {
    /// One chunk at a time, in plan order, pausing between requests.
    Sequential {
        #[serde(default = "default_request_delay_ms")]
        request_delay_ms: u64,
    },
    /// Up to `max_workers` chunk requests in flight, no pause.
    Parallel {
        #[serde(default = "default_max_workers")]
        max_workers: usize,
    },
}

fn default_request_delay_ms() -> u64 {
    300
}

fn default_max_workers() -> usize {
    4
}

impl Default for ExecutionMode {
    fn default() -> Self {
        ExecutionMode::Sequential {
            request_delay_ms: default_request_delay_ms(),
        }
    }
}

impl ExecutionMode {
    pub fn parallel(max_workers: usize) -> Self {
        ExecutionMode::Parallel { max_workers }
    }

    pub fn sequential(request_delay: Duration) -> Self {
        ExecutionMode::Sequential {
            request_delay_ms: u64::try_from(request_delay.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Chunk width: each chunk spans `end - start <= chunk_size_days`.
    pub chunk_size_days: u32,
    pub boundary: BoundaryPolicy,
    /// Keep only in-session bars for intraday resolutions.
    pub session_filter: bool,
    pub session: SessionWindow,
    /// Retry at daily resolution when a minute run comes back empty.
    pub fallback_to_daily: bool,
    pub execution: ExecutionMode,
    pub adjustment: Adjustment,
    /// Row cap for a single chunk request.
    pub row_limit: u32,
    /// Alpaca data feed; the account default when unset.
    pub feed: Option<Feed>,
    pub output_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size_days: 1,
            boundary: BoundaryPolicy::Inclusive,
            session_filter: true,
            session: SessionWindow::default(),
            fallback_to_daily: false,
            execution: ExecutionMode::default(),
            adjustment: Adjustment::All,
            row_limit: MAX_PAGE_SIZE,
            feed: None,
            output_dir: PathBuf::from("data/stored_data"),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    pipeline: PipelineConfig,
}

impl PipelineConfig {
    /// Parses a config document with a `[pipeline]` table. Missing keys keep
    /// their defaults.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(input).map_err(|e| Error::Config(format!("invalid config: {e}")))?;
        file.pipeline.validate()?;
        Ok(file.pipeline)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Rejects settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if let ExecutionMode::Parallel { max_workers: 0 } = self.execution {
            return Err(Error::Config("max_workers must be at least 1".to_string()));
        }
        if self.row_limit == 0 {
            return Err(Error::Config("row_limit must be at least 1".to_string()));
        }
        if self.session.open > self.session.close {
            return Err(Error::Config(format!(
                "session opens at {} but closes at {}",
                self.session.open, self.session.close
            )));
        }
        Ok(())
    }
}

/// Provider credentials, read once from the environment.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: SecretString,
    pub api_secret: SecretString,
    /// Market data host, e.g. `https://data.alpaca.markets`.
    pub base_url: String,
}

impl Credentials {
    /// Reads `API_KEY`, `API_SECRET` and `BASE_URL`. Fails on the first one
    /// that is missing or blank.
    pub fn from_env() -> std::result::Result<Self, MissingEnvVarError> {
        Ok(Self {
            api_key: SecretString::from(get_env_var(API_KEY_VAR)?),
            api_secret: SecretString::from(get_env_var(API_SECRET_VAR)?),
            base_url: get_env_var(BASE_URL_VAR)?,
        })
    }
}
