use std::path::Path;

use chrono::NaiveDate;

use crate::{
    cli::commands::{FetchOverrides, TargetArgs},
    config::{ExecutionMode, PipelineConfig},
    errors::Result,
    pipeline::{BoundaryPolicy, FetchRequest},
};

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(input: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{input}' (expected YYYY-MM-DD): {e}"))
}

/// Loads the config file, if any, or the defaults.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::from_toml_file(path),
        None => Ok(PipelineConfig::default()),
    }
}

/// Applies command-line flags on top of a loaded config.
pub fn apply_overrides(
    mut config: PipelineConfig,
    target: &TargetArgs,
    overrides: &FetchOverrides,
) -> Result<PipelineConfig> {
    if let Some(dir) = &target.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(chunk_size) = overrides.chunk_size {
        config.chunk_size_days = chunk_size;
    }
    if overrides.no_session_filter {
        config.session_filter = false;
    }
    if overrides.fallback_daily {
        config.fallback_to_daily = true;
    }
    if overrides.exclusive_boundary {
        config.boundary = BoundaryPolicy::Exclusive;
    }

    if overrides.parallel {
        let configured = match config.execution {
            ExecutionMode::Parallel { max_workers } => max_workers,
            ExecutionMode::Sequential { .. } => 4,
        };
        config.execution =
            ExecutionMode::parallel(overrides.max_workers.unwrap_or(configured));
    } else if let Some(request_delay_ms) = overrides.delay_ms {
        config.execution = ExecutionMode::Sequential { request_delay_ms };
    }

    config.validate()?;
    Ok(config)
}

pub fn fetch_request(target: &TargetArgs) -> Result<FetchRequest> {
    FetchRequest::new(&target.symbol, target.start, target.end, target.resolution)
}
