//! Chunked historical bar acquisition with a CSV artifact cache.
//!
//! The entry point is [`Pipeline`]: give it a [`DataProvider`] and a
//! [`PipelineConfig`], then [`Pipeline::run`] a [`FetchRequest`].

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod errors;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod providers;

pub use config::{Credentials, ExecutionMode, PipelineConfig};
pub use errors::{Error, Result};
pub use pipeline::{Artifact, FetchReport, FetchRequest, Pipeline, PipelineOutcome, SeriesSource};
pub use providers::DataProvider;
