use std::sync::Arc;

use anyhow::Context;
use bar_ingestor::{
    Credentials, Pipeline,
    cli::{
        commands::{Cli, Commands},
        params::{apply_overrides, fetch_request, load_config},
        summary::SeriesSummary,
    },
    io::CsvCache,
    pipeline::SeriesSource,
    providers::alpaca_rest::AlpacaProvider,
};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries only the artifact path and summaries.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Fetch { target, overrides } => {
            let config = apply_overrides(config, &target, &overrides)?;
            let request = fetch_request(&target)?;

            if let Some(path) = shared_utils::env::load_dotenv() {
                info!(path = %path.display(), "loaded .env");
            }
            let credentials =
                Credentials::from_env().context("provider credentials are not configured")?;
            let provider = AlpacaProvider::with_credentials(credentials)?;

            let session = config.session;
            let pipeline = Pipeline::new(Arc::new(provider), config)?;
            let outcome = pipeline.run(&request).await?;

            if let Some(path) = outcome.artifact.path() {
                println!("{}", path.display());
            }
            if outcome.source == SeriesSource::Provider {
                eprintln!("{}", outcome.report);
            }
            eprintln!("{}", SeriesSummary::new(&outcome.series, &session));
        }

        Commands::Show { target } => {
            let cache_dir = target
                .output_dir
                .clone()
                .unwrap_or_else(|| config.output_dir.clone());
            let request = fetch_request(&target)?;
            let cache = CsvCache::new(cache_dir);
            let key = request.cache_key();

            let series = cache.load(&key).await?.with_context(|| {
                format!("no cached artifact at {}", cache.path_for(&key).display())
            })?;
            println!("{}", SeriesSummary::new(&series, &config.session));
        }
    }

    Ok(())
}
