//! # rivalscan CLI
//!
//! Command-line entry point for competitor analysis runs. Loads the JSON run
//! configuration, resolves the completion-service credentials from the
//! environment, and analyzes every configured competitor into a timestamped
//! run directory.
//!
//! Required environment variables (a `.env` file is honored):
//!
//! - `RIVALSCAN_API_URL`: base URL of the OpenAI-compatible completion service
//! - `RIVALSCAN_API_KEY`: bearer token for that service

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter};

use rivalscan::completion::Client;
use rivalscan::config::AppConfig;
use rivalscan::pipeline::{
    CommandRenderer, CompetitorAnalyzer, NullRenderer, WordcloudRenderer,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Automated competitive intelligence gathering", long_about = None)]
struct Cli {
    /// Path to the run configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Analyze only the competitor with this name
    #[arg(short = 'n', long)]
    competitor: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(console_layer)
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;

    dotenvy::dotenv().ok();
    let api_url = std::env::var("RIVALSCAN_API_URL")
        .map_err(|_| anyhow!("missing environment variable: RIVALSCAN_API_URL"))?;
    let api_key = std::env::var("RIVALSCAN_API_KEY")
        .map_err(|_| anyhow!("missing environment variable: RIVALSCAN_API_KEY"))?;

    let client = Client::new(api_url, api_key, config.application.model.clone());

    let renderer: Arc<dyn WordcloudRenderer> = match &config.application.wordcloud_command {
        Some(program) => Arc::new(CommandRenderer::new(program.clone())),
        None => Arc::new(NullRenderer),
    };

    let analyzer = CompetitorAnalyzer::new(
        Arc::new(client),
        renderer,
        &config.product.name,
        &config.product.description,
    );

    let competitors: Vec<_> = config
        .competitors
        .iter()
        .filter(|competitor| {
            cli.competitor
                .as_deref()
                .is_none_or(|name| competitor.name == name)
        })
        .collect();
    if competitors.is_empty() {
        return Err(anyhow!("no competitor matches the requested name"));
    }

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let run_folder = config
        .application
        .root_folder
        .join(format!("competitor_analysis_{}", timestamp));
    std::fs::create_dir_all(&run_folder)
        .with_context(|| format!("failed to create run directory {}", run_folder.display()))?;
    info!(path = %run_folder.display(), "run directory created");

    let progress = ProgressBar::new(competitors.len() as u64).with_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
            .expect("progress template is valid"),
    );

    for competitor in competitors {
        progress.set_message(competitor.name.clone());

        let base_folder = run_folder.join(&competitor.name);
        std::fs::create_dir_all(&base_folder)?;

        let artifacts = analyzer
            .analyze(
                &base_folder,
                &competitor.name,
                &competitor.allowed_domains,
                &competitor.start_urls,
                &config.application.languages,
                config.application.max_pages,
            )
            .await
            .with_context(|| format!("analysis of '{}' failed", competitor.name))?;

        progress.inc(1);
        println!("{}:", competitor.name);
        println!("  report:    {}", artifacts.report.display());
        println!("  wordcloud: {}", artifacts.wordcloud.display());
        println!("  summaries: {}", artifacts.summaries.display());
        println!("  crawl:     {}", artifacts.crawl.display());
    }

    progress.finish_with_message("all competitors analyzed");
    Ok(())
}
