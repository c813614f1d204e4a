use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use notefeed::config::Config;
use notefeed::pipeline;

#[derive(Parser, Debug)]
#[command(
    name = "notefeed",
    about = "Snapshot an RSS feed to JSON with one image per item"
)]
struct Args {
    /// TOML config file (defaults apply when omitted)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the snapshot here instead of assets/note_feed.json
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Feed to fetch instead of the configured one
    #[arg(long, value_name = "URL")]
    feed_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Silent unless RUST_LOG is set
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(output) = args.output {
        config.output_path = output;
    }
    if let Some(feed_url) = args.feed_url {
        config.feed_url = feed_url;
    }

    let summary = pipeline::run(&config).await?;
    tracing::info!(items = summary.snapshot.items.len(), "Snapshot complete");

    println!("{}", summary.confirmation());
    Ok(())
}
