use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use rssdiff::{compare_items, diff_feeds, parse_bytes, Config, Feed, FeedReader};

/// Get the default config file path (~/.config/rssdiff/config.toml)
fn default_config_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("rssdiff")
        .join("config.toml"))
}

#[derive(Parser, Debug)]
#[command(name = "rssdiff", about = "Parse RSS 2.0 feeds and report missing items")]
struct Args {
    /// Config file (defaults to ~/.config/rssdiff/config.toml)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a feed and print it as JSON
    Parse {
        /// http(s) URL or local file path
        source: String,
    },
    /// Print the items of the smaller feed that the larger one lacks
    Compare {
        /// First feed (http(s) URL or local file path)
        a: String,
        /// Second feed (http(s) URL or local file path)
        b: String,

        /// Report added and removed items regardless of item counts
        #[arg(long)]
        by_identity: bool,
    },
}

/// Loads a feed from a URL or a file on disk.
async fn load_feed(reader: &FeedReader, source: &str) -> Result<Feed> {
    if source.starts_with("http://") || source.starts_with("https://") {
        let fetched = reader
            .parse_url(source)
            .await
            .with_context(|| format!("Failed to read feed from {source}"))?;
        return Ok(fetched.feed);
    }

    let bytes = tokio::fs::read(Path::new(source))
        .await
        .with_context(|| format!("Failed to read feed file: {source}"))?;
    parse_bytes(&bytes, None).with_context(|| format!("Failed to parse feed file: {source}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => default_config_path()?,
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config: {}", config_path.display()))?;
    let reader = FeedReader::new(&config.fetch).context("Failed to build HTTP client")?;

    let output = match args.command {
        Command::Parse { source } => {
            let feed = load_feed(&reader, &source).await?;
            serde_json::to_string_pretty(&feed)?
        }
        Command::Compare { a, b, by_identity } => {
            let (feed_a, feed_b) = tokio::try_join!(load_feed(&reader, &a), load_feed(&reader, &b))?;
            if by_identity {
                serde_json::to_string_pretty(&diff_feeds(&feed_a, &feed_b))?
            } else {
                serde_json::to_string_pretty(&compare_items(&feed_a, &feed_b))?
            }
        }
    };

    println!("{output}");
    Ok(())
}
