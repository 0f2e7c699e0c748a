use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::sync::mpsc;

use feedview::app::{App, AppEvent};
use feedview::config::Config;
use feedview::feed::Fetcher;
use feedview::loader::{FeedLoader, LoadOutcome};
use feedview::registry::FeedRegistry;
use feedview::render::RenderSink;
use feedview::ui;

#[derive(Parser, Debug)]
#[command(name = "feedview", about = "Terminal reader for a fixed list of RSS/Atom feeds")]
struct Args {
    /// Config file (default: ~/.config/feedview/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Feed to load on startup (0-based, overrides `initial_feed`)
    #[arg(long, value_name = "INDEX")]
    feed: Option<usize>,

    /// Print the feed list and exit
    #[arg(long)]
    list: bool,

    /// Load the initial feed, print its entries and exit
    #[arg(long, conflicts_with = "list")]
    dump: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

fn init_tracing(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file '{}'", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn print_registry(registry: &FeedRegistry) {
    for (index, feed) in registry.iter().enumerate() {
        println!("{:>2}  {:<24}  {}", index, feed.name(), feed.url());
    }
}

/// Headless mode: run one load to completion and print what was committed.
async fn dump(loader: &FeedLoader, index: usize) -> Result<()> {
    let outcome = loader.load(index)?.await;
    match outcome {
        LoadOutcome::Rendered { .. } => {
            let view = loader.view().snapshot();
            for entry in view.entries.iter() {
                let date = entry
                    .published
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "----------".to_string());
                println!("{}  {}", date, entry.title);
                println!("            {}", entry.link);
            }
            Ok(())
        }
        LoadOutcome::Failed { feed, error } => {
            let name = loader
                .registry()
                .get(feed)
                .map(|f| f.name().to_string())
                .unwrap_or_default();
            Err(anyhow::Error::new(error).context(format!("Failed to load feed '{}'", name)))
        }
        LoadOutcome::Superseded { .. } => {
            anyhow::bail!("Load was superseded before it could render")
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file.as_ref())?;

    let config = match args.config.clone().or_else(Config::default_path) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load config from '{}'", path.display()))?,
        None => {
            tracing::warn!("HOME not set, using default configuration");
            Config::default()
        }
    };

    let registry = config.registry().context("Invalid feed list")?;

    if args.list {
        print_registry(&registry);
        return Ok(());
    }

    let initial = args.feed.unwrap_or(config.initial_feed);
    anyhow::ensure!(
        initial < registry.len(),
        "Initial feed {} out of range (registry has {} feeds)",
        initial,
        registry.len()
    );

    let timeout = config.request_timeout()?;
    let fetcher =
        Fetcher::new(timeout, config.max_feed_bytes).context("Failed to build HTTP client")?;
    let loader = FeedLoader::new(registry, fetcher, RenderSink::new());

    if args.dump {
        return dump(&loader, initial).await;
    }

    let mut app = App::new(loader);
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);
    app.start_load(initial, &event_tx);

    ui::run(&mut app, event_tx, event_rx).await?;

    println!("Goodbye!");
    Ok(())
}
