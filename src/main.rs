use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use storefeed::config::Config;
use storefeed::provider::{CatalogProvider, HttpProvider, ItemProvider};
use storefeed::util::{fit_column, validate_base_url};
use storefeed::{ControllerEvent, ControllerOptions, ListController, RenderSnapshot};

#[derive(Parser, Debug)]
#[command(name = "storefeed", about = "Drive the storefront discovery feed from the terminal")]
struct Args {
    /// Config file (defaults to ~/.config/storefeed/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// JSON catalog to serve instead of the configured provider
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// Number of additional pages to load after the first
    #[arg(long, default_value_t = 1)]
    pages: u32,

    /// Pull-to-refresh after paging
    #[arg(long)]
    refresh: bool,

    /// Run a search after browsing, then cancel it
    #[arg(long, value_name = "QUERY")]
    search: Option<String>,

    /// Delay every catalog response by this many milliseconds
    #[arg(long, value_name = "MS")]
    latency_ms: Option<u64>,

    /// Output width in columns
    #[arg(long, default_value_t = 72)]
    width: usize,
}

fn build_provider(config: &Config, args: &Args) -> Result<Arc<dyn ItemProvider>> {
    let with_latency = |catalog: CatalogProvider| match args.latency_ms {
        Some(ms) => catalog.with_latency(Duration::from_millis(ms)),
        None => catalog,
    };

    if let Some(path) = args.catalog.as_ref().or(config.catalog_path.as_ref()) {
        let catalog = CatalogProvider::from_json_file(path)
            .with_context(|| format!("Failed to load catalog '{}'", path.display()))?;
        return Ok(Arc::new(with_latency(catalog)));
    }

    if let Some(raw_url) = &config.provider_url {
        let base_url = validate_base_url(raw_url)
            .with_context(|| format!("Invalid provider_url '{}'", raw_url))?;
        let client = reqwest::Client::builder()
            .user_agent(concat!("storefeed/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        let provider = HttpProvider::new(client, base_url)
            .with_timeout(Duration::from_secs(config.request_timeout_secs))
            .with_max_response_bytes(config.max_response_bytes);
        return Ok(Arc::new(provider));
    }

    tracing::debug!("No provider configured, using demo catalog");
    Ok(Arc::new(with_latency(CatalogProvider::demo())))
}

/// Apply events until neither the feed nor the search has a fetch in flight.
async fn settle(
    controller: &mut ListController,
    events: &mut mpsc::Receiver<ControllerEvent>,
) -> Result<()> {
    while !controller.is_settled() {
        let event = events
            .recv()
            .await
            .context("Event channel closed while a fetch was outstanding")?;
        controller.handle_event(event);
    }
    Ok(())
}

fn print_snapshot(label: &str, snap: &RenderSnapshot, width: usize) {
    let mut flags = Vec::new();
    if snap.is_loading {
        flags.push("loading");
    }
    if snap.is_loading_more {
        flags.push("loading-more");
    }
    if snap.is_error {
        flags.push("error");
    }
    if snap.is_empty {
        flags.push("empty");
    }
    if snap.exhausted {
        flags.push("end");
    }

    println!(
        "== {} [{:?}{}] {} item(s) {}",
        label,
        snap.mode,
        if snap.query.is_empty() {
            String::new()
        } else {
            format!(" \"{}\"", snap.query)
        },
        snap.items.len(),
        flags.join(",")
    );

    let title_width = width.saturating_sub(2) * 3 / 5;
    let location_width = width.saturating_sub(title_width + 2);
    for item in snap.items.iter() {
        println!(
            "  {}{}",
            fit_column(&item.title, title_width),
            fit_column(&item.location, location_width)
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().or_else(Config::default_path);
    let (config, unknown_keys) = match &config_path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => (Config::default(), Vec::new()),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    for key in &unknown_keys {
        tracing::warn!(key = %key, "Unknown key in config file, ignoring");
    }
    if let Some(path) = &config_path {
        tracing::info!(
            path = %path.display(),
            page_size = config.page_size,
            provider = config.provider_url.as_deref().unwrap_or("catalog"),
            "Loaded configuration"
        );
    }

    let provider = build_provider(&config, &args)?;
    let options = ControllerOptions {
        page_size: config.page_size,
        max_query_length: config.max_query_length,
    };
    let (mut controller, mut events) = ListController::channel(provider, options);

    controller.load_initial();
    settle(&mut controller, &mut events).await?;
    print_snapshot("initial", &controller.snapshot(), args.width);

    for page in 0..args.pages {
        if !controller.load_more() {
            tracing::debug!(page, "No more pages to load");
            break;
        }
        settle(&mut controller, &mut events).await?;
        print_snapshot("more", &controller.snapshot(), args.width);
    }

    if args.refresh {
        controller.refresh();
        settle(&mut controller, &mut events).await?;
        print_snapshot("refresh", &controller.snapshot(), args.width);
    }

    if let Some(query) = &args.search {
        controller.search(query);
        settle(&mut controller, &mut events).await?;
        print_snapshot("search", &controller.snapshot(), args.width);

        controller.cancel_search();
        print_snapshot("feed", &controller.snapshot(), args.width);
    }

    Ok(())
}
