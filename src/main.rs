//! Elmafdein Library main entry point
//!
//! This is the command-line interface for the library search service.

use anyhow::Context;
use clap::Parser;
use elmafdein_library::config::{apply_env_overrides, load_config_with_hash, validate, Config};
use elmafdein_library::server::{serve, AppState, LibraryParams, LibraryResponse};
use elmafdein_library::Coordinator;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Elmafdein Library: Orthodox book metadata search
///
/// Scrapes public Orthodox book libraries with a headless browser and
/// serves merged, de-duplicated book records over an HTTP API. PDFs are
/// linked, never downloaded.
#[derive(Parser, Debug)]
#[command(name = "elmafdein-library")]
#[command(version = "1.0.0")]
#[command(about = "Orthodox book metadata search service", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the effective settings without serving
    #[arg(long, conflicts_with = "search")]
    dry_run: bool,

    /// Run one search, print the JSON response and exit
    #[arg(long, value_name = "QUERY")]
    search: Option<String>,

    /// Site scope for --search (all, coptic, christianlib)
    #[arg(long, requires = "search")]
    site: Option<String>,

    /// Listing pages per site for --search (1-5)
    #[arg(long, requires = "search")]
    max_pages: Option<u32>,

    /// Pages the secondary hop may visit for --search (0-10)
    #[arg(long, requires = "search")]
    max_follow: Option<u32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let coordinator = Coordinator::new(config).context("Failed to set up the scraper")?;

    if let Some(query) = cli.search.as_deref() {
        return handle_search(&cli, coordinator, query).await;
    }

    let state = AppState::new(coordinator);
    let (host, port) = {
        let server = &state.coordinator.config().server;
        (server.host.clone(), server.port)
    };
    serve(state, &host, port)
        .await
        .context("HTTP server failed")?;

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// `RUST_LOG` takes precedence when set.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else if let Ok(filter) = EnvFilter::try_from_default_env() {
        filter
    } else {
        match verbose {
            0 => EnvFilter::new("elmafdein_library=info,warn"),
            1 => EnvFilter::new("elmafdein_library=debug,info"),
            2 => EnvFilter::new("elmafdein_library=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file (or defaults) and applies environment overrides
fn load(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            let config = Config::default();
            validate(&config)?;
            config
        }
    };

    apply_env_overrides(&mut config).context("Invalid environment override")?;
    Ok(config)
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Elmafdein Library Dry Run ===\n");

    println!("Server:");
    println!("  Listen: {}:{}", config.server.host, config.server.port);
    println!("  Service name: {}", config.server.service_name);
    println!("  Report capacity: {}", config.server.report_capacity);

    println!("\nScraper:");
    println!(
        "  Navigation timeout: {}s ({} attempts, {}ms base backoff)",
        config.scraper.navigation_timeout_secs,
        config.scraper.retry_attempts,
        config.scraper.retry_base_delay_ms
    );
    println!(
        "  Politeness delay: {}-{}ms",
        config.scraper.delay_min_ms, config.scraper.delay_max_ms
    );
    println!("  Details pages per site: {}", config.scraper.detail_fetch_limit);
    println!(
        "  Secondary hop below: {} results",
        config.scraper.secondary_hop_threshold
    );
    println!("  Parallel sites: {}", config.scraper.parallel_sites);
    println!("  Respect robots.txt: {}", config.scraper.respect_robots);

    println!("\nBrowser:");
    println!("  Engine: {:?}", config.browser.engine);
    println!("  Headless: {}", config.browser.headless);
    if let Some(remote) = &config.browser.remote_url {
        println!("  Remote: {}", remote);
    }

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.user_agent());

    println!("\nCache:");
    println!(
        "  TTL: {}h (schema v{})",
        config.cache.ttl_hours, config.cache.schema_version
    );

    println!("\nRate Limit:");
    if config.rate_limit.max_requests == 0 {
        println!("  Disabled");
    } else {
        println!(
            "  {} requests per {}s",
            config.rate_limit.max_requests, config.rate_limit.window_secs
        );
    }

    println!("\nSites:");
    for (name, site) in [
        ("coptic", &config.sites.coptic),
        ("christianlib", &config.sites.christianlib),
    ] {
        let state = if site.enabled { "enabled" } else { "disabled" };
        println!("  - {} {} ({})", name, site.base_url, state);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --search mode: one search, JSON on stdout
async fn handle_search(cli: &Cli, coordinator: Coordinator, query: &str) -> anyhow::Result<()> {
    let params = LibraryParams {
        q: Some(query.to_string()),
        site: cli.site.clone(),
        max_pages: cli.max_pages.map(|n| n.to_string()),
        max_follow: cli.max_follow.map(|n| n.to_string()),
    };
    let request = params.to_request().map_err(anyhow::Error::msg)?;

    let started = Instant::now();
    let outcome = coordinator.search(&request).await?;
    let response = LibraryResponse::from_outcome(outcome, started.elapsed().as_millis() as u64);

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
