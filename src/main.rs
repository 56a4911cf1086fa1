//! Hotsearch - search keyword analytics
//!
//! Records search events and answers three questions about them: which
//! keywords are searched most, how search volume spreads over the hours of
//! the day, and which keywords are suddenly rising.

use clap::{Parser, Subcommand};
use hotsearch_core::{
    store, AnalyticsEngine, HotsearchConfig, HotsearchError, Hotspot, KeywordCount,
    RecordedSearch, Result, StoreBackend, TrendBucket,
};
use hotsearch_serve::ServerBuilder;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "hotsearch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Hotsearch - search keyword ranking, trends and hotspots")]
#[command(long_about = r#"
Hotsearch records search events and derives analytics from them:
- hot: the most searched keywords over the last days
- trend: search volume per hour of the day
- hotspots: keywords whose volume rose sharply in the last hour

Run `hotsearch serve` to expose the same queries over HTTP.
"#)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format (json, yaml, pretty)
    #[arg(
        short,
        long,
        default_value = "pretty",
        global = true,
        value_parser = ["pretty", "json", "yaml"]
    )]
    output: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Server host address (overrides configuration)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides configuration)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Record one search event
    Record {
        /// Searched keyword
        keyword: String,

        /// Client address
        #[arg(long, default_value = "127.0.0.1")]
        ip: String,

        /// Origin tag
        #[arg(long, default_value = "pc")]
        source: String,
    },

    /// Show the most searched keywords
    Hot,

    /// Show search volume per hour of day
    Trend {
        /// Hours to look back
        #[arg(long, default_value = "24")]
        hours: u32,
    },

    /// Show keywords rising sharply in the last hour
    Hotspots,

    /// Show the newest recorded searches
    Recent,

    /// Write a default configuration file
    Init {
        /// Configuration file to create
        #[arg(default_value = "hotsearch.yaml")]
        path: PathBuf,
    },

    /// Validate configuration file
    Validate {
        /// Configuration file to validate
        path: PathBuf,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = HotsearchConfig::load(cli.config.as_ref())?;

    let log_level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let log_format = if cli.output == "json" {
        "json"
    } else {
        config.logging.format.as_str()
    };
    hotsearch_core::init_logging_with_config(log_level, log_format)?;

    info!("Starting Hotsearch v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(Commands::Serve { ref host, port }) => {
            handle_serve(config, host.clone(), port).await?;
        }

        Some(Commands::Record {
            ref keyword,
            ref ip,
            ref source,
        }) => {
            handle_record(&config, keyword, ip, source, &cli).await?;
        }

        Some(Commands::Hot) => {
            let engine = build_engine(&config).await?;
            let top = engine.top_keywords_with_count().await?;
            render(&cli, top.as_slice(), print_keywords)?;
        }

        Some(Commands::Trend { hours }) => {
            handle_trend(&config, hours, &cli).await?;
        }

        Some(Commands::Hotspots) => {
            let engine = build_engine(&config).await?;
            let hotspots = engine.detect_hotspots().await?;
            render(&cli, hotspots.as_slice(), print_hotspots)?;
        }

        Some(Commands::Recent) => {
            let engine = build_engine(&config).await?;
            let recent = engine.recent_searches().await?;
            render(&cli, recent.as_slice(), print_recent)?;
        }

        Some(Commands::Init { ref path }) => {
            handle_init(path)?;
        }

        Some(Commands::Validate { ref path }) => {
            handle_validate(path, &cli)?;
        }

        Some(Commands::Version) => {
            println!("{}", hotsearch_core::version_info());
            println!("  Server: hotsearch-serve v{}", hotsearch_serve::VERSION);
        }

        None => {
            handle_default();
        }
    }

    Ok(())
}

async fn build_engine(config: &HotsearchConfig) -> Result<AnalyticsEngine> {
    config.validate()?;
    if let Some(notice) = ephemeral_store_notice(config) {
        warn!("{}", notice);
        eprintln!("warning: {}", notice);
    }
    let source = store::connect(&config.store).await?;
    Ok(AnalyticsEngine::new(source, config.analytics.clone()))
}

/// Warning for one-shot commands that would run against a store which does
/// not outlive the process
fn ephemeral_store_notice(config: &HotsearchConfig) -> Option<&'static str> {
    match config.store.backend {
        StoreBackend::Memory => Some(
            "the memory store starts empty and is discarded on exit; \
             set store.backend to postgres to keep searches between runs",
        ),
        StoreBackend::Postgres => None,
    }
}

async fn handle_serve(
    config: HotsearchConfig,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    config.validate()?;
    if let Some(notice) = ephemeral_store_notice(&config) {
        warn!("{}", notice);
    }

    let mut builder = ServerBuilder::from_config(config);
    if let Some(host) = host {
        builder = builder.host(host);
    }
    if let Some(port) = port {
        builder = builder.port(port);
    }

    let server = builder.build().await?;
    server.start().await
}

async fn handle_record(
    config: &HotsearchConfig,
    keyword: &str,
    ip: &str,
    source: &str,
    cli: &Cli,
) -> Result<()> {
    let engine = build_engine(config).await?;
    let record = engine.record_search(keyword, ip, source).await?;
    render(cli, &record, |record| {
        println!(
            "Recorded '{}' from {} ({}) as #{}",
            record.event.keyword, record.event.ip, record.event.source, record.id
        );
    })
}

async fn handle_trend(config: &HotsearchConfig, hours: u32, cli: &Cli) -> Result<()> {
    let engine = build_engine(config).await?;
    let buckets = engine.search_trend(hours).await?;
    render(cli, buckets.as_slice(), print_trend)
}

fn handle_init(path: &Path) -> Result<()> {
    info!("Initializing configuration at {:?}", path);

    if path.exists() {
        return Err(HotsearchError::validation(format!(
            "Configuration file already exists: {:?}. Remove it first or use a different path.",
            path
        )));
    }

    HotsearchConfig::default().to_file(path)?;

    println!("Configuration initialized at {:?}", path);
    println!();
    println!("Next steps:");
    println!("1. Set store.backend and store.database_url to persist searches");
    println!("2. Run 'hotsearch validate {:?}' to check your configuration", path);
    println!("3. Run 'hotsearch --config {:?} serve' to start the server", path);

    Ok(())
}

fn handle_validate(path: &Path, cli: &Cli) -> Result<()> {
    info!("Validating configuration at {:?}", path);

    if !path.exists() {
        return Err(HotsearchError::not_found(format!(
            "Configuration file not found: {:?}",
            path
        )));
    }

    let config = HotsearchConfig::from_file(path)?;

    match config.validate() {
        Ok(()) => match cli.output.as_str() {
            "json" => {
                let result = serde_json::json!({
                    "valid": true,
                    "message": "Configuration is valid",
                });
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            _ => {
                println!("Configuration is valid");
                println!("  Store backend: {:?}", config.store.backend);
                println!(
                    "  Server: {}:{}",
                    config.server.host, config.server.port
                );
            }
        },
        Err(e) => {
            match cli.output.as_str() {
                "json" => {
                    let result = serde_json::json!({
                        "valid": false,
                        "error": e.to_string()
                    });
                    println!("{}", serde_json::to_string_pretty(&result)?);
                }
                _ => {
                    println!("Configuration is invalid: {}", e);
                }
            }
            return Err(e);
        }
    }

    Ok(())
}

fn handle_default() {
    println!("Hotsearch - search keyword analytics");
    println!();
    println!("Quick start:");
    println!("  hotsearch init               # Create configuration file");
    println!("  hotsearch serve              # Start web server");
    println!("  hotsearch record <keyword>   # Record a search");
    println!("  hotsearch hot                # Show top keywords");
    println!("  hotsearch --help             # Show all options");
}

/// Prints `value` as JSON or YAML, or hands it to `pretty`
fn render<T, F>(cli: &Cli, value: &T, pretty: F) -> Result<()>
where
    T: Serialize + ?Sized,
    F: FnOnce(&T),
{
    match cli.output.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(value)?),
        "yaml" => print!("{}", serde_yaml::to_string(value)?),
        _ => pretty(value),
    }
    Ok(())
}

fn print_keywords(top: &[KeywordCount]) {
    if top.is_empty() {
        println!("No searches recorded in the ranking window.");
        return;
    }
    for (rank, entry) in top.iter().enumerate() {
        println!("{:>3}. {:<40} {}", rank + 1, entry.keyword, entry.count);
    }
}

fn print_trend(buckets: &[TrendBucket]) {
    let peak = buckets.iter().map(|b| b.count).max().unwrap_or(0).max(1);
    for bucket in buckets {
        let width = (bucket.count * 40 / peak) as usize;
        println!(
            "{:02}:00 {:>6} {}",
            bucket.hour_offset,
            bucket.count,
            "#".repeat(width)
        );
    }
}

fn print_hotspots(hotspots: &[Hotspot]) {
    if hotspots.is_empty() {
        println!("No rising keywords in the last hour.");
        return;
    }
    for hotspot in hotspots {
        println!(
            "{:<40} {:>5} <- {:<5} +{:.1}%",
            hotspot.keyword,
            hotspot.recent_count,
            hotspot.previous_count,
            hotspot.growth_rate_percent
        );
    }
}

fn print_recent(recent: &[RecordedSearch]) {
    for record in recent {
        println!(
            "{}  {:<40} {:<15} {}",
            record.event.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.event.keyword,
            record.event.ip,
            record.event.source
        );
    }
}
