//! Sensorboard CLI
//!
//! Terminal watcher for the sensor-data endpoint:
//! - `watch`: poll every two seconds and redraw the chart until Ctrl-C
//! - `once`: run a single cycle and print the result
//! - `config`: print or write the default config file

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::rc::Rc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sensorboard::terminal::{self, render_frame, PLOT_HEIGHT};
use sensorboard::{
    Config, CycleOutcome, HttpSource, MemoryPage, MemorySurface, OverlapPolicy, Poller, Renderer,
    Scheduler, DATE_TITLE_ID, HUMIDITY_ID, TEMPERATURE_ID,
};

#[derive(Parser)]
#[command(name = "sensorboard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Live temperature and humidity from a sensor-data endpoint")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the usual locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Server URL; `/sensor-data` is appended
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Accept self-signed TLS certificates
    #[arg(long, global = true)]
    pub insecure: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Poll and redraw until interrupted
    Watch {
        /// What to do when a tick fires during a fetch (allow, skip)
        #[arg(long)]
        overlap: Option<OverlapPolicy>,
    },

    /// Run one cycle and print the result
    Once {
        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Watch { overlap } => {
            let config = load_config(&cli)?;
            let policy = overlap.unwrap_or(config.poll.overlap);
            watch(source(&config)?, policy).await?;
        }
        Commands::Once { format } => {
            let config = load_config(&cli)?;
            once(source(&config)?, format).await?;
        }
        Commands::Config { output } => {
            let content = sensorboard::config::generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(path, content)?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

/// Load config, apply command-line overrides and start logging
fn load_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.url {
        config.source.url = url.clone();
    }
    if cli.insecure {
        config.source.accept_invalid_certs = true;
    }

    init_logging(&config);
    Ok(config)
}

fn source(config: &Config) -> Result<HttpSource, sensorboard::SourceError> {
    HttpSource::with_options(&config.source.url, config.source.accept_invalid_certs)
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("sensorboard={}", config.logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn watch(source: HttpSource, policy: OverlapPolicy) -> Result<(), Box<dyn std::error::Error>> {
    let (page, surface) = terminal::terminal(std::io::stdout());

    let mut renderer = Renderer::new();
    renderer.initialize(surface.clear_screen(true))?;

    let poller = Rc::new(Poller::new(source, page, renderer));
    let scheduler = Scheduler::new(Rc::clone(&poller), policy);

    let local = tokio::task::LocalSet::new();
    local
        .run_until(async {
            tokio::select! {
                _ = scheduler.run() => {}
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Interrupted");
                }
            }
        })
        .await;

    let stats = poller.stats();
    tracing::info!(
        started = stats.started,
        rendered = stats.rendered,
        empty = stats.empty,
        failed = stats.failed,
        skipped = stats.skipped,
        "Stopped polling"
    );

    Ok(())
}

async fn once(source: HttpSource, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut renderer = Renderer::new();
    renderer.initialize(MemorySurface::default())?;

    let poller = Poller::new(source, MemoryPage::dashboard(), renderer);
    let outcome = poller.fetch_and_render().await?;

    if outcome == CycleOutcome::Empty {
        eprintln!("No sensor data");
        return Ok(());
    }

    let renderer = poller.renderer();
    let Some(model) = renderer.model() else {
        return Ok(());
    };

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(model)?);
        }
        _ => {
            let page = poller.page();
            print!(
                "{}",
                render_frame(
                    model,
                    page.text(DATE_TITLE_ID).unwrap_or_default(),
                    page.text(TEMPERATURE_ID).unwrap_or_default(),
                    page.text(HUMIDITY_ID).unwrap_or_default(),
                    PLOT_HEIGHT,
                )
            );
        }
    }

    Ok(())
}
