//! Blinc Field CLI
//!
//! Resolve and present select field configurations from the command line.

use anyhow::{Context, Result};
use blinc_field::config::FieldConfig;
use blinc_field::presenter::present_field;
use blinc_field::request::OptionRequest;
use blinc_field::resolver::{OptionResolver, ResolverStatus};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod render;
mod source;

use source::JsonFileSource;

#[derive(Parser)]
#[command(name = "blinc-field")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Blinc select field inspector", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the option list of a field
    Options {
        /// Field configuration (TOML or JSON)
        config: PathBuf,

        /// Search keyword
        #[arg(short, long)]
        keyword: Option<String>,

        /// JSON option list served as the remote source
        #[arg(long)]
        source: Option<PathBuf>,

        /// Simulated request latency in milliseconds
        #[arg(long, default_value = "0")]
        latency_ms: u64,
    },

    /// Present stored values in read mode
    Read {
        /// Field configuration (TOML or JSON)
        config: PathBuf,

        /// Values to present; parsed as JSON, otherwise taken as strings
        #[arg(required = true)]
        values: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Options {
            config,
            keyword,
            source,
            latency_ms,
        } => cmd_options(&config, keyword, source.as_deref(), latency_ms),

        Commands::Read { config, values } => cmd_read(&config, &values),
    }
}

fn load_config(path: &Path) -> Result<FieldConfig> {
    FieldConfig::load(path).with_context(|| format!("Failed to load {}", path.display()))
}

fn cmd_options(
    config_path: &Path,
    keyword: Option<String>,
    source: Option<&Path>,
    latency_ms: u64,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if keyword.is_some() {
        config.default_keyword = keyword;
    }

    let request: Option<Arc<dyn OptionRequest>> = match source {
        Some(path) => Some(Arc::new(JsonFileSource::load(
            path,
            &config.field_props.field_names,
            Duration::from_millis(latency_ms),
        )?)),
        None => None,
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(async move {
        let resolver = OptionResolver::mount(config, request);
        debug!("Mounted resolver {}", resolver.instance_id());

        let mut updates = resolver.subscribe();
        let snapshot = updates.wait_for(|s| !s.loading).await?.clone();

        if snapshot.status == ResolverStatus::Errored {
            if let Some(err) = snapshot.error {
                return Err(err.into());
            }
        }

        info!("{} options ({:?})", snapshot.options.len(), snapshot.status);
        print!("{}", render::option_tree(&snapshot.options, &resolver.highlighter()));
        Ok::<(), anyhow::Error>(())
    })
}

fn cmd_read(config_path: &Path, values: &[String]) -> Result<()> {
    let config = load_config(config_path)?;
    let options = config.field_props.options.clone().unwrap_or_default();

    for raw in values {
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone()));
        let node = present_field(&value, &config, &options);
        println!("{} => {}", raw, render::display_node(&node));
    }

    Ok(())
}
