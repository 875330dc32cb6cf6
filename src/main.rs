use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use log::{info, warn};
use simplelog::{ConfigBuilder, WriteLogger};

use railfocus::LogLevel;
use railfocus::core::catalog::{demo_catalog, load_catalog};
use railfocus::core::config::{RailfocusConfig, load_config, resolve};
use railfocus::tui;

#[derive(Parser)]
#[command(name = "railfocus", about = "Remote-control focus engine for rail-based TV screens")]
struct Args {
    /// Catalog JSON file (sections of items)
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Config file to use instead of ~/.railfocus/config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level for railfocus.log
    #[arg(short, long, default_value_t, value_enum)]
    log_level: LogLevel,
}

fn main() -> std::io::Result<()> {
    let args = Args::parse();

    // Initialize file logger - writes to railfocus.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("railfocus.log") {
        let _ = WriteLogger::init(args.log_level.to_filter(), log_config, log_file);
    }

    let config = load_config(args.config.as_deref()).unwrap_or_else(|e| {
        warn!("Falling back to default config: {e}");
        RailfocusConfig::default()
    });
    let resolved = resolve(&config, args.catalog.as_deref());

    let sections = match resolved.catalog_path.as_deref() {
        Some(path) => load_catalog(path).unwrap_or_else(|e| {
            warn!("Using demo catalog, {} could not be loaded: {e}", path.display());
            demo_catalog()
        }),
        None => demo_catalog(),
    };

    info!("railfocus starting up with {} sections", sections.len());

    tui::run(resolved, sections)
}
