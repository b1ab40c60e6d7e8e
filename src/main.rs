use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use brand_image_pipeline_lib::infrastructure::{PipelineConfig, init_logging};
use brand_image_pipeline_lib::{run_collect, run_publish};

#[derive(Debug, Parser)]
#[command(name = "brand-image-pipeline", version, about = "Collect catalog images by brand and publish them to the media host")]
struct Cli {
    /// Config file (default: ./brand-pipeline.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding brand folders, the record file and logs
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Download product images from saved catalog pages into brand folders
    Collect {
        /// Catalog file to process; repeat for several (default: configured list)
        #[arg(long = "catalog")]
        catalogs: Vec<String>,
    },
    /// Upload brand folder images and record their hosted URLs
    Publish,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = PipelineConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(root) = cli.root {
        config.root_dir = root;
    }

    init_logging(&config.logging, &config.log_dir()).context("Failed to initialize logging")?;

    match cli.command {
        Command::Collect { catalogs } => {
            let selected = (!catalogs.is_empty()).then_some(catalogs.as_slice());
            run_collect(&config, selected).await?;
        }
        Command::Publish => {
            run_publish(&config).await?;
        }
    }

    Ok(())
}
