///
/// This module implements the CLI interface for crumb-convert: command parsing,
/// flag overrides on top of the YAML config and the operator report.
///
/// All conversion logic lives in the [`crumb-convert-core`] crate. This module
/// only wires the HTTP fetcher and UUID generator into the core pipeline.
///
/// ## How To Use
/// - For command-line users: run the `crumb-convert` binary with `--help`.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// [`crumb-convert-core`]: ../../crumb_convert_core/
use crate::fetch::HttpImageFetcher;
use crate::load_config::load_config;
use anyhow::Result;
use clap::{Parser, Subcommand};
use crumb_convert_core::contract::UuidGenerator;
use crumb_convert_core::convert::{convert, ConvertReport};
use std::path::PathBuf;

/// CLI for crumb-convert: turn a Körbchen export into Crouton bundles.
#[derive(Parser)]
#[clap(
    name = "crumb-convert",
    version,
    about = "Convert a Körbchen recipe export into Crouton .crumb bundles"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert the export described by the given config file
    Convert {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,

        /// Directory holding recipes.json and cookbooks.json (overrides the config)
        #[clap(long)]
        input_dir: Option<PathBuf>,

        /// Destination for the listing and the bundles (overrides the config)
        #[clap(long)]
        output_dir: Option<PathBuf>,

        /// Image cache directory (overrides the config)
        #[clap(long)]
        images_dir: Option<PathBuf>,
    },
}

/// Human-readable summary printed after a successful run.
pub fn render_report(report: &ConvertReport) -> String {
    let mut lines = vec![
        format!("Converted {} recipes", report.recipes),
        format!("Listing: {}", report.listing.display()),
        format!("Bundles written: {}", report.bundles.len()),
        format!(
            "Images: {} fetched, {} failed, {} cached, {} placeholders skipped",
            report.images.fetched,
            report.images.failed,
            report.images.already_cached,
            report.images.skipped_placeholder
        ),
    ];
    if !report.unmapped_units.is_empty() {
        lines.push(format!("Unknown units: {}", report.unmapped_units.join(", ")));
    }
    lines.join("\n")
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Convert {
            config,
            input_dir,
            output_dir,
            images_dir,
        } => {
            let mut config = load_config(config)?;
            if let Some(dir) = input_dir {
                config.input_dir = dir;
            }
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if let Some(dir) = images_dir {
                config.images_dir = Some(dir);
            }
            config.trace_loaded();

            tracing::info!(command = "convert", "Starting conversion");
            let fetcher = HttpImageFetcher::new(&config.fetch)?;
            match convert(&config, &fetcher, &UuidGenerator).await {
                Ok(report) => {
                    tracing::info!(command = "convert", ?report, "Conversion complete");
                    println!("{}", render_report(&report));
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "convert", error = %e, "Conversion failed");
                    Err(anyhow::Error::new(e))
                }
            }
        }
    }
}
