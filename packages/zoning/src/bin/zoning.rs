//! Command-line front end for the zoning pipeline.
//!
//! Prints JSON on stdout; logs go to stderr and follow `RUST_LOG`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use plansa_client::{ClientConfig, PlanSaClient};
use serde::Serialize;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zoning::{
    build_rows, extract_with, validate, Pipeline, PipelineConfig, SiteQuery, ZoneVariations,
};

#[derive(Parser)]
#[command(name = "zoning")]
#[command(about = "Resolve a South Australian property to its zone's development controls")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory for pretty-printed policy snapshots (overrides ZONING_EXPORT_DIR)
    #[arg(long, global = true)]
    export_dir: Option<PathBuf>,

    /// Print criterion/value/variation rows instead of the full report
    #[arg(long, global = true)]
    rows: bool,

    /// Fail when the site has no zone policy documents
    #[arg(long, global = true)]
    require_documents: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a property by street address
    Address { address: String },

    /// Look up a property by WGS84 latitude and longitude
    Coords {
        #[arg(allow_hyphen_values = true)]
        latitude: f64,
        #[arg(allow_hyphen_values = true)]
        longitude: f64,
    },

    /// Extract and validate a policy HTML file already on disk
    Extract { html_file: PathBuf },
}

#[derive(Serialize)]
struct RowsOutput<'a> {
    document_id: &'a str,
    rows: Vec<zoning::ReportRow>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,zoning=debug,plansa_client=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    let cli = Cli::parse();

    let mut config = PipelineConfig::from_env();
    if let Some(dir) = cli.export_dir.clone() {
        config = config.with_export_dir(dir);
    }

    let query = match cli.command {
        Commands::Address { address } => SiteQuery::address(address),
        Commands::Coords {
            latitude,
            longitude,
        } => SiteQuery::coordinates(latitude, longitude),
        Commands::Extract { html_file } => {
            return extract_file(&html_file, &config, cli.rows).await;
        }
    };

    let client = PlanSaClient::new(ClientConfig::from_env())
        .context("Failed to build PlanSA client")?;
    let pipeline =
        Pipeline::new(Arc::new(client), config).context("Invalid pipeline configuration")?;

    let report = pipeline
        .run(query.clone())
        .await
        .with_context(|| format!("Zoning lookup failed for {}", query))?;

    if let Err(e) = report.ensure_documents() {
        if cli.require_documents {
            return Err(e).context("No zone policies to assess");
        }
        warn!(error = %e, "No zone policies found");
    }

    if cli.rows {
        let output: Vec<RowsOutput> = report
            .rows()
            .into_iter()
            .map(|(document_id, rows)| RowsOutput { document_id, rows })
            .collect();
        print_json(&output)
    } else {
        print_json(&report)
    }
}

async fn extract_file(path: &Path, config: &PipelineConfig, rows: bool) -> Result<()> {
    let html = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let extraction = extract_with(&html, &config.markers).context("Invalid table markers")?;
    let outcome = validate(&extraction.criteria);
    for rejected in &outcome.rejected {
        warn!(error = %rejected, "Rejected criterion value");
    }

    if rows {
        let document_id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let output = RowsOutput {
            document_id,
            rows: build_rows(&outcome.assessment, &ZoneVariations::default()),
        };
        return print_json(&[output]);
    }

    #[derive(Serialize)]
    struct ExtractOutput<'a> {
        extraction: &'a zoning::TableExtraction,
        outcome: &'a zoning::ValidationOutcome,
    }
    print_json(&ExtractOutput {
        extraction: &extraction,
        outcome: &outcome,
    })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
