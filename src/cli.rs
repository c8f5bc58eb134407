// src/cli.rs
use crate::environment::EnvironmentConfig;
use crate::export::raster::ResvgRasterizer;
use crate::export::{ExportOutcome, ExportPipeline};
use crate::form_binder::{apply_photo, read_photo};
use crate::session::CvSession;
use crate::types::CvRecord;
use crate::utils::{get_file_extension, read_file_content, write_file_bytes};
use crate::web::start_web_server;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "cv-builder")]
#[command(about = "Fill in a CV, preview it and export it as a paginated A4 PDF")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the web editor
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
    /// Export a CV record file to PDF
    Export {
        /// Record file (.toml, .json, .yaml)
        #[arg(long)]
        record: PathBuf,
        /// Profile photo to embed
        #[arg(long)]
        photo: Option<PathBuf>,
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Write the rendered preview of a record as SVG
    Preview {
        #[arg(long)]
        record: PathBuf,
        #[arg(long)]
        svg: PathBuf,
    },
}

/// Parses a record file; the format follows the extension, TOML by default.
pub async fn load_record(path: &Path) -> Result<CvRecord> {
    let content = read_file_content(path).await?;
    let record: CvRecord = match get_file_extension(&path.to_string_lossy()).as_deref() {
        Some("json") => serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON record: {}", path.display()))?,
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid YAML record: {}", path.display()))?,
        _ => toml::from_str(&content)
            .with_context(|| format!("Invalid TOML record: {}", path.display()))?,
    };
    Ok(record)
}

/// Exports a record through the pipeline and returns the written file.
pub async fn export_record(
    mut record: CvRecord,
    photo: Option<&Path>,
    output_dir: &Path,
    pipeline: &ExportPipeline,
) -> Result<PathBuf> {
    if let Some(photo) = photo {
        let data_url = read_photo(photo)
            .await
            .with_context(|| format!("Cannot use photo {}", photo.display()))?;
        apply_photo(&mut record, data_url);
    }

    let session = CvSession::with_record(record);
    let report = session.export(pipeline).await;

    match report.outcome {
        ExportOutcome::Emitted(artifact) => {
            let target = output_dir.join(&artifact.file_name);
            write_file_bytes(&target, &artifact.bytes).await?;
            info!(
                "Wrote {} ({} pages)",
                target.display(),
                artifact.page_count
            );
            Ok(target)
        }
        ExportOutcome::Skipped => anyhow::bail!("Nothing to export"),
        ExportOutcome::Reported { message } => anyhow::bail!(message),
    }
}

pub async fn handle_command(cli: Cli, config: EnvironmentConfig) -> Result<()> {
    match cli.command {
        Command::Serve { port } => {
            let port = port.unwrap_or(config.port);
            let pipeline = ExportPipeline::new(Arc::new(ResvgRasterizer::new()));
            start_web_server(CvSession::new(), pipeline, port).await
        }

        Command::Export {
            record,
            photo,
            output_dir,
        } => {
            let cv = load_record(&record).await?;
            let output_dir = output_dir.unwrap_or(config.output_path);
            let pipeline = ExportPipeline::new(Arc::new(ResvgRasterizer::new()));
            let written = export_record(cv, photo.as_deref(), &output_dir, &pipeline).await?;
            println!("{}", written.display());
            Ok(())
        }

        Command::Preview { record, svg } => {
            let cv = load_record(&record).await?;
            let session = CvSession::with_record(cv);
            let rendered = session
                .preview_svg()
                .context("The record did not produce a preview")?;
            write_file_bytes(&svg, rendered.as_bytes()).await?;
            info!("Preview written to {}", svg.display());
            Ok(())
        }
    }
}
