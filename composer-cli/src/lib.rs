//! # Saorsa Composer CLI
//!
//! Replays an action script against an editor session and writes the
//! exported composition to disk.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod script;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use composer_core::{EditorConfig, EditorSession, ExportedImage};
use composer_renderer::{ExportFormat, RendererConfig, SvgRenderer};

use crate::script::Script;

/// Command-line arguments for the composer binary.
#[derive(Debug, Clone, Parser)]
#[command(name = "composer")]
#[command(about = "Replay an editor action script and export the composition")]
#[command(version)]
pub struct CliArgs {
    /// Action script (JSON)
    #[arg(long, short)]
    pub script: PathBuf,

    /// Editor configuration file (JSON)
    #[arg(long, env = "COMPOSER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Export destination: a file path, or a directory for the default file name
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Export format, when the output path has no recognised extension
    #[arg(long, value_enum, default_value = "png")]
    pub format: FormatArg,

    /// Directory that sticker paths such as /1.svg resolve against
    #[arg(long, env = "COMPOSER_ASSETS")]
    pub assets: Option<PathBuf>,

    /// Print the final document as JSON on stdout
    #[arg(long)]
    pub print_document: bool,
}

/// Export formats selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// PNG image.
    Png,
    /// JPEG image.
    Jpeg,
    /// SVG document.
    Svg,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Png => Self::Png,
            FormatArg::Jpeg => Self::Jpeg,
            FormatArg::Svg => Self::Svg,
        }
    }
}

/// What a script run produced.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Number of actions executed.
    pub actions: usize,
    /// Files written by export actions.
    pub exports: Vec<PathBuf>,
    /// Final document as JSON.
    pub document_json: String,
}

/// Load the editor configuration, falling back to defaults.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid configuration.
pub fn load_config(path: Option<&Path>) -> Result<EditorConfig> {
    let Some(path) = path else {
        return Ok(EditorConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config = EditorConfig::from_json(&json)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    tracing::info!(path = %path.display(), "Loaded editor configuration");
    Ok(config)
}

/// Run a script as described by `args`.
///
/// Each action is one editor tick: the action runs, then deferred work is
/// handed to the renderer, which is when exports are written.
///
/// # Errors
///
/// Returns an error if the script, configuration or an asset cannot be
/// loaded, or an export fails.
pub fn run(args: &CliArgs) -> Result<RunReport> {
    let config = load_config(args.config.as_deref())?;
    let script = Script::load(&args.script)?;
    let base_dir = args
        .script
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

    let format = args
        .output
        .as_deref()
        .and_then(Path::extension)
        .and_then(|ext| ExportFormat::from_extension(&ext.to_string_lossy()))
        .unwrap_or_else(|| args.format.into());
    let mut renderer = SvgRenderer::new(RendererConfig {
        format,
        asset_root: Some(args.assets.clone().unwrap_or_else(|| base_dir.clone())),
        ..RendererConfig::default()
    });

    let mut session = EditorSession::new(config)?;
    let mut report = RunReport::default();

    for (step, action) in script.actions.iter().enumerate() {
        tracing::debug!(step, ?action, "Applying action");
        action
            .apply(&mut session, &base_dir)
            .with_context(|| format!("Action {step} failed"))?;
        report.actions += 1;

        if let Some(result) = session.run_deferred(&mut renderer) {
            let image = result.context("Export failed")?;
            let path = export_path(args.output.as_deref(), &base_dir, &image);
            write_export(&path, &image)?;
            report.exports.push(path);
        }
    }

    report.document_json = session.document().to_json()?;
    tracing::info!(
        actions = report.actions,
        exports = report.exports.len(),
        elements = session.document().element_count(),
        "Script finished"
    );
    Ok(report)
}

fn export_path(output: Option<&Path>, base_dir: &Path, image: &ExportedImage) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => path.join(&image.file_name),
        Some(path) => path.to_path_buf(),
        None => base_dir.join(&image.file_name),
    }
}

fn write_export(path: &Path, image: &ExportedImage) -> Result<()> {
    std::fs::write(path, &image.bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        width = image.width,
        height = image.height,
        "Wrote export"
    );
    Ok(())
}
