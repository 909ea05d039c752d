//! Storage - persisting finished scans as text, JSON or CSV files

mod delimited;
mod json;
mod naming;
mod text;

pub use delimited::CsvExporter;
pub use json::JsonExporter;
pub use naming::{default_stem, sanitize_target, OutputLocation};
pub use text::TextExporter;

use portlens_common::{PortlensError, PortlensResult, ResultSink};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl ExportFormat {
    pub const fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    /// Build the sink for this format writing to `location`.
    pub fn exporter(&self, location: OutputLocation) -> Box<dyn ResultSink> {
        match self {
            ExportFormat::Text => Box::new(TextExporter::new(location)),
            ExportFormat::Json => Box::new(JsonExporter::new(location)),
            ExportFormat::Csv => Box::new(CsvExporter::new(location)),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Text => "text",
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = PortlensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(ExportFormat::Text),
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(PortlensError::Config(format!("unknown export format '{}'", other))),
        }
    }
}

/// Write a rendered export to disk.
pub(crate) fn persist(path: &Path, contents: &[u8]) -> PortlensResult<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| PortlensError::Export(format!("{}: {}", parent.display(), e)))?;
    }
    fs::write(path, contents)
        .map_err(|e| PortlensError::Export(format!("{}: {}", path.display(), e)))?;
    info!("Results exported to {}", path.display());
    Ok(path.to_path_buf())
}
