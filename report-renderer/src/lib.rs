//! Turns a priority summary plus the tagged posts behind it into a
//! human-readable report.

pub mod data;
pub mod markdown;

pub use data::{excerpt, ExamplePost, PainPointSection, ReportData, ReportOptions};
pub use markdown::MarkdownReport;

use painpoint_core::CoreError;
use std::fs;
use std::path::Path;
use tracing::info;

pub trait ReportRenderer {
    fn file_extension(&self) -> &'static str;

    fn render(&self, data: &ReportData) -> Result<String, CoreError>;
}

/// The report data as pretty-printed JSON, for tooling.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReport;

impl ReportRenderer for JsonReport {
    fn file_extension(&self) -> &'static str {
        "json"
    }

    fn render(&self, data: &ReportData) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(data)?)
    }
}

/// Renders `data` and writes it to `path`, creating parent directories.
pub fn write_report<R: ReportRenderer + ?Sized>(
    renderer: &R,
    data: &ReportData,
    path: &Path,
) -> Result<(), CoreError> {
    let document = renderer.render(data)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, document)?;
    info!("Report generated: {}", path.display());
    Ok(())
}
