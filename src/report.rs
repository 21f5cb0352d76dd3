use crate::types::RunSummary;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub started_at: String,
    pub finished_at: String,
    pub source_root: PathBuf,
    pub output_root: PathBuf,
    pub tool: &'a str,

    #[serde(flatten)]
    pub summary: &'a RunSummary,
}

pub fn rfc3339(t: OffsetDateTime) -> String {
    t.format(&Rfc3339).unwrap_or_else(|_| t.unix_timestamp().to_string())
}

/// Ghi report JSON (pretty), tạo folder cha nếu thiếu
pub fn save_report(path: &Path, report: &RunReport<'_>) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create_dir_all {}", parent.display()))?;
        }
    }
    let s = serde_json::to_string_pretty(report)?;
    std::fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
