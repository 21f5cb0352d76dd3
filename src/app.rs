use crate::classify::Classifier;
use crate::config::AppConfig;
use crate::fs_scan;
use crate::report::{self, RunReport};
use crate::types::{Classification, FileOutcome, FileRecord, FileTask, RunSummary, ToolOutcome};
use crate::warp::WarpTool;

use anyhow::Result;
use std::io::Write;
use std::path::Path;
use time::OffsetDateTime;

/* =========================
   Helpers
   ========================= */

fn display_abs(p: &Path) -> String {
    std::path::absolute(p)
        .unwrap_or_else(|_| p.to_path_buf())
        .display()
        .to_string()
}

fn file_name_of(task: &FileTask) -> String {
    task.source_path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| task.relative_path.display().to_string())
}

fn write_progress(
    out: &mut dyn Write,
    index: usize,
    task: &FileTask,
    c: &Classification,
) -> Result<()> {
    writeln!(out, "[{}] {}", index, task.relative_path.display())?;
    writeln!(out, "    ├─ Type: {} -> Algo: {}", c.kind, c.resample)?;
    Ok(())
}

/* =========================
   Plan (dry run)
   ========================= */

#[derive(Debug, Clone)]
pub struct PlannedFile {
    pub task: FileTask,
    pub classification: Classification,
}

pub fn build_plan(cfg: &AppConfig) -> Result<Vec<PlannedFile>> {
    let classifier = Classifier::new(&cfg.categorical_keywords)?;
    tracing::debug!(keywords = ?classifier.keywords(), "classifier ready");
    let files = fs_scan::discover_rasters(&cfg.source_root, &cfg.output_root);

    let mut planned = Vec::with_capacity(files.len());
    for src in &files {
        let task = fs_scan::build_task(&cfg.source_root, &cfg.output_root, src)?;
        let classification = classifier.classify(&file_name_of(&task));
        planned.push(PlannedFile {
            task,
            classification,
        });
    }
    Ok(planned)
}

/// Chỉ “xem”: không tạo folder, không gọi tool.
pub fn plan(cfg: &AppConfig, out: &mut dyn Write) -> Result<()> {
    let planned = build_plan(cfg)?;

    writeln!(out, "=== RUN PLAN ===")?;
    writeln!(out, "Source : {}", display_abs(&cfg.source_root))?;
    writeln!(out, "Target : {}", display_abs(&cfg.output_root))?;
    writeln!(out, "Tool   : {} (t_srs={})", cfg.tool, cfg.target_srs)?;
    writeln!(out, "Files  : {}\n", planned.len())?;

    for (i, p) in planned.iter().enumerate() {
        write_progress(out, i + 1, &p.task, &p.classification)?;
        writeln!(out, "    └─ Output: {}", p.task.output_path.display())?;
    }

    Ok(())
}

/* =========================
   Convert
   ========================= */

/// Xử lý tuần tự từng file: tạo folder -> phân loại -> gọi tool -> chờ xong.
/// Tool không tồn tại => dừng hẳn, các file sau không được thử.
pub fn convert_all(
    cfg: &AppConfig,
    tool: &dyn WarpTool,
    out: &mut dyn Write,
) -> Result<RunSummary> {
    let started = OffsetDateTime::now_utc();
    let classifier = Classifier::new(&cfg.categorical_keywords)?;

    writeln!(out, "Starting Smart Preprocessing...")?;
    writeln!(out, "Source: {}", display_abs(&cfg.source_root))?;
    writeln!(out, "Target: {}\n", display_abs(&cfg.output_root))?;

    let files = fs_scan::discover_rasters(&cfg.source_root, &cfg.output_root);
    tracing::info!(files = files.len(), "discovered rasters");

    let mut summary = RunSummary::default();

    for src in &files {
        summary.attempted += 1;
        let index = summary.attempted;

        let task = fs_scan::build_task(&cfg.source_root, &cfg.output_root, src)?;
        let name = file_name_of(&task);

        if let Err(e) = fs_scan::ensure_parent_dir(&task.output_path) {
            tracing::error!(file = %task.relative_path.display(), "{:#}", e);
            writeln!(out, "[{}] {}", index, task.relative_path.display())?;
            writeln!(out, "    FAILED: {} ({:#})", name, e)?;
            summary.record(FileRecord {
                index,
                relative_path: task.relative_path,
                output_path: task.output_path,
                classification: None,
                outcome: FileOutcome::Failed {
                    reason: format!("{:#}", e),
                },
            });
            continue;
        }

        let classification = classifier.classify(&name);
        write_progress(out, index, &task, &classification)?;
        // subprocess ghi thẳng ra stdout, flush trước để không lẫn thứ tự
        out.flush()?;

        let result = tool.warp(classification.resample, &task.source_path, &task.output_path);
        let outcome = match result {
            Ok(ToolOutcome::Success) => FileOutcome::Converted,
            Ok(ToolOutcome::ExitedNonZero { code }) => {
                writeln!(out, "    FAILED: {}", name)?;
                let reason = match code {
                    Some(c) => format!("{} exited with code {}", tool.name(), c),
                    None => format!("{} terminated by signal", tool.name()),
                };
                tracing::warn!(file = %task.relative_path.display(), "{}", reason);
                FileOutcome::Failed { reason }
            }
            Ok(ToolOutcome::NotFound) => {
                writeln!(out, "    ERROR: {} command not found!", tool.name())?;
                FileOutcome::Aborted
            }
            Err(e) => {
                writeln!(out, "    ERROR: {:#}", e)?;
                tracing::error!("{:#}", e);
                FileOutcome::Aborted
            }
        };

        let stop = outcome == FileOutcome::Aborted;
        summary.record(FileRecord {
            index,
            relative_path: task.relative_path,
            output_path: task.output_path,
            classification: Some(classification),
            outcome,
        });
        if stop {
            break;
        }
    }

    writeln!(out, "\nDone! Processed {} files.", summary.attempted)?;

    if let Some(path) = &cfg.report {
        let rep = RunReport {
            started_at: report::rfc3339(started),
            finished_at: report::rfc3339(OffsetDateTime::now_utc()),
            source_root: cfg.source_root.clone(),
            output_root: cfg.output_root.clone(),
            tool: tool.name(),
            summary: &summary,
        };
        report::save_report(path, &rep)?;
        writeln!(out, "Report: {}", path.display())?;
    }

    out.flush()?;
    Ok(summary)
}
