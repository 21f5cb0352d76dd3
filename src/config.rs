use crate::classify::DEFAULT_CATEGORICAL_KEYWORDS;
use crate::warp::{DEFAULT_TARGET_SRS, DEFAULT_TOOL};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};

pub const DEFAULT_SOURCE_ROOT: &str = "./run/datasets/raw";
pub const DEFAULT_OUTPUT_ROOT: &str = "./run/datasets";

/// File YAML tùy chọn, field nào thiếu thì lấy default.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct YamlConfig {
    pub source_root: Option<PathBuf>,
    pub output_root: Option<PathBuf>,
    pub tool: Option<String>,
    pub target_srs: Option<String>,
    pub categorical_keywords: Option<Vec<String>>,
    pub report: Option<PathBuf>,
}

pub fn load_yaml(path: &Path) -> Result<YamlConfig> {
    let file = File::open(path).with_context(|| format!("open config {}", path.display()))?;
    serde_yaml::from_reader(file).with_context(|| format!("parse config {}", path.display()))
}

/// Giá trị override từ CLI (ưu tiên cao nhất)
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub source_root: Option<PathBuf>,
    pub output_root: Option<PathBuf>,
    pub tool: Option<String>,
    pub target_srs: Option<String>,
    pub report: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub source_root: PathBuf,
    pub output_root: PathBuf,
    pub tool: String,
    pub target_srs: String,
    pub categorical_keywords: Vec<String>,

    /// ghi RunSummary ra JSON nếu có
    pub report: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from(DEFAULT_SOURCE_ROOT),
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            tool: DEFAULT_TOOL.to_string(),
            target_srs: DEFAULT_TARGET_SRS.to_string(),
            categorical_keywords: DEFAULT_CATEGORICAL_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            report: None,
        }
    }
}

impl AppConfig {
    /// CLI > YAML > default
    pub fn resolve(yaml: Option<YamlConfig>, cli: Overrides) -> Self {
        let d = Self::default();
        let y = yaml.unwrap_or_default();

        Self {
            source_root: cli.source_root.or(y.source_root).unwrap_or(d.source_root),
            output_root: cli.output_root.or(y.output_root).unwrap_or(d.output_root),
            tool: cli.tool.or(y.tool).unwrap_or(d.tool),
            target_srs: cli.target_srs.or(y.target_srs).unwrap_or(d.target_srs),
            categorical_keywords: y.categorical_keywords.unwrap_or(d.categorical_keywords),
            report: cli.report.or(y.report),
        }
    }
}
