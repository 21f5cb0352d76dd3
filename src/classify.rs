use crate::types::Classification;
use anyhow::{Context, Result};
use regex::Regex;

/// Keyword trong tên file => raster dạng categorical (class label), phải resample `near`.
pub const DEFAULT_CATEGORICAL_KEYWORDS: &[&str] =
    &["esa", "worldcover", "class", "id", "type", "mask"];

/// Phân loại raster theo tên file.
#[derive(Debug, Clone)]
pub struct Classifier {
    keywords: Vec<String>,

    /// None khi không có keyword => mọi file đều continuous
    pattern: Option<Regex>,
}

impl Classifier {
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Result<Self> {
        let keywords: Vec<String> = keywords
            .iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        let pattern = if keywords.is_empty() {
            None
        } else {
            let alt = keywords
                .iter()
                .map(|k| regex::escape(k))
                .collect::<Vec<_>>()
                .join("|");
            let re = Regex::new(&alt).with_context(|| format!("compile keyword pattern {alt}"))?;
            Some(re)
        };

        Ok(Self { keywords, pattern })
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Chỉ xét file name, không xét folder cha.
    /// Lowercase tên file rồi tìm substring, keyword đã lowercase sẵn.
    pub fn classify(&self, file_name: &str) -> Classification {
        match &self.pattern {
            Some(re) if re.is_match(&file_name.to_lowercase()) => Classification::CATEGORICAL,
            _ => Classification::CONTINUOUS,
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        // keyword mặc định là literal, escape xong luôn compile được
        let alt = DEFAULT_CATEGORICAL_KEYWORDS.join("|");
        Self {
            keywords: DEFAULT_CATEGORICAL_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            pattern: Regex::new(&alt).ok(),
        }
    }
}
