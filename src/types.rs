use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum RasterKind {
    Continuous,
    Categorical,
}

impl fmt::Display for RasterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RasterKind::Continuous => f.write_str("Continuous"),
            RasterKind::Categorical => f.write_str("Categorical"),
        }
    }
}

/// Tên thuật toán đúng như gdalwarp nhận qua `-r`
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResampleAlg {
    Bilinear,
    Near,
}

impl ResampleAlg {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResampleAlg::Bilinear => "bilinear",
            ResampleAlg::Near => "near",
        }
    }
}

impl fmt::Display for ResampleAlg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub kind: RasterKind,
    pub resample: ResampleAlg,
}

impl Classification {
    pub const CONTINUOUS: Classification = Classification {
        kind: RasterKind::Continuous,
        resample: ResampleAlg::Bilinear,
    };

    pub const CATEGORICAL: Classification = Classification {
        kind: RasterKind::Categorical,
        resample: ResampleAlg::Near,
    };
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileTask {
    pub source_path: PathBuf,

    /// path tương đối so với source root, dùng để mirror sang output root
    pub relative_path: PathBuf,

    pub output_path: PathBuf,
}

/// Kết quả 1 lần gọi tool ngoài
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ToolOutcome {
    Success,
    /// `code` = None khi process bị kill bởi signal
    ExitedNonZero { code: Option<i32> },
    NotFound,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Converted,
    Failed { reason: String },
    Aborted,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FileRecord {
    pub index: usize,
    pub relative_path: PathBuf,
    pub output_path: PathBuf,
    pub classification: Option<Classification>,
    pub outcome: FileOutcome,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// số file đã thử (kể cả fail)
    pub attempted: usize,
    pub converted: usize,
    pub failed: usize,

    /// true nếu dừng sớm vì không tìm thấy tool
    pub aborted: bool,

    pub files: Vec<FileRecord>,
}

impl RunSummary {
    pub fn record(&mut self, rec: FileRecord) {
        match rec.outcome {
            FileOutcome::Converted => self.converted += 1,
            FileOutcome::Failed { .. } => self.failed += 1,
            FileOutcome::Aborted => self.aborted = true,
        }
        self.files.push(rec);
    }
}
