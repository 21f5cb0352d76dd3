use crate::types::{ResampleAlg, ToolOutcome};
use anyhow::{Context, Result};
use std::ffi::{OsStr, OsString};
use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;

pub const DEFAULT_TOOL: &str = "gdalwarp";
pub const DEFAULT_TARGET_SRS: &str = "EPSG:4326";

/// Creation options cố định cho GeoTIFF output
const CREATION_OPTIONS: &[&str] = &[
    "COMPRESS=ZSTD",
    "PREDICTOR=2",
    "TILED=YES",
    "BLOCKXSIZE=256",
    "BLOCKYSIZE=256",
    "BIGTIFF=IF_NEEDED",
];

#[derive(Debug, Clone)]
pub struct WarpOptions {
    pub target_srs: String,
}

impl Default for WarpOptions {
    fn default() -> Self {
        Self {
            target_srs: DEFAULT_TARGET_SRS.to_string(),
        }
    }
}

/// Argument list cho gdalwarp (không gồm tên program).
pub fn warp_args(
    opts: &WarpOptions,
    resample: ResampleAlg,
    src: &Path,
    dst: &Path,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-t_srs".into(),
        opts.target_srs.as_str().into(),
        "-r".into(),
        resample.as_str().into(),
        "-multi".into(),
        "-wo".into(),
        "NUM_THREADS=ALL_CPUS".into(),
    ];

    for co in CREATION_OPTIONS {
        args.push("-co".into());
        args.push((*co).into());
    }

    args.push("-overwrite".into());
    args.push("-q".into());
    args.push(src.as_os_str().to_owned());
    args.push(dst.as_os_str().to_owned());
    args
}

/// Tool reprojection bên ngoài. Chạy đồng bộ, chờ xong mới trả.
pub trait WarpTool {
    /// Tên hiển thị trong log
    fn name(&self) -> &str;

    /// `Err` chỉ khi spawn lỗi mà không phải NotFound (vd: permission denied).
    fn warp(&self, resample: ResampleAlg, src: &Path, dst: &Path) -> Result<ToolOutcome>;
}

#[derive(Debug, Clone)]
pub struct GdalWarp {
    program: OsString,
    options: WarpOptions,
}

impl GdalWarp {
    pub fn new(program: impl AsRef<OsStr>, options: WarpOptions) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            options,
        }
    }
}

impl WarpTool for GdalWarp {
    fn name(&self) -> &str {
        self.program.to_str().unwrap_or(DEFAULT_TOOL)
    }

    fn warp(&self, resample: ResampleAlg, src: &Path, dst: &Path) -> Result<ToolOutcome> {
        let args = warp_args(&self.options, resample, src, dst);
        tracing::debug!(program = ?self.program, ?args, "spawning");

        // không timeout: tool treo thì cả run treo
        match Command::new(&self.program).args(&args).status() {
            Ok(status) if status.success() => Ok(ToolOutcome::Success),
            Ok(status) => Ok(ToolOutcome::ExitedNonZero {
                code: status.code(),
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(ToolOutcome::NotFound),
            Err(e) => Err(e).with_context(|| format!("spawn {}", self.program.to_string_lossy())),
        }
    }
}
