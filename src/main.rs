mod app;
mod classify;
mod config;
mod fs_scan;
mod report;
mod types;
mod warp;

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Batch reproject GeoTIFF rasters with gdalwarp")]
struct Cli {
    /// Folder chứa raster gốc (đệ quy)
    #[arg(long, global = true)]
    source_root: Option<PathBuf>,

    /// Folder output, giữ nguyên cấu trúc con của source
    #[arg(long, global = true)]
    output_root: Option<PathBuf>,

    /// Lệnh reprojection (mặc định gdalwarp)
    #[arg(long, global = true)]
    tool: Option<String>,

    #[arg(long, global = true)]
    target_srs: Option<String>,

    /// File YAML cấu hình
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Ghi kết quả run ra JSON
    #[arg(long, global = true)]
    report: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert tất cả raster (mặc định)
    Run,
    /// Chỉ liệt kê file + phân loại, không gọi tool
    Plan,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let yaml = match &cli.config {
        Some(p) => Some(config::load_yaml(p)?),
        None => None,
    };

    let cfg = config::AppConfig::resolve(
        yaml,
        config::Overrides {
            source_root: cli.source_root,
            output_root: cli.output_root,
            tool: cli.tool,
            target_srs: cli.target_srs,
            report: cli.report,
        },
    );
    tracing::debug!(?cfg, "resolved config");

    match cli.cmd.unwrap_or(Commands::Run) {
        Commands::Plan => app::plan(&cfg, &mut io::stdout().lock())?,
        Commands::Run => {
            let tool = warp::GdalWarp::new(
                &cfg.tool,
                warp::WarpOptions {
                    target_srs: cfg.target_srs.clone(),
                },
            );
            let summary = app::convert_all(&cfg, &tool, &mut io::stdout().lock())?;
            if summary.aborted {
                return Err(anyhow!(
                    "run aborted after {} file(s): {} is unavailable",
                    summary.attempted,
                    cfg.tool
                ));
            }
        }
    }

    Ok(())
}
