//! Command handlers. Each returns the process exit code.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::commands::{DetectArgs, RootArgs};
use super::output::OutputFormatter;
use crate::config::DetectorConfig;
use crate::detection::{
    CancellationToken, ProjectScanner, ScanError, ScanReport, WorkspaceDetector, WorkspaceRoot,
    WorkspaceRootResolver,
};
use crate::fs::{FileSystem, RealFileSystem};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
/// Conventional exit code for termination by SIGINT
pub const EXIT_CANCELLED: i32 = 130;

pub async fn handle_detect(args: &DetectArgs) -> i32 {
    match run_detect(args).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %format!("{:#}", e), "Detection failed");
            eprintln!("Error: {:#}", e);
            EXIT_FAILURE
        }
    }
}

pub fn handle_root(args: &RootArgs) -> i32 {
    match run_root(args) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            error!(error = %format!("{:#}", e), "Root resolution failed");
            eprintln!("Error: {:#}", e);
            EXIT_FAILURE
        }
    }
}

async fn run_detect(args: &DetectArgs) -> Result<i32> {
    let start = start_path(args.path.as_deref());
    let config = DetectorConfig::from_env().with_excluded_dirs(args.exclude.iter().cloned());
    config.validate().context("Invalid configuration")?;

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem::new());
    let config = Arc::new(config);
    let cancel = CancellationToken::new();

    let interrupt = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, stopping scan");
                cancel.cancel();
            }
        }
    });

    let no_resolve = args.no_resolve;
    let scan_cancel = cancel.clone();
    let result = tokio::task::spawn_blocking(move || {
        scan(&start, fs, config, no_resolve, &scan_cancel)
    })
    .await
    .context("Scan task failed")?;
    interrupt.abort();

    let (workspace, report) = result?;
    debug!(projects = report.projects.len(), "Formatting scan report");

    let output = OutputFormatter::new(args.format.into()).format(&report, workspace.as_ref())?;
    write_output(&output, args.output.as_deref())?;

    if report.cancelled {
        Ok(EXIT_CANCELLED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

fn scan(
    start: &Path,
    fs: Arc<dyn FileSystem>,
    config: Arc<DetectorConfig>,
    no_resolve: bool,
    cancel: &CancellationToken,
) -> Result<(Option<WorkspaceRoot>, ScanReport), ScanError> {
    if no_resolve {
        let scanner = ProjectScanner::new(start, fs, config)?;
        return Ok((None, scanner.scan_with_cancel(cancel)));
    }

    let (workspace, report) = WorkspaceDetector::new(fs, config).detect(start, cancel)?;
    Ok((Some(workspace), report))
}

fn run_root(args: &RootArgs) -> Result<()> {
    let start = start_path(args.path.as_deref());
    let config = DetectorConfig::from_env();
    config.validate().context("Invalid configuration")?;

    let resolver = WorkspaceRootResolver::new(Arc::new(RealFileSystem::new()), Arc::new(config));
    let workspace = resolver.resolve(&start)?;

    let output = OutputFormatter::new(args.format.into()).format_root(&workspace)?;
    write_output(&output, None)
}

fn start_path(path: Option<&Path>) -> PathBuf {
    path.map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn write_output(output: &str, file: Option<&Path>) -> Result<()> {
    match file {
        Some(path) => {
            std::fs::write(path, output)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            info!(path = %path.display(), "Output written");
        }
        None => print!("{}", output),
    }
    Ok(())
}
