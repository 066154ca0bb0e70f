//! Output formatting for scan reports
//!
//! Reports can be rendered as JSON, YAML or human-readable text. JSON and
//! YAML carry the full report; the human format lists project directories
//! relative to the workspace root.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use crate::detection::boundary::relative_path;
use crate::detection::types::{Ecosystem, Project};
use crate::detection::{ScanReport, WorkspaceRoot};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format (human-friendly, version-control friendly)
    Yaml,
    /// Human-readable formatted text
    Human,
}

/// Serialized shape of `detect` output
#[derive(Debug, Serialize)]
pub struct DetectOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker_file: Option<&'a Path>,
    #[serde(flatten)]
    pub report: &'a ScanReport,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a scan report, with the marker file that decided its root if any
    pub fn format(&self, report: &ScanReport, workspace: Option<&WorkspaceRoot>) -> Result<String> {
        let output = DetectOutput {
            marker_file: workspace.and_then(|w| w.marker_file.as_deref()),
            report,
        };

        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&output)
                .context("Failed to serialize scan report to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(&output).context("Failed to serialize scan report to YAML")
            }
            OutputFormat::Human => Ok(self.format_human(&output)),
        }
    }

    pub fn format_root(&self, workspace: &WorkspaceRoot) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(workspace)
                .context("Failed to serialize workspace root to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(workspace)
                .context("Failed to serialize workspace root to YAML"),
            OutputFormat::Human => Ok(format!("{}\n", workspace.root.display())),
        }
    }

    fn format_human(&self, output: &DetectOutput<'_>) -> String {
        let report = output.report;
        let mut out = String::new();

        if report.cancelled {
            out.push_str("\u{26A0} Project Scan (Cancelled)\n");
        } else {
            out.push_str("\u{2713} Project Scan\n");
        }
        out.push_str(RULE);
        out.push_str("\n\n");

        out.push_str(&format!("Root:    {}\n", report.root.display()));
        match output.marker_file {
            Some(marker) => out.push_str(&format!("Marker:  {}\n\n", marker.display())),
            None => out.push('\n'),
        }

        if report.projects.is_empty() {
            out.push_str("No projects found\n");
        }

        for ecosystem in Ecosystem::all() {
            let projects = report.projects.for_ecosystem(*ecosystem);
            if projects.is_empty() {
                continue;
            }

            out.push_str(&format!("{} ({}):\n", ecosystem, projects.len()));
            for (i, project) in projects.iter().enumerate() {
                let connector = if i == projects.len() - 1 {
                    "\u{2514}\u{2500}"
                } else {
                    "\u{251C}\u{2500}"
                };
                out.push_str(&format!(
                    "{} {}  [{}]  {}\n",
                    connector,
                    display_relative(&report.root, &project.dir),
                    project.package_manager,
                    manifest_name(project)
                ));
            }
            out.push('\n');
        }

        if !report.warnings.is_empty() {
            out.push_str("\u{26A0} Warnings:\n");
            for warning in &report.warnings {
                out.push_str(&format!(
                    "  - {}: {}\n",
                    display_relative(&report.root, &warning.path),
                    warning.message
                ));
            }
            out.push('\n');
        }

        out.push_str(&format!(
            "Scanned {} directories in {}ms\n",
            report.directories_visited, report.scan_time_ms
        ));

        out
    }
}

fn display_relative(root: &Path, path: &Path) -> String {
    relative_path(root, path)
        .map(|rel| rel.display().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn manifest_name(project: &Project) -> String {
    project
        .manifest_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
