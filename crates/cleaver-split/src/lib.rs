//! Split executor: cuts each detected document's page range into its own
//! file with qpdf, tolerating per-document failures.
//!
//! The batch only fails as a whole when qpdf itself is unavailable or the
//! working directory cannot be created; a single range that will not cut
//! (corrupt region, bad xref) becomes a [`SplitFailure`] and the remaining
//! ranges are still attempted. The same partial-failure policy applies
//! downstream where the resulting files are consumed one by one.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use cleaver_core::DetectedDocument;

pub mod cleanup;

pub use cleanup::{WorkDir, cleanup_dir};

#[derive(Error, Debug)]
pub enum SplitError {
    #[error("qpdf not found on PATH. Install it first: {0}")]
    ToolMissing(&'static str),
    #[error("source file has no usable name: {}", .0.display())]
    BadSourcePath(PathBuf),
    #[error("failed to create working directory: {0}")]
    WorkDirError(#[from] std::io::Error),
}

/// One successfully cut document.
#[derive(Debug, Clone, Serialize)]
pub struct SplitFile {
    pub index: usize,
    pub page_range: String,
    pub path: PathBuf,
    pub file_name: String,
}

/// One document whose page range could not be cut.
#[derive(Debug, Clone, Serialize)]
pub struct SplitFailure {
    pub index: usize,
    pub page_range: String,
    pub error: String,
}

/// Outcome of a split batch. Exactly one of `files`/`failures` holds an
/// entry for every requested document.
///
/// The receiver exclusively owns `work_dir`; dropping the outcome (or
/// calling [`WorkDir::cleanup`]) removes the directory and everything in
/// it, so file contents must be read or moved out first.
#[derive(Debug)]
pub struct SplitOutcome {
    pub work_dir: WorkDir,
    pub files: Vec<SplitFile>,
    pub failures: Vec<SplitFailure>,
}

fn install_hint() -> &'static str {
    if cfg!(target_os = "macos") {
        "brew install qpdf"
    } else if cfg!(target_os = "windows") {
        "winget install qpdf (or download from https://qpdf.sourceforge.io)"
    } else {
        "apt install qpdf / dnf install qpdf"
    }
}

static QPDF_AVAILABLE: OnceLock<bool> = OnceLock::new();

/// One-time, process-wide availability probe for the cutting tool.
fn ensure_tool_available() -> Result<(), SplitError> {
    let available = *QPDF_AVAILABLE.get_or_init(|| {
        match Command::new("qpdf").arg("--version").output() {
            Ok(output) if output.status.success() => {
                let version = String::from_utf8_lossy(&output.stdout);
                debug!(version = version.lines().next().unwrap_or(""), "qpdf found");
                true
            }
            _ => false,
        }
    });
    if available {
        Ok(())
    } else {
        Err(SplitError::ToolMissing(install_hint()))
    }
}

/// Base name for output files: the source filename with its extension and
/// any embedded `:password` credential marker stripped.
fn source_base_name(source: &Path) -> Result<String, SplitError> {
    let file_name = source
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| SplitError::BadSourcePath(source.to_path_buf()))?;
    let without_credential = match file_name.split_once(':') {
        Some((name, _)) => name,
        None => file_name,
    };
    let base = Path::new(without_credential)
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| SplitError::BadSourcePath(source.to_path_buf()))?;
    Ok(base.to_string())
}

/// Cut every document's page range out of `source` into a fresh working
/// directory, strictly in index order.
///
/// Fails up front when qpdf is missing; after that, per-document failures
/// are recorded and never abort the batch.
pub fn split_documents(
    source: &Path,
    documents: &[DetectedDocument],
) -> Result<SplitOutcome, SplitError> {
    ensure_tool_available()?;

    let base_name = source_base_name(source)?;
    let work_dir = WorkDir::create()?;
    info!(
        source = %source.display(),
        documents = documents.len(),
        dir = %work_dir.path().display(),
        "splitting"
    );

    let (files, failures) = run_batch(&base_name, work_dir.path(), documents, |range, dest| {
        cut_range(source, range, dest)
    });

    Ok(SplitOutcome {
        work_dir,
        files,
        failures,
    })
}

/// Attempt every document with the given cutter, in index order, recording
/// each outcome. Never aborts early.
fn run_batch(
    base_name: &str,
    dir: &Path,
    documents: &[DetectedDocument],
    mut cut: impl FnMut(&str, &Path) -> Result<(), String>,
) -> (Vec<SplitFile>, Vec<SplitFailure>) {
    let mut files = Vec::new();
    let mut failures = Vec::new();

    for document in documents {
        let file_name = format!("{}_{}.pdf", base_name, document.index + 1);
        let dest = dir.join(&file_name);

        match cut(&document.page_range, &dest) {
            Ok(()) => {
                debug!(range = %document.page_range, file = %file_name, "cut");
                files.push(SplitFile {
                    index: document.index,
                    page_range: document.page_range.clone(),
                    path: dest,
                    file_name,
                });
            }
            Err(error) => {
                warn!(range = %document.page_range, %error, "failed to cut range");
                failures.push(SplitFailure {
                    index: document.index,
                    page_range: document.page_range.clone(),
                    error,
                });
            }
        }
    }

    (files, failures)
}

/// Run one qpdf extraction. The range spec is passed as a single argument,
/// never through a shell.
fn cut_range(source: &Path, page_range: &str, dest: &Path) -> Result<(), String> {
    let output = Command::new("qpdf")
        .arg("--empty")
        .arg("--pages")
        .arg(source)
        .arg(page_range)
        .arg("--")
        .arg(dest)
        .output()
        .map_err(|e| format!("failed to run qpdf: {e}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "qpdf exited with {}: {}",
            output.status,
            stderr.trim()
        ));
    }
    if !dest.exists() {
        return Err("qpdf reported success but produced no file".to_string());
    }
    Ok(())
}
