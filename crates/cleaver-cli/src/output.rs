use std::io::Write;

use cleaver_core::{Confidence, DetectionResult, SignalKind};
use cleaver_split::{SplitFailure, SplitFile};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the per-page signal table and the detected document list.
pub fn print_detection_report(
    w: &mut dyn Write,
    file_name: &str,
    result: &DetectionResult,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(
            w,
            "{} {} ({} pages)",
            "Detecting documents in".bold(),
            file_name.bold(),
            result.page_count
        )?;
    } else {
        writeln!(
            w,
            "Detecting documents in {} ({} pages)",
            file_name, result.page_count
        )?;
    }
    writeln!(w)?;

    if result.is_scanned_pdf {
        let msg = "No extractable text on any page (scanned PDF?). \
                   Treating the whole file as a single document.";
        if color.enabled() {
            writeln!(w, "{}", msg.yellow())?;
        } else {
            writeln!(w, "{}", msg)?;
        }
        writeln!(w)?;
    }

    for page in &result.pages {
        let header = format!(
            "page {:>3}  score {:>4}  {}",
            page.page_index + 1,
            page.total_score,
            if page.is_boundary {
                "BOUNDARY"
            } else {
                "continuation"
            }
        );
        if color.enabled() {
            if page.is_boundary {
                writeln!(w, "{}", header.green())?;
            } else {
                writeln!(w, "{}", header.dimmed())?;
            }
        } else {
            writeln!(w, "{}", header)?;
        }
        for signal in &page.signals {
            // The scanned marker carries no score; show it bare.
            let line = if signal.kind == SignalKind::Scanned {
                format!("           {}", signal.label)
            } else {
                format!("     {:>+4}  {}", signal.score, signal.label)
            };
            if color.enabled() {
                writeln!(w, "{}", line.dimmed())?;
            } else {
                writeln!(w, "{}", line)?;
            }
        }
    }

    writeln!(w)?;
    if color.enabled() {
        writeln!(
            w,
            "{} {}",
            "Documents detected:".bold(),
            result.documents.len()
        )?;
    } else {
        writeln!(w, "Documents detected: {}", result.documents.len())?;
    }

    for document in &result.documents {
        let confidence = confidence_name(document.confidence);
        if color.enabled() {
            let tag = match document.confidence {
                Confidence::High => confidence.green().to_string(),
                Confidence::Medium => confidence.yellow().to_string(),
                Confidence::Low => confidence.red().to_string(),
            };
            writeln!(
                w,
                "  [{}] pages {}  ({} confidence)",
                document.index + 1,
                document.page_range,
                tag
            )?;
        } else {
            writeln!(
                w,
                "  [{}] pages {}  ({} confidence)",
                document.index + 1,
                document.page_range,
                confidence
            )?;
        }
    }

    Ok(())
}

/// Print the split summary: where each file landed, one reason per failure,
/// and the final counts.
pub fn print_split_summary(
    w: &mut dyn Write,
    files: &[(SplitFile, std::path::PathBuf)],
    failures: &[SplitFailure],
    color: ColorMode,
) -> std::io::Result<()> {
    for (file, final_path) in files {
        if color.enabled() {
            writeln!(
                w,
                "  {} pages {:<9} -> {}",
                "OK".green(),
                file.page_range,
                final_path.display()
            )?;
        } else {
            writeln!(
                w,
                "  OK pages {:<9} -> {}",
                file.page_range,
                final_path.display()
            )?;
        }
    }
    for failure in failures {
        if color.enabled() {
            writeln!(
                w,
                "  {} pages {:<9} {}",
                "FAILED".red(),
                failure.page_range,
                failure.error
            )?;
        } else {
            writeln!(
                w,
                "  FAILED pages {:<9} {}",
                failure.page_range,
                failure.error
            )?;
        }
    }

    writeln!(w)?;
    let summary = format!("{} succeeded, {} failed", files.len(), failures.len());
    if color.enabled() {
        if failures.is_empty() {
            writeln!(w, "{}", summary.green().bold())?;
        } else {
            writeln!(w, "{}", summary.yellow().bold())?;
        }
    } else {
        writeln!(w, "{}", summary)?;
    }
    Ok(())
}

fn confidence_name(confidence: Confidence) -> &'static str {
    match confidence {
        Confidence::High => "high",
        Confidence::Medium => "medium",
        Confidence::Low => "low",
    }
}
