use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use cleaver_core::PdfStructure;

mod output;

use output::ColorMode;

/// Split merged multi-document PDFs along detected document boundaries
#[derive(Parser, Debug)]
#[command(name = "cleaver", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Detect document boundaries and print the per-page evidence
    Detect {
        /// Path to the merged PDF
        file_path: PathBuf,

        /// Print the detection result as JSON
        #[arg(long)]
        json: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Detect boundaries (or take manual ranges) and cut the PDF apart
    Split {
        /// Path to the merged PDF
        file_path: PathBuf,

        /// Manual page ranges, e.g. "1-3,4-6,7" (skips detection)
        #[arg(long)]
        ranges: Option<String>,

        /// Directory to place the split files in (default: alongside the source)
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Print the split result as JSON
        #[arg(long)]
        json: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Detect {
            file_path,
            json,
            no_color,
        } => detect(file_path, json, no_color),
        Command::Split {
            file_path,
            ranges,
            out_dir,
            json,
            no_color,
        } => split(file_path, ranges, out_dir, json, no_color),
    }
}

fn detect(file_path: PathBuf, json: bool, no_color: bool) -> anyhow::Result<()> {
    if !file_path.exists() {
        anyhow::bail!("File not found: {}", file_path.display());
    }

    let backend = cleaver_pdf_lopdf::LopdfStructure::open(&file_path)?;
    let result = cleaver_detect::detect_documents(&backend)?;

    let mut writer = std::io::stdout();
    if json {
        serde_json::to_writer_pretty(&mut writer, &result)?;
        writeln!(writer)?;
        return Ok(());
    }

    let color = ColorMode(!no_color);
    let file_name = display_name(&file_path);
    output::print_detection_report(&mut writer, &file_name, &result, color)?;
    Ok(())
}

fn split(
    file_path: PathBuf,
    ranges: Option<String>,
    out_dir: Option<PathBuf>,
    json: bool,
    no_color: bool,
) -> anyhow::Result<()> {
    if !file_path.exists() {
        anyhow::bail!("File not found: {}", file_path.display());
    }

    let backend = cleaver_pdf_lopdf::LopdfStructure::open(&file_path)?;
    let color = ColorMode(!no_color && !json);
    let mut writer = std::io::stdout();

    let documents = match ranges {
        Some(ref spec) => cleaver_detect::parse_page_ranges(spec, backend.page_count())?,
        None => {
            let result = cleaver_detect::detect_documents(&backend)?;
            if result.is_scanned_pdf && !json {
                let msg = "No extractable text on any page (scanned PDF?). \
                           Keeping the file whole.";
                if color.enabled() {
                    use owo_colors::OwoColorize;
                    writeln!(writer, "{}", msg.yellow())?;
                } else {
                    writeln!(writer, "{}", msg)?;
                }
            }
            result.documents
        }
    };

    if documents.is_empty() {
        anyhow::bail!("Nothing to split: {} has no pages", file_path.display());
    }

    let out_dir = match out_dir {
        Some(dir) => dir,
        None => file_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    std::fs::create_dir_all(&out_dir)?;

    let outcome = cleaver_split::split_documents(&file_path, &documents)?;
    let mut failures = outcome.failures.clone();

    // Move each cut file out of the working directory before it is cleaned
    // up. A file that cannot be moved counts as a failure for that range,
    // not a fatal error.
    let mut moved = Vec::new();
    for file in &outcome.files {
        let final_path = out_dir.join(&file.file_name);
        match move_file(&file.path, &final_path) {
            Ok(()) => moved.push((file.clone(), final_path)),
            Err(e) => failures.push(cleaver_split::SplitFailure {
                index: file.index,
                page_range: file.page_range.clone(),
                error: format!("could not move to {}: {}", final_path.display(), e),
            }),
        }
    }
    failures.sort_by_key(|f| f.index);

    if json {
        let report = serde_json::json!({
            "source": file_path,
            "out_dir": out_dir,
            "files": moved
                .iter()
                .map(|(file, final_path)| {
                    serde_json::json!({
                        "index": file.index,
                        "page_range": file.page_range,
                        "path": final_path,
                    })
                })
                .collect::<Vec<_>>(),
            "failures": failures,
            "succeeded": moved.len(),
            "failed": failures.len(),
        });
        serde_json::to_writer_pretty(&mut writer, &report)?;
        writeln!(writer)?;
        return Ok(());
    }

    output::print_split_summary(&mut writer, &moved, &failures, color)?;
    Ok(())
}

/// Rename, falling back to copy-and-delete when the destination is on a
/// different filesystem than the temp directory.
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    std::fs::copy(from, to)?;
    std::fs::remove_file(from)?;
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
