//! CLI wrapper around the report pipeline
//!
//! Binds the asset lookup to a directory on disk and writes the PDF
//! next to the input unless told otherwise.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;

use task_report_pdf::{generate, DirLookup};

#[derive(Parser)]
#[command(
    name = "taskreport",
    about = "Generate a PDF report from recorded app-testing task data"
)]
struct Args {
    /// Path to the input JSON file
    input: PathBuf,

    /// Path for the output PDF (default: <input stem>_report.pdf)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory containing the referenced screenshots
    /// (default: the input file's directory)
    #[arg(short, long)]
    images: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let raw = std::fs::read(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;

    let images_dir = args
        .images
        .clone()
        .or_else(|| args.input.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));
    let lookup = DirLookup::new(images_dir);

    let artifact = generate(&raw, &lookup)
        .with_context(|| format!("generating report from {}", args.input.display()))?;

    for warning in &artifact.warnings {
        eprintln!("warning: screenshot {}: {}", warning.path, warning.reason);
    }

    let output = args.output.unwrap_or_else(|| default_output(&args.input));
    std::fs::write(&output, &artifact.pdf)
        .with_context(|| format!("writing {}", output.display()))?;
    println!("PDF report created: {}", output.display());
    Ok(())
}

fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("tasks");
    PathBuf::from(format!("{stem}_report.pdf"))
}
