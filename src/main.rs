//! manweave - render markdown documentation as HTML and a man page

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use manweave::{ManualMetadata, Result, convert, render_markdown};

#[derive(Parser)]
#[command(name = "manweave")]
#[command(about = "Render markdown as HTML and a man page", long_about = None)]
#[command(after_help = "EXAMPLES:
    manweave frob.md                  Write frob.html and frob.1
    manweave --section 5 frob.md      Write frob.html and frob.5
    manweave --program frob doc.md    Override the program name")]
struct Cli {
    /// Input markdown file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// HTML output path (default: input with .html)
    #[arg(long, value_name = "PATH")]
    html_out: Option<PathBuf>,

    /// Man page output path (default: input with .<section>)
    #[arg(long, value_name = "PATH")]
    man_out: Option<PathBuf>,

    /// Documented program name (default: input file stem)
    #[arg(long)]
    program: Option<String>,

    /// Manual section number
    #[arg(long, default_value = "1")]
    section: String,

    /// Document title (default: "<program> manual")
    #[arg(long)]
    title: Option<String>,

    /// Version string recorded in the page header
    #[arg(long, default_value = "unknown")]
    version: String,

    /// Install-path prefix recorded in the page header
    #[arg(long, default_value = "/usr/local")]
    prefix: String,

    /// Date string (default: input modification date)
    #[arg(long)]
    date: Option<String>,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let source = fs::read_to_string(&cli.input)?;

    let program = cli.program.clone().unwrap_or_else(|| {
        cli.input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unknown".to_string())
    });
    let date = cli
        .date
        .clone()
        .unwrap_or_else(|| modification_date(&cli.input));

    let mut meta = ManualMetadata::new(program, cli.section.clone())
        .with_date(date)
        .with_version(cli.version.clone())
        .with_prefix(cli.prefix.clone());
    if let Some(title) = &cli.title {
        meta = meta.with_title(title.clone());
    }

    let html_body = render_markdown(&source);
    let rendered = convert(&html_body, &meta)?;

    // Both documents exist before either file is written; a fatal
    // conversion error above leaves no partial output on disk.
    let html_path = cli
        .html_out
        .clone()
        .unwrap_or_else(|| cli.input.with_extension("html"));
    let man_path = cli
        .man_out
        .clone()
        .unwrap_or_else(|| cli.input.with_extension(&cli.section));
    fs::write(&html_path, &rendered.html)?;
    fs::write(&man_path, &rendered.troff)?;

    if !cli.quiet {
        println!("{} -> {}", cli.input.display(), html_path.display());
        println!("{} -> {}", cli.input.display(), man_path.display());
    }
    Ok(())
}

/// Format the input file's modification time for the page header.
fn modification_date(path: &Path) -> String {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .map(|t| {
            chrono::DateTime::<chrono::Local>::from(t)
                .format("%Y-%m-%d")
                .to_string()
        })
        .unwrap_or_else(|_| "unknown".to_string())
}
