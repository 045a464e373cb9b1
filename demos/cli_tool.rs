//! CLI Tool Example
//!
//! This example demonstrates how to build a command-line tool
//! using surveymd for converting survey workbooks to Markdown transcripts.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example cli_tool -- responses.xlsx feedback.xlsx --separate --out-dir out/
//! RUST_LOG=surveymd=debug cargo run --example cli_tool -- responses.xlsx
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

use surveymd::{
    DownloadArtifact, LocalFile, OutputMode, PipelineBuilder, Session, SurveyMdError,
    UploadStatus,
};
use tracing_subscriber::EnvFilter;

struct Options {
    inputs: Vec<PathBuf>,
    mode: OutputMode,
    out_dir: PathBuf,
    zip: bool,
    preview: bool,
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <input.xlsx>... [options]", program);
    eprintln!("\nOptions:");
    eprintln!("  --mode <combined|separate>  Output mode (default: combined)");
    eprintln!("  --separate                  Shorthand for --mode separate");
    eprintln!("  --out-dir <dir>             Directory for the generated files (default: .)");
    eprintln!("  --zip                       Bundle multiple documents into one archive");
    eprintln!("  --preview                   Print a preview of each workbook's first sheet");
    eprintln!("\nExamples:");
    eprintln!("  {} survey.xlsx", program);
    eprintln!("  {} a.xlsx b.xlsx --separate --zip --out-dir out", program);
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut options = Options {
        inputs: Vec::new(),
        mode: OutputMode::Combined,
        out_dir: PathBuf::from("."),
        zip: false,
        preview: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--mode" => {
                let value = args.get(i + 1).ok_or("--mode requires a value")?;
                options.mode = OutputMode::parse(value)
                    .ok_or_else(|| format!("Invalid output mode: {}", value))?;
                i += 2;
            }
            "--separate" => {
                options.mode = OutputMode::Separate;
                i += 1;
            }
            "--out-dir" => {
                let value = args.get(i + 1).ok_or("--out-dir requires a value")?;
                options.out_dir = PathBuf::from(value);
                i += 2;
            }
            "--zip" => {
                options.zip = true;
                i += 1;
            }
            "--preview" => {
                options.preview = true;
                i += 1;
            }
            flag if flag.starts_with("--") => return Err(format!("Unknown option: {}", flag)),
            path => {
                options.inputs.push(PathBuf::from(path));
                i += 1;
            }
        }
    }

    if options.inputs.is_empty() {
        return Err("No input files given".to_string());
    }
    Ok(options)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}\n", message);
            print_usage(&args[0]);
            process::exit(1);
        }
    };

    if let Err(e) = run(&options) {
        handle_error(e);
        process::exit(1);
    }
}

fn run(options: &Options) -> Result<(), SurveyMdError> {
    let mut session = Session::new(PipelineBuilder::new().build()?);
    session.set_output_mode(options.mode);

    let mut sources = Vec::new();
    for path in &options.inputs {
        match LocalFile::open(path) {
            Ok(file) => sources.push(file),
            Err(e) => eprintln!("Skipping {}: {}", path.display(), e),
        }
    }

    session.add_files_with(sources, |event| {
        match event.upload.status() {
            UploadStatus::Error(error) => {
                eprintln!("  {} failed: {}", event.upload.name(), error)
            }
            _ => eprintln!("  {} ({})", event.upload.name(), event.upload.size_label()),
        }
        eprintln!("{}", event.progress);
    })?;

    if options.preview {
        print_previews(&mut session)?;
    }

    if !session.has_success() {
        eprintln!("No workbooks were converted.");
        return Ok(());
    }

    fs::create_dir_all(&options.out_dir)?;
    if options.zip {
        if let Some(artifact) = session.download()? {
            write_file(&options.out_dir, artifact.filename(), artifact.bytes())?;
            if let DownloadArtifact::Markdown(_) = artifact {
                eprintln!("Only one document was produced; wrote it without an archive.");
            }
        }
    } else {
        for document in session.convert() {
            write_file(&options.out_dir, &document.filename, document.content.as_bytes())?;
        }
    }

    Ok(())
}

fn print_previews(session: &mut Session) -> Result<(), SurveyMdError> {
    let ids: Vec<_> = session
        .uploads()
        .iter()
        .filter(|u| u.is_success())
        .map(|u| u.id())
        .collect();

    for id in ids {
        session.toggle_preview(id);
        if let Some((_, sheet)) = session.preview_selection() {
            println!("== {} ==", sheet);
        }
        match session.preview() {
            Some(preview) => println!("{}", preview.to_markdown()?),
            None => println!("No data to preview\n"),
        }
        session.toggle_preview(id);
    }

    Ok(())
}

fn write_file(dir: &Path, filename: &str, bytes: &[u8]) -> Result<(), SurveyMdError> {
    let path = dir.join(filename);
    fs::write(&path, bytes)?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn handle_error(error: SurveyMdError) {
    match error {
        SurveyMdError::Io(io_err) => {
            eprintln!("I/O Error: {}", io_err);
            eprintln!("Please check that the output directory is writable.");
        }
        SurveyMdError::Config(msg) => {
            eprintln!("Configuration Error: {}", msg);
        }
        other => eprintln!("Error: {}", other),
    }
}
