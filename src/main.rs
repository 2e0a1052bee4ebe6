//! casava CLI - read CSV files of unknown format and write them back normalized

use casava::{Bias, Detection, ReaderBuilder, SampleSize};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Streaming CSV reader with encoding, line ending and delimiter detection.
///
/// Detects the format of each file and writes its rows to stdout as
/// comma-delimited, LF-terminated UTF-8 CSV.
#[derive(Parser, Debug)]
#[command(name = "casava")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input CSV file(s) to read
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Number of bytes sampled for encoding and line ending detection
    #[arg(long, default_value = "10240")]
    enc_detection_size: usize,

    /// Number of lines sampled for delimiter detection
    #[arg(short = 'n', long, default_value = "1024")]
    sep_detection_lines: usize,

    /// Number of bytes of lines sampled for delimiter detection (overrides --sep-detection-lines)
    #[arg(short = 'b', long)]
    sep_detection_bytes: Option<usize>,

    /// Size of the chunks read from each file
    #[arg(long, default_value = "8192")]
    chunk_size: usize,

    /// Detection strategy
    #[arg(short = 's', long, default_value = "variance")]
    strategy: Strategy,

    /// Force specific delimiter (single character)
    #[arg(short = 'd', long)]
    delimiter: Option<char>,

    /// Force specific encoding (WHATWG label, e.g. utf-8, latin1, utf-16le)
    #[arg(short = 'e', long)]
    encoding: Option<String>,

    /// Only output the detected dialect
    #[arg(long)]
    dialect_only: bool,

    /// Log detection details to stderr
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum Strategy {
    Variance,
    Uniformity,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut exit_code = ExitCode::SUCCESS;

    for file in &args.files {
        if let Err(e) = read_file(file, &args) {
            eprintln!("Error processing {}: {}", file.display(), e);
            exit_code = ExitCode::FAILURE;
        }
    }

    exit_code
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .try_init();
}

fn read_file(path: &PathBuf, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = ReaderBuilder::new();

    builder
        .enc_detection_size(args.enc_detection_size)
        .chunk_size(args.chunk_size);

    // Configure sample size
    if let Some(bytes) = args.sep_detection_bytes {
        builder.sep_detection_size(SampleSize::Bytes(bytes));
    } else {
        builder.sep_detection_size(SampleSize::Lines(args.sep_detection_lines));
    }

    match args.strategy {
        Strategy::Variance => builder.detection(Detection::Variance(Bias::default())),
        Strategy::Uniformity => builder.detection(Detection::Uniformity),
    };

    // Configure forced delimiter
    if let Some(delim) = args.delimiter {
        if !delim.is_ascii() {
            return Err(format!("delimiter must be an ASCII character: {delim:?}").into());
        }
        builder.delimiter(delim as u8);
    }

    // Configure forced encoding
    if let Some(ref label) = args.encoding {
        let encoding = encoding_rs::Encoding::for_label(label.as_bytes())
            .ok_or_else(|| format!("unknown encoding label: {label}"))?;
        builder.encoding(encoding);
    }

    let mut reader = builder.from_path(path)?;

    if args.dialect_only {
        let dialect = reader.dialect();
        println!("File: {}", path.display());
        println!("  Encoding: {}", dialect.encoding_name().unwrap_or("unknown"));
        println!("  Line terminator: {}", dialect.line_terminator);
        println!("  Delimiter: {:?}", dialect.delimiter as char);
        println!();
        return Ok(());
    }

    let stdout = io::stdout();
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(stdout.lock());

    for row in reader {
        writer.write_record(&row?)?;
    }
    writer.flush()?;

    Ok(())
}
