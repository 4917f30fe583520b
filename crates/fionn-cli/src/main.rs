// SPDX-License-Identifier: MIT OR Apache-2.0
//! fionn CLI binary - a SIMD-accelerated JSON parser front end.

use clap::{Parser, Subcommand};
use fionn_core::ParserConfig;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "fionn")]
#[command(version, about, long_about = None)]
struct Args {
    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Subcommands for the fionn CLI.
#[derive(Subcommand)]
enum Commands {
    /// Parse JSON and print the materialized value (debug form).
    Parse {
        /// Input file (reads from stdin if not provided)
        file: Option<PathBuf>,

        /// Allow trailing commas before `}`/`]`
        #[arg(long)]
        allow_trailing_comma: bool,

        /// Allow `//` and `/* */` comments
        #[arg(long)]
        allow_comments: bool,

        /// Maximum container nesting depth
        #[arg(long, default_value_t = ParserConfig::DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },
    /// Validate JSON without materializing a value tree.
    Validate {
        /// Input file (reads from stdin if not provided)
        file: Option<PathBuf>,
    },
    /// Pretty-print or compact-format JSON.
    Format {
        /// Input file (reads from stdin if not provided)
        file: Option<PathBuf>,

        /// Compact (single-line) output
        #[arg(short = 'c', long = "compact")]
        compact: bool,

        /// Indentation width for pretty output
        #[arg(short = 'i', long = "indent", default_value_t = 2)]
        indent: usize,
    },
    /// Resolve an RFC 6901 JSON Pointer against a document, lazily.
    Pointer {
        /// The JSON Pointer, e.g. `/a/b/0`
        pointer: String,

        /// Input file (reads from stdin if not provided)
        file: Option<PathBuf>,
    },
    /// Benchmark the tape parser against `serde_json` on repeated input.
    Bench {
        /// Input file (reads from stdin if not provided)
        file: Option<PathBuf>,

        /// Number of parse iterations
        #[arg(long, default_value_t = 200)]
        iterations: usize,
    },
}

fn main() {
    let args = Args::parse();
    let result = match &args.command {
        Commands::Parse { file, allow_trailing_comma, allow_comments, max_depth } => {
            run_parse(file.as_ref(), *allow_trailing_comma, *allow_comments, *max_depth, args.output.as_ref())
        }
        Commands::Validate { file } => run_validate(file.as_ref()),
        Commands::Format { file, compact, indent } => {
            run_format(file.as_ref(), *compact, *indent, args.output.as_ref())
        }
        Commands::Pointer { pointer, file } => run_pointer(pointer, file.as_ref(), args.output.as_ref()),
        Commands::Bench { file, iterations } => run_bench(file.as_ref(), *iterations),
    };
    if let Err(err) = result {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run_parse(
    file: Option<&PathBuf>,
    allow_trailing_comma: bool,
    allow_comments: bool,
    max_depth: usize,
    output: Option<&PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = read_input(file)?;
    let config = ParserConfig { max_depth, allow_trailing_comma, allow_comments };
    let value = if config.needs_permissive_parser() {
        fionn_tape::parse_with_config(&bytes, &config)?
    } else {
        fionn_tape::parse(&bytes)?
    };
    write_output(&format!("{value:#?}\n"), output)
}

fn run_validate(file: Option<&PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = read_input(file)?;
    fionn_tape::parse_lazy(&bytes)?;
    println!("JSON is valid");
    Ok(())
}

fn run_format(
    file: Option<&PathBuf>,
    compact: bool,
    indent: usize,
    output: Option<&PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = read_input(file)?;
    let value = fionn_tape::parse(&bytes)?;
    let rendered = if compact {
        serde_json::to_string(&value)?
    } else {
        let indent_str = " ".repeat(indent);
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent_str.as_bytes());
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        serde::Serialize::serialize(&value, &mut ser)?;
        String::from_utf8(buf)?
    };
    write_output(&format!("{rendered}\n"), output)
}

fn run_pointer(
    pointer: &str,
    file: Option<&PathBuf>,
    output: Option<&PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = read_input(file)?;
    let doc = fionn_tape::parse_lazy(&bytes)?;
    let found = fionn_tape::pointer::resolve(doc.root(), pointer)?;
    if found.is_missing() {
        write_output("null\n", output)?;
        return Ok(());
    }
    let rendered = if let Some(s) = found.as_str() {
        format!("{s:?}\n")
    } else if let Some(i) = found.as_i64() {
        format!("{i}\n")
    } else if let Some(f) = found.as_f64() {
        format!("{f}\n")
    } else if let Some(b) = found.as_bool() {
        format!("{b}\n")
    } else if found.is_null() {
        "null\n".to_string()
    } else {
        format!("<{} entries>\n", found.len())
    };
    write_output(&rendered, output)
}

fn run_bench(file: Option<&PathBuf>, iterations: usize) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = read_input(file)?;

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = fionn_tape::parse(&bytes)?;
    }
    let fionn_elapsed = start.elapsed();

    let start = Instant::now();
    for _ in 0..iterations {
        let _: serde_json::Value = serde_json::from_slice(&bytes)?;
    }
    let serde_elapsed = start.elapsed();

    println!("fionn:      {iterations} parses in {fionn_elapsed:?}");
    println!("serde_json: {iterations} parses in {serde_elapsed:?}");
    Ok(())
}

fn read_input(path: Option<&PathBuf>) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    if let Some(p) = path {
        Ok(fs::read(p)?)
    } else {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    }
}

fn write_output(text: &str, output: Option<&PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, text)?;
    } else {
        io::stdout().lock().write_all(text.as_bytes())?;
    }
    Ok(())
}
