//! C- syntax checker
//!
//! Usage: cminus [OPTIONS] <input>

use anyhow::Context;
use clap::{Parser as ClapParser, ValueEnum};
use cminus::common::DiagnosticReporter;
use cminus::driver::{CheckConfig, check_source};
use cminus::parser::DEFAULT_MAX_DEPTH;
use codespan_reporting::term::termcolor::ColorChoice;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

/// When to color diagnostics
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Default)]
enum Color {
    /// Color when stderr is a terminal
    #[default]
    Auto,
    Always,
    Never,
}

impl From<Color> for ColorChoice {
    fn from(color: Color) -> Self {
        match color {
            Color::Auto => ColorChoice::Auto,
            Color::Always => ColorChoice::Always,
            Color::Never => ColorChoice::Never,
        }
    }
}

#[derive(ClapParser, Debug)]
#[command(name = "cminus")]
#[command(author = "C- Toolchain Team")]
#[command(version)]
#[command(about = "Lexer and LL(1) syntax checker for the C- language", long_about = None)]
struct Args {
    /// Input source file, or `-` to read standard input
    #[arg(required = true)]
    input: PathBuf,

    /// Print every token before parsing
    #[arg(long)]
    dump_tokens: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Maximum statement/expression nesting depth
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Colorize diagnostics
    #[arg(long, value_enum, default_value = "auto")]
    color: Color,
}

fn main() {
    let args = Args::parse();

    match run(&args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("error: {e:#}");
            process::exit(1);
        }
    }
}

fn read_source(input: &Path) -> anyhow::Result<(String, String)> {
    if input.as_os_str() == "-" {
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .context("failed to read standard input")?;
        return Ok(("<stdin>".to_string(), source));
    }

    let source = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    Ok((input.display().to_string(), source))
}

/// Check one input; `Ok(false)` means the program has errors
fn run(args: &Args) -> anyhow::Result<bool> {
    let (filename, source) = read_source(&args.input)?;

    let mut reporter = DiagnosticReporter::with_color(args.color.into());
    let file_id = reporter.add_file(&filename, &source);

    if args.verbose {
        eprintln!("Checking {filename}");
    }

    let config = CheckConfig {
        dump_tokens: args.dump_tokens,
        verbose: args.verbose,
        max_depth: args.max_depth,
    };
    let report = check_source(&source, &config);

    report.report(&reporter, file_id);

    if report.is_valid() {
        println!("{filename}: syntactically valid");
    } else {
        println!("{filename}: {} error(s)", report.error_count());
    }

    Ok(report.is_valid())
}
