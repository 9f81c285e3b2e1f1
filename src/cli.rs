//! Command-line interface for suture.
//!
//! The CLI is a thin binding layer: it validates and marshals arguments,
//! then delegates to the library. All extraction output is JSON on stdout.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::dialect::Dialect;
use crate::error::Error;
use crate::span::SourceSpan;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Fact extraction and span-addressed source patching for automated program
/// repair.
///
/// `extract` walks a parsed translation unit and prints its facts as JSON;
/// `transform` replaces a line/column span of a source file in place.
#[derive(Parser)]
#[command(name = "suture")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract scope-attributed facts from a source file
    Extract(ExtractArgs),
    /// Replace a span of a source file with new text
    Transform(TransformArgs),
}

/// Arguments for the extract command.
#[derive(Parser)]
pub struct ExtractArgs {
    /// Source file to extract from
    pub path: PathBuf,

    /// Dialect to parse under: c or cpp
    #[arg(short, long, default_value = "c")]
    pub dialect: String,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Arguments for the transform command.
#[derive(Parser)]
pub struct TransformArgs {
    /// Source file to patch in place
    pub path: PathBuf,

    /// Dialect to parse under: c or cpp
    #[arg(short, long, default_value = "c")]
    pub dialect: String,

    /// Start line of the span (1-indexed)
    #[arg(long)]
    pub start_line: usize,

    /// Start column of the span (1-indexed)
    #[arg(long)]
    pub start_col: usize,

    /// End line of the span (1-indexed)
    #[arg(long)]
    pub end_line: usize,

    /// End column of the span (1-indexed, one past the last character)
    #[arg(long)]
    pub end_col: usize,

    /// Replacement text (may be empty to delete the span)
    #[arg(short, long)]
    pub replacement: String,
}

fn parse_dialect(raw: &str) -> Option<Dialect> {
    match raw.parse() {
        Ok(dialect) => Some(dialect),
        Err(message) => {
            eprintln!("Error: {}", message);
            None
        }
    }
}

/// Run the extract command.
pub fn run_extract(args: &ExtractArgs) -> anyhow::Result<i32> {
    let Some(dialect) = parse_dialect(&args.dialect) else {
        return Ok(EXIT_ERROR);
    };

    let store = match crate::extract_ast(&args.path, dialect) {
        Ok(store) => store,
        Err(Error::Parse { diagnostics }) => {
            eprintln!("Error: {} does not parse as {}", args.path.display(), dialect);
            for diagnostic in &diagnostics {
                eprintln!("  {}: {}", diagnostic.span, diagnostic.message);
            }
            return Ok(EXIT_FAILED);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let json = if args.pretty {
        store.to_json_pretty()?
    } else {
        store.to_json()?
    };
    println!("{}", json);

    Ok(EXIT_SUCCESS)
}

/// Run the transform command.
pub fn run_transform(args: &TransformArgs) -> anyhow::Result<i32> {
    let Some(dialect) = parse_dialect(&args.dialect) else {
        return Ok(EXIT_ERROR);
    };

    let span = match SourceSpan::new(args.start_line, args.start_col, args.end_line, args.end_col)
    {
        Ok(span) => span,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_FAILED);
        }
    };

    match crate::transform(&args.path, dialect, span, &args.replacement) {
        Ok(()) => Ok(EXIT_SUCCESS),
        Err(e @ (Error::Parse { .. } | Error::InvalidLocation { .. })) => {
            eprintln!("Error: {}", e);
            Ok(EXIT_FAILED)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Ok(EXIT_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_extract() {
        let cli = Cli::try_parse_from(["suture", "extract", "prog.c", "--dialect", "cpp"]).unwrap();
        match cli.command {
            Commands::Extract(args) => {
                assert_eq!(args.path, PathBuf::from("prog.c"));
                assert_eq!(args.dialect, "cpp");
                assert!(!args.pretty);
            }
            _ => panic!("expected extract"),
        }
    }

    #[test]
    fn cli_parses_transform() {
        let cli = Cli::try_parse_from([
            "suture",
            "transform",
            "prog.c",
            "--start-line",
            "3",
            "--start-col",
            "1",
            "--end-line",
            "3",
            "--end-col",
            "10",
            "--replacement",
            "int x;",
        ])
        .unwrap();
        match cli.command {
            Commands::Transform(args) => {
                assert_eq!(args.start_line, 3);
                assert_eq!(args.end_col, 10);
                assert_eq!(args.replacement, "int x;");
            }
            _ => panic!("expected transform"),
        }
    }

    #[test]
    fn transform_requires_full_span() {
        let result = Cli::try_parse_from(["suture", "transform", "prog.c", "--start-line", "3"]);
        assert!(result.is_err());
    }
}
