#![forbid(unsafe_code)]

//! Keymark CLI - extract inline keyword markup from metadata text.
//!
//! # Commands
//!
//! - `clean`: print the display text with keyword syntax stripped
//! - `parse`: parse one text blob and output its keyword map as JSON
//! - `scan`: build the full keyword store from an application graph JSON
//! - `lookup`: query one entity/keyword pair out of a graph

use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use km_core::{AppGraph, KeywordMap, ParsedKeyword};
use km_parser::{clean_up_content, clean_up_keywords, get_keywords, get_keywords_from_content};
use km_store::build_store;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Keymark CLI - extract inline keyword markup from metadata text.
#[derive(Debug, Parser)]
#[command(
    name = "keymark",
    version,
    about = "Extract inline keyword markup from metadata text",
    long_about = "Parses inline keyword declarations (_name=[a,b],[c]) out of view\n\
        titles, descriptions, rich-text content, and field descriptions, and\n\
        builds the per-entity keyword store that downstream features query."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging (can be repeated for more detail: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the display text with keyword syntax stripped.
    Clean {
        /// Input file path or "-" for stdin. If omitted, reads from stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Treat the input as rich-text HTML content
        #[arg(long)]
        content: bool,

        /// Output file path. If omitted, writes to stdout.
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Parse one text blob and output its keyword map as JSON.
    Parse {
        /// Input file path or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Treat the input as rich-text HTML content
        #[arg(long)]
        content: bool,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Output file path. If omitted, writes to stdout.
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Build the keyword store from an application graph JSON file.
    Scan {
        /// Graph JSON file path or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Include the display-text rewrites in the output
        #[arg(long)]
        rewrites: bool,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Output file path. If omitted, writes to stdout.
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Look up all records for one entity/keyword pair in a graph.
    Lookup {
        /// Graph JSON file path or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Entity key (view, field, scene, or composite report-cell key)
        #[arg(short, long)]
        entity: String,

        /// Keyword name, e.g. _dr (matched case-insensitively)
        #[arg(short, long)]
        keyword: String,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Output file path. If omitted, writes to stdout.
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Result of parsing one text blob.
#[derive(Debug, Serialize)]
struct ParseOutput {
    cleaned: String,
    keywords: KeywordMap,
    keyword_count: usize,
}

/// Result of scanning a graph.
#[derive(Debug, Serialize)]
struct ScanOutput {
    store: km_store::KeywordStore,
    #[serde(skip_serializing_if = "Option::is_none")]
    rewrites: Option<Vec<km_store::TextRewrite>>,
    warnings: Vec<km_core::ParseWarning>,
}

/// Result of a lookup.
#[derive(Debug, Serialize)]
struct LookupOutput {
    entity: String,
    keyword: String,
    records: Vec<ParsedKeyword>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::Clean {
            input,
            content,
            output,
        } => cmd_clean(&input, content, output.as_deref()),

        Command::Parse {
            input,
            content,
            pretty,
            output,
        } => cmd_parse(&input, content, pretty, output.as_deref()),

        Command::Scan {
            input,
            rewrites,
            pretty,
            output,
        } => cmd_scan(&input, rewrites, pretty, output.as_deref()),

        Command::Lookup {
            input,
            entity,
            keyword,
            pretty,
            output,
        } => cmd_lookup(&input, &entity, &keyword, pretty, output.as_deref()),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .try_init();
}

fn load_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else if Path::new(input).exists() {
        std::fs::read_to_string(input).context(format!("Failed to read file: {input}"))
    } else {
        // Treat as inline text
        Ok(input.to_string())
    }
}

fn load_graph(input: &str) -> Result<AppGraph> {
    let raw = load_input(input)?;
    serde_json::from_str(&raw).context("Failed to parse application graph JSON")
}

fn write_output(output: Option<&str>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content).context(format!("Failed to write to: {path}"))?;
            info!("Wrote output to: {path}");
        }
        None => {
            io::stdout()
                .write_all(content.as_bytes())
                .context("Failed to write to stdout")?;
            io::stdout()
                .write_all(b"\n")
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(rendered)
}

fn cmd_clean(input: &str, content: bool, output: Option<&str>) -> Result<()> {
    let source = load_input(input)?;
    let cleaned = if content {
        clean_up_content(&source)
    } else {
        clean_up_keywords(&source)
    };
    write_output(output, &cleaned)
}

fn cmd_parse(input: &str, content: bool, pretty: bool, output: Option<&str>) -> Result<()> {
    let source = load_input(input)?;

    let (cleaned, keywords) = if content {
        (clean_up_content(&source), get_keywords_from_content(&source))
    } else {
        (clean_up_keywords(&source), get_keywords(&source))
    };

    debug!(
        keywords = keywords.len(),
        "parsed {} bytes of input",
        source.len()
    );

    let result = ParseOutput {
        cleaned,
        keyword_count: keywords.len(),
        keywords,
    };
    write_output(output, &to_json(&result, pretty)?)
}

fn cmd_scan(input: &str, rewrites: bool, pretty: bool, output: Option<&str>) -> Result<()> {
    let graph = load_graph(input)?;
    let build = build_store(&graph);

    for warning in &build.warnings {
        warn!("{}: {}", warning.code.as_str(), warning.message);
    }
    info!(
        entities = build.store.len(),
        rewrites = build.rewrites.len(),
        "built keyword store"
    );

    let result = ScanOutput {
        store: build.store,
        rewrites: rewrites.then_some(build.rewrites),
        warnings: build.warnings,
    };
    write_output(output, &to_json(&result, pretty)?)
}

fn cmd_lookup(
    input: &str,
    entity: &str,
    keyword: &str,
    pretty: bool,
    output: Option<&str>,
) -> Result<()> {
    let graph = load_graph(input)?;
    let build = build_store(&graph);

    let result = LookupOutput {
        entity: entity.to_string(),
        keyword: keyword.to_string(),
        records: build.store.records(entity, keyword).to_vec(),
    };
    write_output(output, &to_json(&result, pretty)?)
}
