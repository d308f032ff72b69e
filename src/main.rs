//! seqlayout CLI
//!
//! Usage:
//!   seqlayout [OPTIONS] [FILE]
//!
//! Options:
//!   -c, --config <FILE>  Sequence layout spacing (TOML format)
//!   -d, --debug          Log each layout phase to stderr
//!   -h, --help           Print help
//!
//! Reads a TOML graph document, lays it out with the built-in row engine
//! and prints the laid-out document as TOML.

use std::io::{self, Read};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use seqlayout::layout::{row_layout, RowConfig};
use seqlayout::{layout_with_config, Graph, GraphDocument, LaidOutDocument, SequenceConfig};

#[derive(Parser)]
#[command(name = "seqlayout")]
#[command(about = "Lay out sequence diagrams embedded in a diagram graph")]
struct Cli {
    /// Input file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Sequence layout configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Debug mode: log each layout phase
    #[arg(short, long)]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => match SequenceConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => SequenceConfig::default(),
    };

    let document = match &cli.input {
        Some(path) => GraphDocument::from_file(path),
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => GraphDocument::from_toml_str(&buffer),
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };
    let mut graph = match document.and_then(|d| d.to_graph()) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let row = RowConfig::default();
    let mut generic = |g: &mut Graph| row_layout(g, &row);
    if let Err(e) = layout_with_config(&mut graph, &config, &mut generic) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    match LaidOutDocument::from_graph(&graph).to_toml_string() {
        Ok(text) => print!("{}", text),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
