//! Applies a link registry to a generated index document.
//!
//! The identity is read from the dataset metadata unless `--degree` and
//! `--year` are given. A registry recorded for a different identity aborts
//! the run and leaves the index untouched.

use anyhow::{Result, bail};
use clap::Parser;
use curricula::registry::LinkRegistry;
use curricula::rewrite::DEFAULT_LINK_PATTERN;
use curricula::{DatasetIdentity, IndexRewriter, init_tracing, load_dataset};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rewrite-index", about = "Point index links at published discipline pages")]
struct Cli {
    /// Index document to rewrite
    #[arg(long, default_value = "disciplines/index.html")]
    index: PathBuf,

    /// Write the result here instead of rewriting in place
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Dataset whose metadata supplies degree and year
    #[arg(long, required_unless_present_all = ["degree", "year"])]
    dataset: Option<PathBuf>,

    #[arg(long, requires = "year")]
    degree: Option<String>,

    #[arg(long, requires = "degree")]
    year: Option<String>,

    /// Directory for link registry files
    #[arg(long, default_value = ".")]
    registry_dir: PathBuf,

    /// Explicit registry file (overrides --registry-dir)
    #[arg(long)]
    registry: Option<PathBuf>,

    /// href pattern; group 1 must capture the discipline code
    #[arg(long, default_value = DEFAULT_LINK_PATTERN)]
    pattern: String,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();
    let cli = Cli::parse();

    let identity = match (&cli.degree, &cli.year, &cli.dataset) {
        (Some(degree), Some(year), _) => DatasetIdentity::new(degree.as_str(), year.as_str()),
        (_, _, Some(path)) => load_dataset(path)?.metadata.identity()?,
        _ => bail!("pass --dataset or both --degree and --year"),
    };
    let registry = match &cli.registry {
        Some(path) => LinkRegistry::at(path),
        None => LinkRegistry::in_dir(&cli.registry_dir, &identity),
    };

    let rewriter = IndexRewriter::with_pattern(&cli.pattern)?;
    let outcome = rewriter.rewrite_file(&cli.index, cli.output.as_deref(), &identity, &registry)?;

    println!(
        "{}: {} link(s) rewritten, {} without a published page",
        identity,
        outcome.substituted.len(),
        outcome.unresolved.len()
    );
    for code in &outcome.unresolved {
        println!("  unresolved: {code}");
    }
    Ok(())
}
