//! Local dataset operations.
//!
//! `validate` prints every cross-reference error and the unfilled warning
//! (exit 1 when the dataset is invalid, or when `--deny-unfilled` is set and
//! disciplines are unfilled). `stats` prints catalog sizes and usage counts,
//! `matrix` emits the presence matrices and summary rows as JSON, `fill`
//! walks unfilled disciplines interactively, and `template` writes a starter
//! dataset.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use curricula::fill::fill_unfilled;
use curricula::template::dataset_template;
use curricula::{
    UnfilledPolicy, build, init_tracing, load_dataset, save_dataset, statistics, validate,
};
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "curriculum", about = "Curriculum dataset checks and editing")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check mappings against the catalogs
    Validate {
        dataset: PathBuf,
        /// Treat unfilled disciplines as a failure
        #[arg(long)]
        deny_unfilled: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Catalog sizes, fill progress, and code usage
    Stats {
        dataset: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Presence matrices and summary rows as JSON
    Matrix {
        dataset: PathBuf,
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Interactively map unfilled disciplines (auto-saves after each)
    Fill { dataset: PathBuf },
    /// Write a starter dataset
    Template {
        dataset: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
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

    match cli.command {
        Command::Validate {
            dataset,
            deny_unfilled,
            json,
        } => run_validate(dataset, deny_unfilled, json),
        Command::Stats { dataset, json } => run_stats(dataset, json),
        Command::Matrix { dataset, output } => run_matrix(dataset, output),
        Command::Fill { dataset } => run_fill(dataset),
        Command::Template { dataset, force } => run_template(dataset, force),
    }
}

fn run_validate(path: PathBuf, deny_unfilled: bool, json: bool) -> Result<()> {
    let dataset = load_dataset(&path)?;
    let report = validate(&dataset);
    let policy = if deny_unfilled {
        UnfilledPolicy::Deny
    } else {
        UnfilledPolicy::Warn
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for error in &report.errors {
            println!("error: {error}");
        }
        for warning in &report.warnings {
            println!("warning: {warning}");
        }
        if report.errors.is_empty() && report.warnings.is_empty() {
            println!("{}: ok", path.display());
        }
    }

    if !report.passes(policy) {
        bail!(
            "{}: {} error(s), {} unfilled",
            path.display(),
            report.errors.len(),
            report.unfilled_count()
        );
    }
    Ok(())
}

fn run_stats(path: PathBuf, json: bool) -> Result<()> {
    let dataset = load_dataset(&path)?;
    let stats = statistics(&dataset);
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("disciplines:     {}", stats.disciplines);
    println!("competencies:    {}", stats.competencies);
    println!("program results: {}", stats.program_results);
    println!("filled:          {}", stats.filled);
    println!("unfilled:        {}", stats.unfilled.len());
    for code in &stats.unfilled {
        println!("  - {code}");
    }
    println!("\ncompetency usage:");
    for usage in &stats.competency_usage {
        println!("  {:<10} {}", usage.code.0, usage.disciplines);
    }
    println!("\nprogram result usage:");
    for usage in &stats.program_result_usage {
        println!("  {:<10} {}", usage.code.0, usage.disciplines);
    }
    Ok(())
}

fn run_matrix(path: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let dataset = load_dataset(&path)?;
    let report = build(&dataset);
    let rendered = serde_json::to_string_pretty(&report)?;
    match output {
        Some(output) => std::fs::write(&output, format!("{rendered}\n"))
            .with_context(|| format!("writing {}", output.display()))?,
        None => println!("{rendered}"),
    }
    Ok(())
}

fn run_fill(path: PathBuf) -> Result<()> {
    let mut dataset = load_dataset(&path)?;
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    let report = fill_unfilled(&mut dataset, &mut input, &mut output, |dataset| {
        save_dataset(dataset, &path)?;
        Ok(())
    })?;
    writeln!(
        output,
        "\nFilled {} discipline(s); {} still unfilled.",
        report.filled.len(),
        report.remaining
    )?;
    Ok(())
}

fn run_template(path: PathBuf, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite it",
            path.display()
        );
    }
    save_dataset(&dataset_template(), &path)?;
    println!("wrote template to {}", path.display());
    Ok(())
}
