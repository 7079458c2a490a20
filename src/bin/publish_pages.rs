//! Publishes rendered discipline pages and records their URLs.
//!
//! The dataset is validated first (errors always stop the run; unfilled
//! disciplines stop it only with `--deny-unfilled`). Pages are read from the
//! rendered directory and published one by one under the metadata parent
//! page. The link registry for the dataset identity is written once, after
//! every page has a result, and the process exits non-zero if any page
//! failed.

use anyhow::{Context, Result, bail};
use clap::Parser;
use curricula::publish::{ContentProvider, PublishSummary, carry_forward};
use curricula::registry::LinkRegistry;
use curricula::{
    CmsArgs, CmsConfig, DirectoryContentProvider, HttpTransport, PublishEngine, PublishStatus,
    RegistryError, UnfilledPolicy, ensure_valid, init_tracing, load_dataset, publish_all,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "publish-pages", about = "Create or update one CMS page per discipline")]
struct Cli {
    /// Dataset file (YAML or JSON)
    dataset: PathBuf,

    /// Directory holding rendered `<code>.html` pages
    #[arg(long, default_value = "disciplines")]
    pages_dir: PathBuf,

    /// Directory for link registry files
    #[arg(long, default_value = ".")]
    registry_dir: PathBuf,

    /// Explicit registry file (overrides --registry-dir)
    #[arg(long)]
    registry: Option<PathBuf>,

    /// Refuse to publish while disciplines are unfilled
    #[arg(long)]
    deny_unfilled: bool,

    #[command(flatten)]
    cms: CmsArgs,
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

    let config = CmsConfig::from(cli.cms);
    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("invalid CMS settings")?;

    let dataset = load_dataset(&cli.dataset)?;
    let policy = if cli.deny_unfilled {
        UnfilledPolicy::Deny
    } else {
        UnfilledPolicy::Warn
    };
    ensure_valid(&dataset, policy)?;
    let identity = dataset.metadata.identity()?;
    let parent = dataset
        .metadata
        .parent_page_id()
        .context("publishing discipline pages needs a parent page")?;

    let registry = match &cli.registry {
        Some(path) => LinkRegistry::at(path),
        None => LinkRegistry::in_dir(&cli.registry_dir, &identity),
    };
    let prior = match registry.lookup(&identity) {
        Ok(entries) => Some(entries),
        Err(RegistryError::NotFound(_)) => None,
        Err(err) => return Err(err.into()),
    };

    let provider = DirectoryContentProvider::new(&cli.pages_dir, &dataset);
    let pages = provider.pages()?;
    let engine = PublishEngine::new(HttpTransport::new(&config)?);
    let outcome = publish_all(&engine, pages, &identity, Some(parent), prior.as_ref());

    print_summary(&outcome.summary);
    registry
        .record(&identity, &carry_forward(outcome.entries, prior.as_ref()))
        .with_context(|| format!("writing {}", registry.path().display()))?;
    println!("registry: {}", registry.path().display());

    let failed = outcome.summary.count(PublishStatus::Failed);
    if failed > 0 {
        bail!("{failed} page(s) failed to publish");
    }
    Ok(())
}

fn print_summary(summary: &PublishSummary) {
    for status in [
        PublishStatus::Created,
        PublishStatus::Updated,
        PublishStatus::Failed,
    ] {
        let matching: Vec<_> = summary.with_status(status).collect();
        println!("{status}: {}", matching.len());
        for result in matching {
            let label = result
                .code
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| result.title.clone());
            match status {
                PublishStatus::Failed => println!("  {label}: {}", result.message),
                _ => println!("  {label}: {}", result.url.as_deref().unwrap_or("-")),
            }
        }
    }
}
