//! Uploads the index document to the dataset's pinned CMS page.
//!
//! The page id comes from `metadata.page_id` (or its deprecated alias); a
//! dataset without one is refused before any request. With `--rewrite` the
//! registry links are applied in memory first, so the uploaded index points
//! at the published discipline pages.

use anyhow::{Context, Result, bail};
use clap::Parser;
use curricula::registry::LinkRegistry;
use curricula::{
    CmsArgs, CmsConfig, HttpTransport, IndexRewriter, PageContent, PublishEngine, PublishHint,
    PublishStatus, init_tracing, load_dataset, slugify,
};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "publish-index", about = "Update the curriculum index page on the CMS")]
struct Cli {
    /// Dataset file (YAML or JSON)
    dataset: PathBuf,

    /// Index document to upload
    #[arg(long, default_value = "disciplines/index.html")]
    index: PathBuf,

    /// Apply the link registry before uploading
    #[arg(long)]
    rewrite: bool,

    /// Directory for link registry files
    #[arg(long, default_value = ".")]
    registry_dir: PathBuf,

    /// Explicit registry file (overrides --registry-dir)
    #[arg(long)]
    registry: Option<PathBuf>,

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
    let identity = dataset.metadata.identity()?;
    let page_id = dataset
        .metadata
        .parent_page_id()
        .context("publishing the index needs metadata.page_id")?;

    let mut body = fs::read_to_string(&cli.index)
        .with_context(|| format!("reading {}", cli.index.display()))?;
    if cli.rewrite {
        let registry = match &cli.registry {
            Some(path) => LinkRegistry::at(path),
            None => LinkRegistry::in_dir(&cli.registry_dir, &identity),
        };
        let outcome = IndexRewriter::new()?.rewrite(&body, &identity, &registry)?;
        println!(
            "rewrote {} link(s), {} unresolved",
            outcome.substituted.len(),
            outcome.unresolved.len()
        );
        body = outcome.document;
    }

    let title = format!("Освітні компоненти: {} {}", identity.degree, identity.year);
    let hint = PublishHint {
        page_id: Some(page_id),
        slug: Some(slugify(&format!(
            "op_{}-{}",
            identity.degree, identity.year
        ))),
        ..PublishHint::default()
    };
    let engine = PublishEngine::new(HttpTransport::new(&config)?);
    let result = engine.publish(&PageContent::new(None, title, body), &hint);

    match result.status {
        PublishStatus::Failed => bail!("index publish failed: {}", result.message),
        status => println!(
            "{status}: {}",
            result.url.as_deref().unwrap_or("(no link returned)")
        ),
    }
    Ok(())
}
