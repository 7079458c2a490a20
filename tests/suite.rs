// Integration suite for the curriculum tools; drives the dataset, publish,
// registry, and rewrite pieces together the way the binaries chain them.
mod support;

use anyhow::{Context, Result};
use curricula::publish::{ContentProvider, PublishSummary};
use curricula::registry::default_path;
use curricula::{
    CompetencyCode, DatasetIdentity, DirectoryContentProvider, DisciplineCode, IndexRewriter,
    LinkRegistry, PageContent, PageId, PublishEngine, PublishHint, PublishStatus, RegistryEntries,
    RegistryError, RepositoryError, UnfilledPolicy, build, load_dataset, publish_all,
    save_dataset, validate,
};
use std::fs;
use std::process::Command;
use support::{BACHELOR_2024, FakeCms, binary, run_command, write_file, write_pages};
use tempfile::TempDir;

fn bachelor_2024() -> DatasetIdentity {
    DatasetIdentity::new("Bachelor", "2024")
}

// A catalog discipline without a mapping adds exactly one to the unfilled
// count and nothing to the error list; mapped cells read true.
#[test]
fn unfilled_discipline_is_a_single_warning() -> Result<()> {
    let temp = TempDir::new()?;
    let path = write_file(
        temp.path(),
        "scenario.yaml",
        r#"
disciplines: {A01: First, A02: Second}
competencies: {C1: Competency}
program_results: {R1: Result}
mappings:
  A01: {competencies: [C1], program_results: []}
"#,
    )?;
    let dataset = load_dataset(&path)?;

    let report = validate(&dataset);
    assert!(report.is_valid(), "unexpected errors: {:?}", report.errors);
    assert_eq!(report.unfilled_count(), 1);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].to_string(), "1 disciplines unfilled");

    let matrices = build(&dataset);
    let c1 = CompetencyCode("C1".into());
    assert_eq!(
        matrices.competencies.get(&c1, &DisciplineCode("A01".into())),
        Some(true)
    );
    assert_eq!(
        matrices.competencies.get(&c1, &DisciplineCode("A02".into())),
        Some(false)
    );
    assert_eq!(
        serde_json::to_string(&matrices)?,
        serde_json::to_string(&build(&dataset))?
    );
    Ok(())
}

// Loading surfaces the two data error kinds distinctly.
#[test]
fn repository_distinguishes_missing_and_malformed() -> Result<()> {
    let temp = TempDir::new()?;
    let missing = load_dataset(&temp.path().join("nope.yaml")).expect_err("missing");
    assert!(matches!(missing, RepositoryError::NotFound(_)));

    let bad = write_file(temp.path(), "bad.json", r#"{"mappings": {"A 01": 5}}"#)?;
    let malformed = load_dataset(&bad).expect_err("malformed");
    assert!(matches!(malformed, RepositoryError::MalformedData { .. }));
    Ok(())
}

// Elective disciplines take part in validation but stay a separate section
// on save.
#[test]
fn electives_merge_for_validation_and_survive_save() -> Result<()> {
    let temp = TempDir::new()?;
    let path = write_file(temp.path(), "bachelor.yaml", BACHELOR_2024)?;
    let dataset = load_dataset(&path)?;

    let report = validate(&dataset);
    assert!(report.is_valid(), "unexpected errors: {:?}", report.errors);
    assert_eq!(report.unfilled_count(), 1);
    assert!(report.passes(UnfilledPolicy::Warn));
    assert!(!report.passes(UnfilledPolicy::Deny));

    save_dataset(&dataset, &path)?;
    let text = fs::read_to_string(&path)?;
    assert!(text.contains("elevative_disciplines"));
    assert!(text.contains("faculty"));
    assert_eq!(load_dataset(&path)?, dataset);
    Ok(())
}

// Publishing the same content twice yields one remote page: created, then
// updated, never a second create.
#[test]
fn publish_is_idempotent_per_slug() -> Result<()> {
    let engine = PublishEngine::new(FakeCms::new());
    let content = PageContent::new(None, "Intro to Physics", "<p>v1</p>");
    let hint = PublishHint {
        slug: Some("intro-to-physics".into()),
        parent: Some(PageId(100)),
        ..PublishHint::default()
    };

    let first = engine.publish(&content, &hint);
    assert_eq!(first.status, PublishStatus::Created);
    assert_eq!(first.url.as_deref(), Some("https://cms.test/intro-to-physics/"));

    let revised = PageContent::new(None, "Intro to Physics", "<p>v2</p>");
    let second = engine.publish(&revised, &hint);
    assert_eq!(second.status, PublishStatus::Updated);
    assert_eq!(second.page_id, first.page_id);

    let pages = engine.transport().pages();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].content, "<p>v2</p>");
    assert_eq!(pages[0].status, "publish");
    assert_eq!(pages[0].parent, Some(100));
    Ok(())
}

// A full batch: pages come from the rendered directory, failures are
// captured per page, and only successes reach the registry.
#[test]
fn batch_publish_records_successes_and_reports_failures() -> Result<()> {
    let temp = TempDir::new()?;
    let dataset = load_dataset(&write_file(temp.path(), "bachelor.yaml", BACHELOR_2024)?)?;
    let pages_dir = write_pages(temp.path(), &["A 01", "A 02", "B 01", "Z 99"])?;
    let identity = dataset.metadata.identity()?;
    let parent = dataset.metadata.parent_page_id()?;

    let cms = FakeCms::new();
    cms.reject_slug("a-02-linear-algebra");
    let engine = PublishEngine::new(cms);
    let pages = DirectoryContentProvider::new(&pages_dir, &dataset).pages()?;
    let outcome = publish_all(&engine, pages, &identity, Some(parent), None);

    let summary: &PublishSummary = &outcome.summary;
    assert_eq!(summary.results.len(), 4);
    assert_eq!(summary.count(PublishStatus::Created), 2);
    assert_eq!(summary.count(PublishStatus::Failed), 2);
    let failed: Vec<String> = summary
        .with_status(PublishStatus::Failed)
        .filter_map(|result| result.code.as_ref().map(ToString::to_string))
        .collect();
    assert_eq!(failed, vec!["A 02", "Z 99"]);

    let registry = LinkRegistry::in_dir(temp.path(), &identity);
    registry.record(&identity, &outcome.entries)?;
    assert_eq!(registry.path(), default_path(temp.path(), &identity));
    let stored = registry.lookup(&identity)?;
    assert_eq!(
        stored.link(&DisciplineCode("A 01".into())),
        Some("https://cms.test/a-01-intro-to-physics/")
    );
    assert_eq!(
        stored.link(&DisciplineCode("B 01".into())),
        Some("https://cms.test/b-01-astronomy/")
    );
    assert_eq!(stored.links.len(), 2);
    assert!(
        engine
            .transport()
            .pages()
            .iter()
            .all(|page| page.parent == Some(100))
    );
    Ok(())
}

// A rerun pins known page ids (no slug lookup) and a transport outage turns
// into failed results rather than an error.
#[test]
fn rerun_uses_prior_ids_and_survives_outage() -> Result<()> {
    let temp = TempDir::new()?;
    let dataset = load_dataset(&write_file(temp.path(), "bachelor.yaml", BACHELOR_2024)?)?;
    let pages_dir = write_pages(temp.path(), &["A 01"])?;
    let identity = dataset.metadata.identity()?;
    let provider = DirectoryContentProvider::new(&pages_dir, &dataset);

    let engine = PublishEngine::new(FakeCms::new());
    let first = publish_all(&engine, provider.pages()?, &identity, None, None);
    let id = first.entries.page_ids[&DisciplineCode("A 01".into())];

    let second = publish_all(
        &engine,
        provider.pages()?,
        &identity,
        None,
        Some(&first.entries),
    );
    assert_eq!(second.summary.count(PublishStatus::Updated), 1);
    assert_eq!(
        engine.transport().log(),
        vec![
            "find a-01-intro-to-physics".to_string(),
            "create a-01-intro-to-physics".to_string(),
            format!("update {id}"),
        ]
    );

    engine.transport().set_offline(true);
    let third = publish_all(&engine, provider.pages()?, &identity, None, None);
    assert_eq!(third.summary.count(PublishStatus::Failed), 1);
    assert!(third.summary.results[0].message.contains("connection refused"));
    assert!(third.entries.is_empty());
    Ok(())
}

// Recording replaces the whole file: codes absent from the latest run are
// dropped.
#[test]
fn registry_round_trip_and_full_overwrite() -> Result<()> {
    let temp = TempDir::new()?;
    let identity = bachelor_2024();
    let registry = LinkRegistry::in_dir(temp.path(), &identity);

    let mut entries = RegistryEntries::default();
    entries
        .links
        .insert(DisciplineCode("A 01".into()), "https://site/a01".into());
    entries
        .links
        .insert(DisciplineCode("A 02".into()), "https://site/a02".into());
    entries.page_ids.insert(DisciplineCode("A 01".into()), PageId(7));
    registry.record(&identity, &entries)?;
    assert_eq!(registry.lookup(&identity)?, entries);

    entries.links.remove(&DisciplineCode("A 02".into()));
    registry.record(&identity, &entries)?;
    assert_eq!(registry.lookup(&identity)?.links.len(), 1);

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(registry.path())?)?;
    assert_eq!(raw["degree"], "Bachelor");
    assert_eq!(raw["year"], "2024");
    assert_eq!(raw["links"]["A 01"], "https://site/a01");
    Ok(())
}

// Registered codes get their URL, unregistered ones `#`, everything else in
// the document is untouched.
#[test]
fn rewrite_substitutes_registered_links() -> Result<()> {
    let temp = TempDir::new()?;
    let identity = bachelor_2024();
    let registry = LinkRegistry::in_dir(temp.path(), &identity);
    let mut entries = RegistryEntries::default();
    entries
        .links
        .insert(DisciplineCode("A 01".into()), "https://site/a01".into());
    registry.record(&identity, &entries)?;

    let document = concat!(
        "<html><body>\n",
        "<a class=\"x\" href=\"A_01.html\">A 01</a>\n",
        "<a href=\"A_99.html\">A 99</a>\n",
        "<link href=\"style.css\">\n",
        "</body></html>\n"
    );
    let outcome = IndexRewriter::new()?.rewrite(document, &identity, &registry)?;
    assert_eq!(
        outcome.document,
        concat!(
            "<html><body>\n",
            "<a class=\"x\" href=\"https://site/a01\">A 01</a>\n",
            "<a href=\"#\">A 99</a>\n",
            "<link href=\"style.css\">\n",
            "</body></html>\n"
        )
    );
    assert_eq!(outcome.substituted.len(), 1);
    assert_eq!(outcome.unresolved, vec![DisciplineCode("A 99".into())]);
    Ok(())
}

// A registry recorded for 2024 must never be applied to a 2023 index.
#[test]
fn rewrite_refuses_foreign_registry() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("links.json");
    let registry = LinkRegistry::at(&path);
    let mut entries = RegistryEntries::default();
    entries
        .links
        .insert(DisciplineCode("A 01".into()), "https://site/a01".into());
    registry.record(&bachelor_2024(), &entries)?;

    let bachelor_2023 = DatasetIdentity::new("Bachelor", "2023");
    let err = IndexRewriter::new()?
        .rewrite(r#"<a href="A_01.html">A 01</a>"#, &bachelor_2023, &registry)
        .expect_err("identity mismatch");
    match err {
        RegistryError::IdentityMismatch {
            stored, requested, ..
        } => {
            assert_eq!(stored, bachelor_2024());
            assert_eq!(requested, bachelor_2023);
        }
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}

// The curriculum binary validates, refuses to clobber a dataset with the
// template, and honors --deny-unfilled.
#[test]
fn curriculum_cli_validate_and_template() -> Result<()> {
    let temp = TempDir::new()?;
    let dataset = write_file(temp.path(), "bachelor.yaml", BACHELOR_2024)?;

    let mut validate_cmd = Command::new(binary("curriculum"));
    validate_cmd.arg("validate").arg(&dataset);
    let output = run_command(validate_cmd)?;
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("1 disciplines unfilled"), "stdout: {stdout}");

    let denied = Command::new(binary("curriculum"))
        .arg("validate")
        .arg("--deny-unfilled")
        .arg(&dataset)
        .output()
        .context("running curriculum validate --deny-unfilled")?;
    assert!(!denied.status.success());

    let refused = Command::new(binary("curriculum"))
        .arg("template")
        .arg(&dataset)
        .output()?;
    assert!(!refused.status.success());
    assert_eq!(fs::read_to_string(&dataset)?, BACHELOR_2024);

    let fresh = temp.path().join("template.yaml");
    let mut template_cmd = Command::new(binary("curriculum"));
    template_cmd.arg("template").arg(&fresh);
    run_command(template_cmd)?;
    let template = load_dataset(&fresh)?;
    assert!(validate(&template).is_valid());
    Ok(())
}

// rewrite-index reads the identity from the dataset and rewrites in place.
#[test]
fn rewrite_index_cli_rewrites_in_place() -> Result<()> {
    let temp = TempDir::new()?;
    let dataset = write_file(temp.path(), "bachelor.yaml", BACHELOR_2024)?;
    let index = write_file(
        temp.path(),
        "disciplines/index.html",
        r#"<a href="A_01.html">A 01</a> <a href="A_02.html">A 02</a>"#,
    )?;
    let identity = bachelor_2024();
    let mut entries = RegistryEntries::default();
    entries
        .links
        .insert(DisciplineCode("A 01".into()), "https://site/a01".into());
    LinkRegistry::in_dir(temp.path(), &identity).record(&identity, &entries)?;

    let mut cmd = Command::new(binary("rewrite-index"));
    cmd.arg("--index")
        .arg(&index)
        .arg("--dataset")
        .arg(&dataset)
        .arg("--registry-dir")
        .arg(temp.path());
    let output = run_command(cmd)?;
    assert!(String::from_utf8(output.stdout)?.contains("unresolved: A 02"));
    assert_eq!(
        fs::read_to_string(&index)?,
        r##"<a href="https://site/a01">A 01</a> <a href="#">A 02</a>"##
    );
    Ok(())
}

fn publish_pages_command(dataset: &std::path::Path, registry_dir: &std::path::Path) -> Command {
    let mut cmd = Command::new(binary("publish-pages"));
    cmd.arg(dataset)
        .arg("--pages-dir")
        .arg(registry_dir.join("disciplines"))
        .arg("--registry-dir")
        .arg(registry_dir)
        .env("WP_PAGES_URL", "http://127.0.0.1:9/wp-json/wp/v2/pages")
        .env_remove("WP_USER")
        .env_remove("WP_PASSWORD");
    cmd
}

// --deny-unfilled stops publish-pages before any request and leaves no
// registry behind.
#[test]
fn publish_pages_gate_blocks_unfilled_dataset() -> Result<()> {
    let temp = TempDir::new()?;
    let dataset = write_file(temp.path(), "bachelor.yaml", BACHELOR_2024)?;
    write_pages(temp.path(), &["A 01"])?;

    let output = publish_pages_command(&dataset, temp.path())
        .arg("--deny-unfilled")
        .output()
        .context("running publish-pages --deny-unfilled")?;
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("dataset failed validation"), "stderr: {stderr}");
    assert!(stderr.contains("1 disciplines unfilled"), "stderr: {stderr}");
    assert!(!default_path(temp.path(), &bachelor_2024()).exists());
    Ok(())
}

// A template dataset still carries the zero placeholder page id, which is
// a missing parent rather than a top-level publish.
#[test]
fn publish_pages_refuses_placeholder_parent() -> Result<()> {
    let temp = TempDir::new()?;
    let dataset = temp.path().join("template.yaml");
    let mut template_cmd = Command::new(binary("curriculum"));
    template_cmd.arg("template").arg(&dataset);
    run_command(template_cmd)?;
    write_pages(temp.path(), &["ЗО 01"])?;

    let output = publish_pages_command(&dataset, temp.path())
        .output()
        .context("running publish-pages on the template")?;
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("no parent page id"), "stderr: {stderr}");
    Ok(())
}
