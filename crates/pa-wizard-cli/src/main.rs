use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use pa_wizard_core::{
    CatalogFile, FieldHint, HintLevel, PaType, PaWizardDraft, ReconciledChecklist,
    RequirementCatalog, Review, StaticCatalog, WizardController,
};

#[derive(Parser, Debug)]
#[command(name = "pa-wizard", version, about = "Prior authorization request wizard tools")]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print an empty draft for a category
    New(NewArgs),
    /// List document requirements
    Catalog(CatalogArgs),
    /// Reconcile a draft's document checklist and show progress
    Checklist(ChecklistArgs),
    /// Show the review of a draft
    Review(ReviewArgs),
    /// Validate a requirement catalog file
    ValidateCatalog(ValidateCatalogArgs),
}

#[derive(Parser, Debug)]
struct NewArgs {
    /// Request category (e.g., imaging, durable-equipment)
    #[arg(long, default_value = "general")]
    category: PaType,

    /// Write the draft here instead of stdout
    #[arg(long, value_name = "PATH")]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct CatalogArgs {
    /// Catalog file (YAML or JSON); the built-in catalog if omitted
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Only this category
    #[arg(long)]
    category: Option<PaType>,
}

#[derive(Parser, Debug)]
struct ChecklistArgs {
    /// Draft JSON file
    #[arg(long, value_name = "PATH")]
    draft: PathBuf,

    /// Catalog file (YAML or JSON); the built-in catalog if omitted
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Toggle the uploaded state of a requirement (repeatable)
    #[arg(long, value_name = "ID")]
    toggle: Vec<String>,

    /// Write the reconciled checklist back to the draft file
    #[arg(long)]
    write: bool,
}

#[derive(Parser, Debug)]
struct ReviewArgs {
    /// Draft JSON file
    #[arg(long, value_name = "PATH")]
    draft: PathBuf,

    /// Catalog file (YAML or JSON); the built-in catalog if omitted
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Parser, Debug)]
struct ValidateCatalogArgs {
    /// Catalog file (YAML or JSON)
    path: PathBuf,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::New(args) => run_new(args),
        Commands::Catalog(args) => run_catalog(args),
        Commands::Checklist(args) => run_checklist(args),
        Commands::Review(args) => run_review(args),
        Commands::ValidateCatalog(args) => run_validate_catalog(args),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_new(args: NewArgs) -> Result<()> {
    let draft = PaWizardDraft::for_category(args.category);
    let json = draft.to_json_pretty().context("serialize draft")?;

    match args.out {
        Some(path) => {
            fs::write(&path, json + "\n")
                .with_context(|| format!("write draft {}", path.display()))?;
            println!("wrote {} draft to {}", args.category, path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn run_catalog(args: CatalogArgs) -> Result<()> {
    let catalog = load_catalog(args.file.as_deref())?;
    let categories: Vec<PaType> = match args.category {
        Some(category) => vec![category],
        None => PaType::ALL.to_vec(),
    };

    print!("{}", render_catalog(&catalog, &categories));
    Ok(())
}

fn run_checklist(args: ChecklistArgs) -> Result<()> {
    let catalog = load_catalog(args.file.as_deref())?;
    let draft = load_draft(&args.draft)?;
    let mut wizard = WizardController::with_draft(draft);

    for id in &args.toggle {
        if wizard.toggle_document(&catalog, id).is_none() {
            bail!(
                "'{}' is not a document requirement for category {}",
                id,
                wizard.draft().category()
            );
        }
    }

    let checklist = wizard.checklist(&catalog);
    print!("{}", render_checklist(&checklist));

    if args.write {
        let reconciled = wizard.draft().with_slice(pa_wizard_core::DraftSlice::DocumentChecklist(
            checklist.into_items(),
        ));
        let json = reconciled.to_json_pretty().context("serialize draft")?;
        fs::write(&args.draft, json + "\n")
            .with_context(|| format!("write draft {}", args.draft.display()))?;
        println!("updated {}", args.draft.display());
    }
    Ok(())
}

#[derive(Serialize)]
struct ReviewReport<'a> {
    review: &'a Review,
    hints: &'a [FieldHint],
}

fn run_review(args: ReviewArgs) -> Result<()> {
    let catalog = load_catalog(args.file.as_deref())?;
    let wizard = WizardController::with_draft(load_draft(&args.draft)?);
    let review = wizard.review(&catalog);
    let hints = wizard.hints();

    match args.format {
        OutputFormat::Text => print!("{}", render_review(&review, &hints)),
        OutputFormat::Json => {
            let report = ReviewReport {
                review: &review,
                hints: &hints,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("serialize review")?
            );
        }
    }
    Ok(())
}

fn run_validate_catalog(args: ValidateCatalogArgs) -> Result<()> {
    let catalog = CatalogFile::from_file(&args.path)
        .with_context(|| format!("invalid catalog {}", args.path.display()))?;

    let requirements: usize = catalog.categories.values().map(Vec::len).sum();
    println!(
        "{} is valid: '{}' v{}, {} categories, {} requirements",
        args.path.display(),
        catalog.name,
        catalog.catalog_version,
        catalog.categories.len(),
        requirements
    );
    Ok(())
}

fn load_catalog(path: Option<&Path>) -> Result<StaticCatalog> {
    match path {
        Some(path) => StaticCatalog::from_file(path)
            .with_context(|| format!("load catalog {}", path.display())),
        None => Ok(StaticCatalog::standard()),
    }
}

fn load_draft(path: &Path) -> Result<PaWizardDraft> {
    tracing::debug!(path = %path.display(), "Loading draft");
    let contents =
        fs::read_to_string(path).with_context(|| format!("read draft {}", path.display()))?;
    PaWizardDraft::from_json(&contents)
        .with_context(|| format!("parse draft {}", path.display()))
}

fn render_catalog(catalog: &dyn RequirementCatalog, categories: &[PaType]) -> String {
    let mut out = String::new();
    for category in categories {
        let requirements = catalog.requirements_for(*category);
        let _ = writeln!(out, "{} ({})", category.label(), category);
        if requirements.is_empty() {
            let _ = writeln!(out, "  no documents required");
        }
        for req in &requirements {
            let marker = if req.required { "required" } else { "optional" };
            let _ = writeln!(out, "  {:<24} {:<9} {}", req.id, marker, req.name);
        }
    }
    out
}

fn render_checklist(checklist: &ReconciledChecklist) -> String {
    let mut out = String::new();
    for (req, item) in checklist.entries() {
        let mark = if item.uploaded { "x" } else { " " };
        let required = if req.required { " *" } else { "" };
        let file = item
            .file_name
            .as_deref()
            .map(|f| format!("  ({})", f))
            .unwrap_or_default();
        let _ = writeln!(out, "[{}] {}{}{}", mark, req.name, required, file);
    }

    let metrics = checklist.metrics();
    let _ = writeln!(out, "{} documents attached", metrics.progress_label());
    let _ = writeln!(
        out,
        "{} of {} required attached",
        metrics.required_uploaded_count, metrics.required_count
    );
    out
}

fn render_review(review: &Review, hints: &[FieldHint]) -> String {
    let mut out = String::new();

    if let Some(banner) = &review.eligibility {
        let _ = writeln!(out, "{}", banner.message);
        if let Some(badge) = &banner.auth_required_badge {
            let _ = writeln!(out, "[{}]", badge);
        }
        out.push('\n');
    }

    for section in &review.sections {
        let _ = writeln!(out, "{}", section.title);
        if section.fields.is_empty() {
            let _ = writeln!(out, "  {}", pa_wizard_core::EMPTY_PLACEHOLDER);
        }
        for field in &section.fields {
            let _ = writeln!(out, "  {}: {}", field.label, field.value);
        }
        out.push('\n');
    }

    if !hints.is_empty() {
        let _ = writeln!(out, "Hints");
        for hint in hints {
            let level = match hint.level {
                HintLevel::Info => "info",
                HintLevel::Warning => "warning",
            };
            let _ = writeln!(out, "  {}: {} ({})", level, hint.message, hint.field);
        }
    }
    out
}
