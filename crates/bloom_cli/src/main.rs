//! Command-line access to a Bloom document directory.
//!
//! # Responsibility
//! - List, create, retag and export documents without the desktop shell.
//! - Share configuration and logging setup with the app.

use bloom_core::{
    derive_filename, export_to_file, init_logging, to_markdown, CoreConfig, DocumentManager,
    DocumentStore, ExportOutcome, ExportRegistry, FileDocumentStore, JsonFilePreferenceStore,
    LastViewed, PreferenceStore,
};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Debug, Parser)]
#[command(name = "bloom", about = "Manage Bloom documents from the shell", version)]
struct Cli {
    /// Config file; defaults to the platform config location.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Override the document directory from the config.
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List documents, newest first.
    List(ListArgs),
    /// Export a document; the destination extension picks the format.
    Export(ExportArgs),
    /// Print a document as Markdown.
    Markdown(DocumentArgs),
    /// Create a document and print its id.
    New(NewArgs),
    /// Replace a document's tags.
    Tags(TagsArgs),
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Only documents carrying this tag.
    #[arg(long)]
    tag: Option<String>,
    /// Case-insensitive title filter.
    #[arg(long)]
    search: Option<String>,
}

#[derive(Debug, Args)]
struct DocumentArgs {
    id: String,
}

#[derive(Debug, Args)]
struct ExportArgs {
    id: String,
    /// Destination file, or a directory to use the title-derived name.
    dest: PathBuf,
    /// Editor HTML used by the HTML export.
    #[arg(long)]
    html: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct NewArgs {
    #[arg(long)]
    title: Option<String>,
}

#[derive(Debug, Args)]
struct TagsArgs {
    id: String,
    tags: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let mut config = match &cli.config {
        Some(path) => CoreConfig::load_from(path)?,
        None => CoreConfig::load()?,
    };
    if let Some(dir) = cli.storage_dir {
        config.storage_dir = dir;
    }

    if let Err(err) = init_logging(&config.log_level, &config.log_path()) {
        eprintln!("warning: file logging disabled: {err}");
    }
    let mut manager = open_manager(&config);

    match cli.command {
        Commands::List(args) => handle_list(&mut manager, args),
        Commands::Export(args) => handle_export(&manager, args),
        Commands::Markdown(args) => handle_markdown(&manager, args),
        Commands::New(args) => handle_new(&mut manager, args),
        Commands::Tags(args) => handle_tags(&mut manager, args),
    }
}

fn open_manager(config: &CoreConfig) -> DocumentManager<FileDocumentStore> {
    let prefs: Arc<dyn PreferenceStore> =
        Arc::new(JsonFilePreferenceStore::new(config.preferences_path()));
    DocumentManager::new(
        FileDocumentStore::new(&config.storage_dir),
        LastViewed::new(prefs),
    )
    .with_autosave_delay(config.autosave_delay())
}

fn handle_list(manager: &mut DocumentManager<FileDocumentStore>, args: ListArgs) -> CliResult<()> {
    manager.refresh_document_list();
    manager.set_active_tag_filter(args.tag);
    manager.set_search_query(args.search.unwrap_or_default());

    for item in manager.filtered_documents() {
        let tags = if item.tags.is_empty() {
            String::new()
        } else {
            format!("  [{}]", item.tags.join(", "))
        };
        println!("{}  {}  ({}){tags}", item.id, item.title, item.modified_at_label);
    }
    Ok(())
}

fn handle_markdown(
    manager: &DocumentManager<FileDocumentStore>,
    args: DocumentArgs,
) -> CliResult<()> {
    let doc = load_by_id(manager.store(), &args.id)?;
    println!("{}", to_markdown(&doc.content));
    Ok(())
}

fn handle_export(manager: &DocumentManager<FileDocumentStore>, args: ExportArgs) -> CliResult<()> {
    let doc = load_by_id(manager.store(), &args.id)?;
    let raw_html = match &args.html {
        Some(path) => fs::read_to_string(path)?,
        None => String::new(),
    };
    let dest = if args.dest.is_dir() {
        args.dest.join(format!("{}.md", derive_filename(&doc.title)))
    } else {
        args.dest
    };

    let registry = ExportRegistry::with_defaults();
    match export_to_file(&registry, Some(&dest), &doc.content, &raw_html)? {
        ExportOutcome::Exported(path) => println!("exported {}", path.display()),
        ExportOutcome::Cancelled => println!("export cancelled"),
    }
    Ok(())
}

fn handle_new(manager: &mut DocumentManager<FileDocumentStore>, args: NewArgs) -> CliResult<()> {
    manager.refresh_document_list();
    let id = manager.create_new_document();
    manager.update_title(args.title.unwrap_or_default());
    if !manager.flush() {
        return Err(format!("failed to save new document {id}").into());
    }
    info!("event=cli_new module=cli status=ok id={id}");
    println!("{id}");
    Ok(())
}

fn handle_tags(manager: &mut DocumentManager<FileDocumentStore>, args: TagsArgs) -> CliResult<()> {
    manager.refresh_document_list();
    if !manager.documents().iter().any(|summary| summary.id == args.id) {
        return Err(format!("document not found: {}", args.id).into());
    }
    if !manager.update_tags(&args.id, args.tags) {
        warn!("event=cli_tags module=cli status=error id={}", args.id);
        return Err(format!("failed to update tags for {}", args.id).into());
    }
    let tags = manager
        .documents()
        .iter()
        .find(|summary| summary.id == args.id)
        .map(|summary| summary.tags.join(", "))
        .unwrap_or_default();
    println!("{tags}");
    Ok(())
}

fn load_by_id(store: &FileDocumentStore, id: &str) -> CliResult<bloom_core::Document> {
    let meta = store
        .list()?
        .into_iter()
        .find(|meta| meta.id == id)
        .ok_or_else(|| format!("document not found: {id}"))?;
    Ok(store.load(&meta.path)?)
}
