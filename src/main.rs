//! hdcat command-line interface.
//!
//! Wires the pieces together: a folder source feeds the ingestion pipeline,
//! the pipeline feeds the catalog store, and every other command is a read
//! over the store (optionally sweetened by the fail-closed assist layer).

mod output;

use clap::{Parser, Subcommand};
use hdcat_assist::{AssistClient, SAMPLE_LIMIT, suggest_organization, translate_query};
use hdcat_catalog::{Database, FileKind, Repository};
use hdcat_config::Config;
use hdcat_library::{SearchFilter, ingest, search, usage_by_drive, usage_by_kind};
use hdcat_scan::{FolderSource, LocalFolder};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "hdcat", version, about = "Catalog external drives and search them offline")]
struct Cli {
    /// Explicit configuration file (defaults to the platform config dir).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Override the catalog database location.
    #[arg(long, global = true, value_name = "FILE")]
    database: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Catalog a folder (or mounted drive) under a label.
    Import {
        /// Label for the drive, e.g. "HD Externo Backup".
        name: String,
        /// Root of the folder tree to catalog.
        folder: PathBuf,
    },
    /// List cataloged drives.
    Drives,
    /// Search cataloged files.
    Search {
        /// Substring to match against file names and paths.
        query: Option<String>,
        /// Restrict to one kind (imagem, video, audio, ...).
        #[arg(long)]
        kind: Option<String>,
        /// Restrict to one drive id.
        #[arg(long)]
        drive: Option<i64>,
        /// Minimum file size in megabytes.
        #[arg(long)]
        min_size_mb: Option<f64>,
        /// 1-based result page.
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Show catalog totals and usage summaries.
    Stats,
    /// Translate a natural-language question into a search and run it.
    Ask { text: String },
    /// Ask for organization advice over a sample of the catalog.
    Suggest,
    /// Delete a drive and all of its file records.
    Forget { drive_id: i64 },
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        },
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hdcat=info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

async fn run(cli: Cli) -> CliResult {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(database) = cli.database {
        config.database.path = database;
    }
    if let Some(parent) = config.database.path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let db = Database::connect(&config.database.path).await?;
    let repo = Repository::from(&db);
    let result = dispatch(cli.command, &config, &repo).await;
    db.close().await;
    result
}

async fn dispatch(command: Command, config: &Config, repo: &Repository) -> CliResult {
    match command {
        Command::Import { name, folder } => {
            let folder = std::path::absolute(&folder)?;
            let source = LocalFolder::new(name.clone(), &folder)?;
            tracing::info!(folder = %folder.display(), "listing folder");
            let entries = source.list().await?;
            let count = entries.len();
            let bytes: u64 = entries.iter().map(|entry| entry.size).sum();
            let drive_id = ingest(repo, &name, entries, config.import.empty_drives).await?;
            println!(
                "Cataloged drive \"{name}\" (id {drive_id}): {count} file(s), {}",
                output::human_size(bytes)
            );
        },
        Command::Drives => {
            output::print_drives(&repo.list_drives().await?);
        },
        Command::Search { query, kind, drive, min_size_mb, page } => {
            let filter = SearchFilter {
                query,
                kind: kind.as_deref().map(parse_kind).transpose()?,
                drive_id: drive,
                min_size: min_size_mb.map(|mb| (mb * 1024.0 * 1024.0) as u64),
            };
            let results = search(repo, &filter).await?;
            output::print_page(&results, page);
        },
        Command::Stats => {
            let drives = repo.list_drives().await?;
            if drives.is_empty() {
                println!("Nothing cataloged yet.");
                return Ok(());
            }
            let total_size: u64 = drives.iter().map(|drive| drive.total_size).sum();
            let total_files: u64 = drives.iter().map(|drive| drive.total_files).sum();
            println!(
                "{} drive(s), {} file(s), {} total",
                drives.len(),
                total_files,
                output::human_size(total_size)
            );
            let files = search(repo, &SearchFilter::default()).await?;
            output::print_kind_usage(&usage_by_kind(&files));
            output::print_drive_usage(&usage_by_drive(&drives));
        },
        Command::Ask { text } => {
            let client = assist_client(config);
            let filter = match translate_query(&client, &text).await {
                Some(translated) => {
                    // Labels the model invents outside the taxonomy are
                    // dropped rather than failing the search.
                    let kind = translated.kind.as_deref().and_then(|k| k.parse::<FileKind>().ok());
                    SearchFilter {
                        query: translated.query.clone(),
                        kind,
                        drive_id: None,
                        min_size: translated.min_size_bytes(),
                    }
                },
                None => {
                    println!("Could not translate the question; searching for the literal text.");
                    SearchFilter { query: Some(text.clone()), ..Default::default() }
                },
            };
            describe_filter(&filter);
            let results = search(repo, &filter).await?;
            output::print_page(&results, 1);
        },
        Command::Suggest => {
            let sample = repo.sample_files(SAMPLE_LIMIT).await?;
            if sample.is_empty() {
                println!("Catalog is empty; nothing to analyze.");
                return Ok(());
            }
            let descriptors: Vec<String> = sample
                .iter()
                .map(|(path, size)| format!("{path} ({:.1}MB)", *size as f64 / 1024.0 / 1024.0))
                .collect();
            let client = assist_client(config);
            println!("{}", suggest_organization(&client, &descriptors).await);
        },
        Command::Forget { drive_id } => {
            let drive = repo.get_drive(drive_id).await?;
            repo.delete_drive(drive_id).await?;
            println!("Forgot drive \"{}\" (id {drive_id}) and its records.", drive.name);
        },
    }
    Ok(())
}

fn parse_kind(label: &str) -> Result<FileKind, Box<dyn std::error::Error>> {
    label.parse::<FileKind>().map_err(|_| {
        format!("unknown kind {label:?} (expected one of: {})", FileKind::ALL.map(|k| k.as_str()).join(", "))
            .into()
    })
}

fn assist_client(config: &Config) -> AssistClient {
    let client = AssistClient::new(config.assist.api_key.clone());
    match &config.assist.model {
        Some(model) => client.with_model(model),
        None => client,
    }
}

fn describe_filter(filter: &SearchFilter) {
    let mut parts = Vec::new();
    if let Some(query) = &filter.query {
        parts.push(format!("text {query:?}"));
    }
    if let Some(kind) = filter.kind {
        parts.push(format!("kind {kind}"));
    }
    if let Some(min_size) = filter.min_size {
        parts.push(format!("at least {}", output::human_size(min_size)));
    }
    match parts.is_empty() {
        true => println!("Searching with no filters."),
        false => println!("Searching for: {}", parts.join(", ")),
    }
}
