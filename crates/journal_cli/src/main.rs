//! Command-line front end for the journal record store.
//!
//! # Responsibility
//! - Load config, start file logging, open the store once per invocation.
//! - Print one line per record so output stays easy to grep and diff.

use clap::{Parser, Subcommand};
use journal_core::db::{open_db, open_db_in_memory};
use journal_core::{
    core_version, init_logging_from_config, BlobRepository, CatalogService, JournalConfig,
    Paper, PaperSearchQuery, RecordStore, SqliteBlobRepository, Volume,
};
use log::info;
use std::error::Error;
use std::path::PathBuf;

/// Inspect and administer the journal record store
#[derive(Parser)]
#[command(name = "journal")]
#[command(version, about, long_about = None)]
struct Cli {
    /// TOML config file; a missing file means defaults
    #[arg(long, env = "JOURNAL_CONFIG", default_value = "journal.toml", global = true)]
    config: PathBuf,

    /// SQLite database file, overriding `db_path` from the config
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List volumes, newest first, with paper counts
    Volumes,
    /// List papers in insertion order
    Papers {
        /// Only papers of this volume
        #[arg(long)]
        volume: Option<String>,
    },
    /// Case-insensitive substring search over papers
    Search {
        query: String,

        /// Only hits from this volume
        #[arg(long)]
        volume: Option<String>,

        /// Maximum number of hits
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Delete a volume and every paper in it
    DeleteVolume { id: String },
    /// Delete a single paper
    DeletePaper { id: String },
    /// Print both collections as one JSON document
    Export,
    /// Print version, storage and dataset summary
    Info,
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Self::Volumes => "volumes",
            Self::Papers { .. } => "papers",
            Self::Search { .. } => "search",
            Self::DeleteVolume { .. } => "delete_volume",
            Self::DeletePaper { .. } => "delete_paper",
            Self::Export => "export",
            Self::Info => "info",
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let mut config = JournalConfig::load(&cli.config)?;
    if let Some(db) = cli.db {
        config.db_path = Some(db);
    }
    init_logging_from_config(&config)?;

    let mut conn = match &config.db_path {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let repo = SqliteBlobRepository::try_new(&mut conn)?;
    let mut store = RecordStore::open(repo, config.store);

    info!(
        "event=cli_command module=cli status=start command={}",
        cli.command.name()
    );
    run(cli.command, &mut store, &config)
}

fn run<R: BlobRepository>(
    command: Commands,
    store: &mut RecordStore<R>,
    config: &JournalConfig,
) -> Result<(), Box<dyn Error>> {
    match command {
        Commands::Volumes => {
            for entry in CatalogService::new(&*store).archive_volumes(None) {
                println!("{}  papers={}", volume_line(&entry.volume), entry.paper_count);
            }
        }
        Commands::Papers { volume } => {
            let papers = match volume {
                Some(volume_id) => store.get_papers_by_volume(&volume_id),
                None => store.papers().to_vec(),
            };
            for paper in &papers {
                println!("{}", paper_line(paper));
            }
        }
        Commands::Search {
            query,
            volume,
            limit,
        } => {
            let query = PaperSearchQuery {
                text: query,
                volume_id: volume,
                limit,
            };
            let hits = store.search(&query);
            for paper in &hits {
                println!("{}", paper_line(paper));
            }
            if hits.is_empty() {
                println!("no papers found");
            }
        }
        Commands::DeleteVolume { id } => {
            let deletion = store.delete_volume(&id);
            println!(
                "volume_removed={} papers_removed={}",
                deletion.volume_removed, deletion.papers_removed
            );
        }
        Commands::DeletePaper { id } => {
            println!("paper_removed={}", store.delete_paper(&id));
        }
        Commands::Export => {
            println!("{}", store.export_snapshot()?);
        }
        Commands::Info => {
            let stats = CatalogService::new(&*store).dashboard_stats();
            let storage = config
                .db_path
                .as_ref()
                .map_or_else(|| ":memory:".to_string(), |path| path.display().to_string());
            println!("journal_core version={}", core_version());
            println!("storage={storage}");
            println!("loaded_from={:?}", store.load_source());
            println!(
                "seed_when_empty={} enforce_unique_issue_numbers={}",
                store.options().seed_when_empty,
                store.options().enforce_unique_issue_numbers
            );
            println!(
                "volumes={} papers={} authors={}",
                stats.volumes, stats.papers, stats.authors
            );
        }
    }

    Ok(())
}

fn volume_line(volume: &Volume) -> String {
    format!(
        "{}  vol.{}  {}-{:02}  {}",
        volume.id, volume.issue_number, volume.year, volume.month, volume.title
    )
}

fn paper_line(paper: &Paper) -> String {
    let authors = paper
        .authors
        .iter()
        .map(|author| author.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{}  [{}]  {}  {}  ({})",
        paper.id, paper.volume_id, paper.publication_date, paper.title, authors
    )
}
