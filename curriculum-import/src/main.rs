//! curriculum-import - curriculum spreadsheet importer
//!
//! Imports program workbooks into the SQLite store and prints listings,
//! program details and competency analyses as JSON on stdout. Logs go to
//! stderr (or the configured log file).

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use curriculum_common::config::{
    load_config_or_default, load_toml_config, ConfigLoad, ConfigSource, LoggingConfig,
    RootFolderInitializer, RootFolderResolver,
};
use curriculum_common::db::init_database;
use curriculum_import::db::ProgramFilter;
use curriculum_import::services::directory_walker::infer_year;
use curriculum_import::{CurriculumService, WorkbookSource};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "curriculum-import", version, about = "Curriculum spreadsheet import and competency analysis")]
struct Cli {
    /// Root folder holding the database
    #[arg(long, global = true)]
    root_folder: Option<PathBuf>,

    /// Database file (overrides <root-folder>/curriculum.db)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Config file (overrides the platform config location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Import every workbook under a directory
    ImportDir {
        dir: PathBuf,
        /// Workbooks imported concurrently
        #[arg(long)]
        jobs: Option<usize>,
    },
    /// Import one workbook; `-` reads it from stdin
    Import {
        file: String,
        /// Academic year (inferred from a Fit_<year> folder when omitted)
        #[arg(long)]
        year: Option<i32>,
    },
    /// List programs
    List {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        year_from: Option<i32>,
        #[arg(long)]
        year_to: Option<i32>,
        #[arg(long)]
        faculty: Option<String>,
        #[arg(long)]
        level: Option<String>,
    },
    /// Show a program with its disciplines
    Show { id: Uuid },
    /// Competency analysis of a program
    Analyze { id: Uuid },
    /// Competency analyses of several programs side by side
    Compare {
        #[arg(required = true)]
        ids: Vec<Uuid>,
    },
    /// Delete all programs, disciplines and dictionaries
    Reset {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_source(file: &str) -> Result<WorkbookSource> {
    if file == "-" {
        let mut bytes = Vec::new();
        std::io::stdin()
            .read_to_end(&mut bytes)
            .context("Failed to read workbook from stdin")?;
        Ok(WorkbookSource::from_bytes("<stdin>", bytes))
    } else {
        Ok(WorkbookSource::from_path(file))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // An explicit --config must parse; the platform file only warns
    let loaded = match &cli.config {
        Some(path) => ConfigLoad {
            config: load_toml_config(path)?,
            source: ConfigSource::File(path.clone()),
        },
        None => load_config_or_default(),
    };

    init_tracing(&loaded.config.logging)?;
    loaded.log();
    let config = loaded.config;

    info!(
        "Starting curriculum-import v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let db_path = match &cli.database {
        Some(path) => path.clone(),
        None => {
            let root_folder = RootFolderResolver::new()
                .with_cli_arg(cli.root_folder.clone())
                .with_toml_config(config.clone())
                .resolve();
            let initializer = RootFolderInitializer::new(root_folder);
            initializer
                .ensure_directory_exists()
                .context("Failed to initialize root folder")?;
            initializer.database_path()
        }
    };
    info!("Database: {}", db_path.display());

    let pool = init_database(&db_path).await?;
    let service = CurriculumService::new(pool).with_import_config(&config.import);

    match cli.command {
        Command::ImportDir { dir, jobs } => {
            let jobs = jobs.unwrap_or(config.import.max_concurrent_jobs);
            let report = service.import_directory(&dir, jobs).await?;
            print_json(&report)?;
        }
        Command::Import { file, year } => {
            let year = year.or_else(|| infer_year(Path::new(&file)));
            let source = read_source(&file)?;
            let summary = service.import_program(source, year).await?;
            print_json(&summary)?;
        }
        Command::List {
            year,
            year_from,
            year_to,
            faculty,
            level,
        } => {
            let filter = ProgramFilter {
                year,
                year_from,
                year_to,
                faculty,
                education_level: level,
            };
            print_json(&service.list_programs(&filter).await?)?;
        }
        Command::Show { id } => print_json(&service.program_detail(id).await?)?,
        Command::Analyze { id } => print_json(&service.get_competency_analysis(id).await?)?,
        Command::Compare { ids } => print_json(&service.compare(&ids).await?)?,
        Command::Reset { yes } => {
            if !yes {
                bail!("Refusing to delete all curriculum data without --yes");
            }
            print_json(&service.reset().await?)?;
        }
    }

    Ok(())
}
