//! Console entry point for the payroll service.
//!
//! # Responsibility
//! - Parse command-line arguments and wire up the service facade.
//! - Report failures cleanly and exit non-zero instead of panicking.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use payroll_core::{
    open_db, IoTarget, JsonRosterFile, PayrollService, RosterFile, SchemaVariant,
    SqliteDenormalisedStore, SqliteNormalisedStore, UpdateMode,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "payroll")]
#[command(about = "Employee payroll records across console, file and database backends")]
#[command(version)]
struct Cli {
    /// SQLite database path.
    #[arg(long, value_name = "PATH", default_value = "payroll.db")]
    db: PathBuf,

    /// Flat-file roster path.
    #[arg(long, value_name = "PATH", default_value = "roster.json")]
    file: PathBuf,

    /// Directory for rolling log files. Logging is off when omitted.
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Log level used with --log-dir.
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add an employee; missing fields are prompted for interactively
    Add(AddArgs),

    /// List records from the file or database backend
    List(ListArgs),

    /// Write the database roster to the console or the file backend
    Write(WriteArgs),

    /// Count records held by a backend
    Count(CountArgs),

    /// Update a stored salary and reconcile the in-memory roster
    Update(UpdateArgs),

    /// Check whether the file roster snapshot is in sync with the database
    Sync(SyncArgs),

    /// List employees whose start date falls in a date range
    Range(RangeArgs),

    /// Report the average salary per gender
    AvgSalary,
}

#[derive(Args)]
struct AddArgs {
    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    salary: Option<f64>,

    /// Start date as YYYY-MM-DD.
    #[arg(long)]
    start_date: Option<String>,

    #[arg(long)]
    gender: Option<String>,
}

#[derive(Args)]
struct ListArgs {
    #[arg(long, value_enum, default_value_t = SourceArg::Db)]
    source: SourceArg,

    #[arg(long, value_enum, default_value_t = SchemaArg::Denormalised)]
    schema: SchemaArg,
}

#[derive(Args)]
struct WriteArgs {
    #[arg(long, value_enum, default_value_t = TargetArg::Console)]
    target: TargetArg,

    #[arg(long, value_enum, default_value_t = SchemaArg::Denormalised)]
    schema: SchemaArg,
}

#[derive(Args)]
struct CountArgs {
    #[arg(long, value_enum, default_value_t = SourceArg::File)]
    source: SourceArg,
}

#[derive(Args)]
struct UpdateArgs {
    name: String,

    salary: f64,

    #[arg(long, value_enum, default_value_t = SchemaArg::Denormalised)]
    schema: SchemaArg,

    /// Execute the update through a cached prepared statement.
    #[arg(long)]
    prepared: bool,
}

impl UpdateArgs {
    fn mode(&self) -> UpdateMode {
        if self.prepared {
            UpdateMode::Prepared
        } else {
            UpdateMode::Direct
        }
    }
}

#[derive(Args)]
struct SyncArgs {
    name: String,

    #[arg(long, value_enum, default_value_t = SchemaArg::Denormalised)]
    schema: SchemaArg,
}

#[derive(Args)]
struct RangeArgs {
    /// Range start as YYYY-MM-DD, inclusive.
    from: String,

    /// Range end as YYYY-MM-DD, inclusive.
    to: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum SourceArg {
    File,
    Db,
}

impl From<SourceArg> for IoTarget {
    fn from(value: SourceArg) -> Self {
        match value {
            SourceArg::File => IoTarget::File,
            SourceArg::Db => IoTarget::Database,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum TargetArg {
    Console,
    File,
}

impl TargetArg {
    fn writes_to_file(self) -> bool {
        matches!(self, Self::File)
    }
}

impl From<TargetArg> for IoTarget {
    fn from(value: TargetArg) -> Self {
        match value {
            TargetArg::Console => IoTarget::Console,
            TargetArg::File => IoTarget::File,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SchemaArg {
    Denormalised,
    Normalised,
}

impl From<SchemaArg> for SchemaVariant {
    fn from(value: SchemaArg) -> Self {
        match value {
            SchemaArg::Denormalised => SchemaVariant::Denormalised,
            SchemaArg::Normalised => SchemaVariant::Normalised,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Some(log_dir) = &cli.log_dir {
        let level = cli
            .log_level
            .as_deref()
            .unwrap_or_else(|| payroll_core::default_log_level());
        payroll_core::init_logging(level, &log_dir.to_string_lossy())
            .map_err(anyhow::Error::msg)?;
    }

    let conn = open_db(&cli.db)?;
    let file_store = JsonRosterFile::new(&cli.file);

    // The sync command compares the on-disk roster snapshot against the
    // database, so it alone starts from a file-seeded roster.
    let seed = match &cli.command {
        Commands::Sync(_) => file_store.read_all()?,
        _ => Vec::new(),
    };

    let mut service = PayrollService::with_roster(
        SqliteDenormalisedStore::new(&conn),
        SqliteNormalisedStore::new(&conn),
        file_store,
        seed,
    );

    match cli.command {
        Commands::Add(args) => commands::handle_add(&mut service, &args),
        Commands::List(args) => commands::handle_list(&mut service, &args),
        Commands::Write(args) => commands::handle_write(&mut service, &args),
        Commands::Count(args) => commands::handle_count(&service, &args),
        Commands::Update(args) => commands::handle_update(&mut service, &args),
        Commands::Sync(args) => commands::handle_sync(&service, &args),
        Commands::Range(args) => commands::handle_range(&service, &args),
        Commands::AvgSalary => commands::handle_avg_salary(&service),
    }
}
