//! Citas CLI - terminal front end for the appointment record store

use std::path::{Path, PathBuf};

use citas::appointment::{Appointment, AppointmentFields, FieldChanges};
use citas::config::{self, CitasConfig};
use citas::storage::{RecordStore, Value};
use citas::ui::{self, Icons};
use clap::{Args, Parser, Subcommand};
use owo_colors::OwoColorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "citas")]
#[command(version)]
#[command(about = "Appointment records manager backed by a local SQLite file")]
#[command(long_about = r#"
Citas keeps appointment records (client, service, date, time, status)
in a local SQLite database.

Example usage:
  citas init
  citas add --client "Ana García" --service Manicura --date 24/05/2024 --time "10:00 am" --status Pendiente
  citas search --name ana
  citas update --id 1 --status Confirmada
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the database file (overrides the config file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Path to the config file
    #[arg(long, global = true, default_value = "citas.toml")]
    config: PathBuf,

    /// Emit JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Only print tables, data and errors (same as CITAS_QUIET=1)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// All five fields, required
#[derive(Args)]
struct NewFields {
    /// Client name
    #[arg(short, long)]
    client: String,

    /// Service (Manicura, Pedicura, or free text)
    #[arg(short, long)]
    service: String,

    /// Date as dd/mm/yyyy
    #[arg(long)]
    date: String,

    /// Time slot, e.g. "10:00 am"
    #[arg(short, long)]
    time: String,

    /// Status (Confirmada, Pendiente, Cancelada)
    #[arg(long)]
    status: String,
}

/// Fields to change; missing ones keep their stored value
#[derive(Args)]
struct ChangedFields {
    #[arg(short, long)]
    client: Option<String>,

    #[arg(short, long)]
    service: Option<String>,

    #[arg(long)]
    date: Option<String>,

    #[arg(short, long)]
    time: Option<String>,

    #[arg(long)]
    status: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file and create the database
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Book a new appointment
    Add {
        #[command(flatten)]
        fields: NewFields,
    },

    /// List every appointment
    List,

    /// Show one appointment
    Show {
        #[arg(long)]
        id: i64,
    },

    /// Change an appointment
    Update {
        #[arg(long)]
        id: i64,

        #[command(flatten)]
        fields: ChangedFields,
    },

    /// Delete an appointment
    Delete {
        #[arg(long)]
        id: i64,
    },

    /// Find appointments by client name (substring)
    Search {
        #[arg(short, long)]
        name: String,
    },

    /// List the services, time slots and statuses the form offers
    Options,

    /// Appointment totals per status
    Stats,

    /// Run a raw parameterized SQL statement
    Sql {
        /// Statement, e.g. "SELECT * FROM citas WHERE estado = ?1"
        statement: String,

        /// Positional parameters, bound as text (`NULL` binds null)
        params: Vec<String>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    fn is_human(self) -> bool {
        self == OutputMode::Human
    }
}

fn emit_success(command: &str, data: serde_json::Value) -> anyhow::Result<()> {
    let envelope = serde_json::json!({
        "ok": true,
        "command": command,
        "data": data,
    });
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

fn emit_error(output_mode: OutputMode, err: &anyhow::Error) {
    match output_mode {
        OutputMode::Human => ui::error(&format!("{:#}", err)),
        OutputMode::Json => {
            let envelope = serde_json::json!({
                "ok": false,
                "error": format!("{:#}", err),
            });
            println!("{}", envelope);
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    citas::output::set_quiet(cli.quiet);

    let output_mode = if cli.json { OutputMode::Json } else { OutputMode::Human };

    if let Err(err) = run(cli, output_mode) {
        tracing::debug!(error = ?err, "command failed");
        emit_error(output_mode, &err);
        std::process::exit(1);
    }
}

fn run(cli: Cli, output_mode: OutputMode) -> anyhow::Result<()> {
    let loaded = config::load_config(Some(&cli.config))?;
    let database = config::resolve_database_path(cli.database.as_deref(), loaded.as_ref());

    match cli.command {
        Commands::Init { force } => run_init(&cli.config, &database, cli.database.is_some(), force, output_mode),
        Commands::Add { fields } => run_add(&database, fields, output_mode),
        Commands::List => run_list(&database, output_mode),
        Commands::Show { id } => run_show(&database, id, output_mode),
        Commands::Update { id, fields } => run_update(&database, id, fields, output_mode),
        Commands::Delete { id } => run_delete(&database, id, output_mode),
        Commands::Search { name } => run_search(&database, &name, output_mode),
        Commands::Options => run_options(output_mode),
        Commands::Stats => run_stats(&database, output_mode),
        Commands::Sql { statement, params } => run_sql(&database, &statement, &params, output_mode),
    }
}

fn open_store(database: &Path) -> anyhow::Result<RecordStore> {
    config::ensure_db_dir(database)?;
    tracing::debug!("opening {}", database.display());
    Ok(RecordStore::open(database)?)
}

fn not_found(id: i64) -> anyhow::Error {
    anyhow::anyhow!("no appointment with id {}", id)
}

fn run_init(
    config_path: &Path,
    database: &Path,
    database_from_flag: bool,
    force: bool,
    output_mode: OutputMode,
) -> anyhow::Result<()> {
    let wrote_config = if !config_path.exists() || force {
        let config = CitasConfig {
            database: database_from_flag.then(|| database.display().to_string()),
        };
        config::write_config(config_path, &config, force)?;
        true
    } else {
        false
    };

    let store = open_store(database)?;
    let opened = store.path().unwrap_or(database).display().to_string();

    if output_mode.is_human() {
        if wrote_config {
            ui::info("Config", &config_path.display().to_string());
        }
        ui::info("Database", &opened);
        ui::success("Ready");
    } else {
        emit_success(
            "init",
            serde_json::json!({
                "config": config_path.display().to_string(),
                "config_written": wrote_config,
                "database": opened,
            }),
        )?;
    }
    Ok(())
}

fn run_add(database: &Path, fields: NewFields, output_mode: OutputMode) -> anyhow::Result<()> {
    let fields = AppointmentFields::parse(
        &fields.client,
        &fields.service,
        &fields.date,
        &fields.time,
        &fields.status,
    )?;
    let store = open_store(database)?;
    let id = store.insert(&fields)?;
    tracing::info!(id, client = %fields.client_name, "appointment booked");

    if output_mode.is_human() {
        ui::success(&format!("Appointment {} booked for {}", id, fields.client_name));
    } else {
        emit_success("add", serde_json::to_value(Appointment { id, fields })?)?;
    }
    Ok(())
}

fn print_appointments(appointments: &[Appointment]) {
    if appointments.is_empty() {
        println!("{} No appointments found.", Icons::EMPTY);
    } else {
        println!("{}", ui::appointments_table(appointments));
    }
}

fn run_list(database: &Path, output_mode: OutputMode) -> anyhow::Result<()> {
    let store = open_store(database)?;
    let appointments = store.list()?;

    if output_mode.is_human() {
        ui::header(Icons::CALENDAR, &format!("Appointments ({})", appointments.len()));
        print_appointments(&appointments);
    } else {
        emit_success("list", serde_json::to_value(&appointments)?)?;
    }
    Ok(())
}

fn run_show(database: &Path, id: i64, output_mode: OutputMode) -> anyhow::Result<()> {
    let store = open_store(database)?;
    let appointment = store.get(id)?.ok_or_else(|| not_found(id))?;

    if output_mode.is_human() {
        let f = &appointment.fields;
        ui::header(Icons::CALENDAR, &format!("Appointment {}", appointment.id));
        ui::summary_row("Client: ", &f.client_name);
        ui::summary_row("Service:", f.service.as_str());
        ui::summary_row("Date:   ", &f.date_string());
        ui::summary_row("Time:   ", &f.time);
        ui::summary_row(
            "Status: ",
            &f.status.as_str().style(ui::status_style(&f.status)).to_string(),
        );
    } else {
        emit_success("show", serde_json::to_value(&appointment)?)?;
    }
    Ok(())
}

fn run_update(
    database: &Path,
    id: i64,
    changes: ChangedFields,
    output_mode: OutputMode,
) -> anyhow::Result<()> {
    let store = open_store(database)?;
    let current = store.get(id)?.ok_or_else(|| not_found(id))?.fields;
    let fields = current.apply(&FieldChanges {
        client_name: changes.client,
        service: changes.service,
        date: changes.date,
        time: changes.time,
        status: changes.status,
    })?;

    if !store.update(id, &fields)? {
        return Err(not_found(id));
    }
    tracing::info!(id, "appointment updated");

    if output_mode.is_human() {
        ui::success(&format!("Appointment {} updated", id));
    } else {
        emit_success("update", serde_json::to_value(Appointment { id, fields })?)?;
    }
    Ok(())
}

fn run_delete(database: &Path, id: i64, output_mode: OutputMode) -> anyhow::Result<()> {
    let store = open_store(database)?;
    if !store.delete(id)? {
        return Err(not_found(id));
    }
    tracing::info!(id, "appointment deleted");

    if output_mode.is_human() {
        ui::success(&format!("{} Appointment {} deleted", Icons::DEL, id));
    } else {
        emit_success("delete", serde_json::json!({ "id": id }))?;
    }
    Ok(())
}

fn run_search(database: &Path, name: &str, output_mode: OutputMode) -> anyhow::Result<()> {
    if name.trim().is_empty() {
        anyhow::bail!("enter a search term");
    }
    let store = open_store(database)?;
    let appointments = store.search(name)?;

    if output_mode.is_human() {
        ui::header(Icons::SEARCH, &format!("Appointments matching '{}'", name));
        print_appointments(&appointments);
    } else {
        emit_success("search", serde_json::to_value(&appointments)?)?;
    }
    Ok(())
}

fn run_options(output_mode: OutputMode) -> anyhow::Result<()> {
    use citas::appointment::{Service, Status, TIME_SLOTS};

    if output_mode.is_human() {
        println!("{}", ui::options_table());
    } else {
        emit_success(
            "options",
            serde_json::json!({
                "services": Service::known(),
                "time_slots": TIME_SLOTS,
                "statuses": Status::known(),
            }),
        )?;
    }
    Ok(())
}

fn run_stats(database: &Path, output_mode: OutputMode) -> anyhow::Result<()> {
    let store = open_store(database)?;
    let stats = store.stats()?;

    if output_mode.is_human() {
        ui::header(Icons::STATS, &format!("Citas Statistics ({})", database.display()));
        println!("{}", ui::stats_table(&stats));
    } else {
        emit_success("stats", serde_json::to_value(&stats)?)?;
    }
    Ok(())
}

fn run_sql(
    database: &Path,
    statement: &str,
    params: &[String],
    output_mode: OutputMode,
) -> anyhow::Result<()> {
    let params: Vec<Value> = params.iter().map(|p| Value::from_shell_param(p)).collect();

    let store = open_store(database)?;
    let rows = store.execute(statement, &params)?;

    if output_mode.is_human() {
        if rows.is_empty() {
            ui::success("Statement executed");
        } else {
            println!("{}", ui::rows_table(&rows));
            println!("{}", ui::dim(&format!("{} row(s)", rows.len())));
        }
    } else {
        emit_success("sql", serde_json::to_value(&rows)?)?;
    }
    Ok(())
}
