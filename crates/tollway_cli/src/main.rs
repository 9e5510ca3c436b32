//! Operator CLI for the Tollway toll database.
//!
//! # Responsibility
//! - Map subcommands one-to-one onto `TollService` operations.
//! - Print read results as JSON and failures as one line on stderr.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tollway_core::db::open_db;
use tollway_core::logging::init_stderr_logging;
use tollway_core::{
    core_version, default_log_level, init_logging, NewVehicle, SqliteTollRepository,
    TollService, UnitStatus,
};

#[derive(Parser, Debug)]
#[command(name = "tollway", about = "Toll management database tool")]
struct Cli {
    /// SQLite database file; created and migrated on first use.
    #[arg(long, env = "TOLLWAY_DB", default_value = "tollway.sqlite3")]
    db: PathBuf,

    /// trace|debug|info|warn|error
    #[arg(long, env = "TOLLWAY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files. Logs go to stderr when unset.
    #[arg(long, env = "TOLLWAY_LOG_DIR")]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the status of an on-board unit.
    UnitStatus { unit_id: i64 },
    /// Set the status of an on-board unit.
    SetUnitStatus {
        unit_id: i64,
        #[arg(value_parser = parse_status)]
        status: UnitStatus,
    },
    /// Show the user owning the vehicle behind a toll charge.
    ChargeUser { charge_id: i64 },
    /// Register a vehicle.
    RegisterVehicle {
        #[arg(long)]
        vehicle_id: i64,
        #[arg(long)]
        emission_class_id: i64,
        #[arg(long)]
        user_id: i64,
        #[arg(long)]
        plate: String,
        #[arg(long)]
        vin: String,
        #[arg(long)]
        axles: u32,
        #[arg(long)]
        weight_kg: i64,
        #[arg(long)]
        country: String,
    },
    /// Delete a vehicle with its on-board units and their charges.
    DeleteVehicle { vehicle_id: i64 },
    /// List toll segments of one road class.
    Segments { segment_type: String },
    /// Print the core version.
    Version,
}

fn parse_status(value: &str) -> Result<UnitStatus, String> {
    value.parse()
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = start_logging(&cli) {
        eprintln!("tollway: {err}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("tollway: {err}");
            ExitCode::FAILURE
        }
    }
}

fn start_logging(cli: &Cli) -> Result<(), String> {
    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    match cli.log_dir.as_deref() {
        Some(dir) => init_logging(level, dir),
        None => init_stderr_logging(level),
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Command::Version = cli.command {
        println!("tollway_core version={}", core_version());
        return Ok(());
    }

    let conn = open_db(&cli.db)?;
    let service = TollService::new(SqliteTollRepository::try_new(&conn)?);

    match cli.command {
        Command::UnitStatus { unit_id } => {
            print_json(&service.unit_status(unit_id)?)?;
        }
        Command::SetUnitStatus { unit_id, status } => {
            service.update_unit_status(unit_id, status)?;
        }
        Command::ChargeUser { charge_id } => {
            print_json(&service.user_for_charge(charge_id)?)?;
        }
        Command::RegisterVehicle {
            vehicle_id,
            emission_class_id,
            user_id,
            plate,
            vin,
            axles,
            weight_kg,
            country,
        } => {
            let vehicle = NewVehicle {
                vehicle_id,
                emission_class_id,
                user_id,
                license_plate: plate,
                vin,
                axles,
                weight_kg,
                registration_country: country,
            };
            print_json(&service.register_vehicle(&vehicle)?)?;
        }
        Command::DeleteVehicle { vehicle_id } => {
            service.delete_vehicle(vehicle_id)?;
        }
        Command::Segments { segment_type } => {
            print_json(&service.segments_by_type(&segment_type)?)?;
        }
        Command::Version => {}
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
