//! Interactive text menu over the survey record service.
//!
//! # Responsibility
//! - Own all prompting, confirmation and console formatting.
//! - Render service results and errors as user-facing messages.
//!
//! The core service owns parsing, storage and positional translation; this
//! binary never touches SQL or the CSV format directly.

use std::io::{self, Write};
use std::process::ExitCode;

use tideline_core::{
    db, default_log_level, init_logging, RecordRepository, RecordService, SqliteRecordRepository,
    SurveyRecord,
};

const DEFAULT_SOURCE_PATH: &str = "data/intertidal_clams.csv";
const DEFAULT_DB_PATH: &str = "survey.db";

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let source_path = args
        .next()
        .unwrap_or_else(|| DEFAULT_SOURCE_PATH.to_string());
    let db_path = args.next().unwrap_or_else(|| DEFAULT_DB_PATH.to_string());

    if let Err(err) = init_cli_logging() {
        eprintln!("warning: file logging unavailable: {err}");
    }

    let mut conn = match db::open_db(&db_path) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("ERROR: cannot open database `{db_path}`: {err}");
            return ExitCode::FAILURE;
        }
    };
    let repo = match SqliteRecordRepository::try_new(&mut conn) {
        Ok(repo) => repo,
        Err(err) => {
            eprintln!("ERROR: database `{db_path}` is not usable: {err}");
            return ExitCode::FAILURE;
        }
    };
    let mut service = RecordService::new(repo, source_path);

    println!("=== Tideline Survey Records ===");
    initial_load(&mut service);
    run_menu(&mut service);
    ExitCode::SUCCESS
}

fn init_cli_logging() -> Result<(), String> {
    let log_dir = std::env::current_dir()
        .map_err(|err| format!("cannot determine working directory: {err}"))?
        .join("logs");
    let log_dir = log_dir
        .to_str()
        .ok_or_else(|| "log directory path is not valid UTF-8".to_string())?
        .to_string();
    init_logging(default_log_level(), &log_dir)
}

fn initial_load<R: RecordRepository>(service: &mut RecordService<R>) {
    match service.ensure_loaded() {
        Ok(count) => println!("Loaded {count} records.\n"),
        Err(err) => {
            println!("ERROR: {err}");
            println!("Starting with an empty store.\n");
        }
    }
}

fn run_menu<R: RecordRepository>(service: &mut RecordService<R>) {
    loop {
        print_menu(service);
        match prompt("Enter your choice: ").as_str() {
            "1" => reload_menu(service),
            "2" => display_menu(service),
            "3" => create_menu(service),
            "4" => edit_menu(service),
            "5" => delete_menu(service),
            "6" => {
                println!("\nGoodbye.");
                return;
            }
            _ => println!("\nInvalid choice. Please try again.\n"),
        }
    }
}

fn print_menu<R: RecordRepository>(service: &mut RecordService<R>) {
    println!("\n=== MAIN MENU ===");
    match service.record_count() {
        Ok(count) => println!("Current records: {count}"),
        Err(err) => println!("Current records: unavailable ({err})"),
    }
    println!("\n1. Reload data from CSV source (replaces all records)");
    println!("2. Display records");
    println!("3. Create new record");
    println!("4. Edit existing record");
    println!("5. Delete record");
    println!("6. Exit");
}

fn reload_menu<R: RecordRepository>(service: &mut RecordService<R>) {
    println!("\nReloading replaces all existing records.");
    if !confirm("Are you sure? (yes/no): ") {
        println!("Reload cancelled.");
        return;
    }
    match service.reload_from_source() {
        Ok(count) => println!("Reloaded {count} records from {}.", service.source_path().display()),
        Err(err) => println!("ERROR: {err}"),
    }
}

fn display_menu<R: RecordRepository>(service: &mut RecordService<R>) {
    println!("\n1. Display single record");
    println!("2. Display all records");
    match prompt("Enter choice: ").as_str() {
        "1" => display_single(service),
        "2" => display_all(service),
        _ => println!("Invalid choice."),
    }
}

fn display_single<R: RecordRepository>(service: &mut RecordService<R>) {
    let Some(position) = prompt_position(service) else {
        return;
    };
    match service.get_by_position(position) {
        Ok(Some(record)) => {
            println!("\n=== Record #{position} ===");
            println!("{record}");
        }
        Ok(None) => println!("No record at position {position}."),
        Err(err) => println!("ERROR: {err}"),
    }
}

fn display_all<R: RecordRepository>(service: &mut RecordService<R>) {
    match service.get_all() {
        Ok(records) => {
            println!("\n=== ALL RECORDS ({} total) ===", records.len());
            for (index, record) in records.iter().enumerate() {
                println!("Record #{}: {record}", index + 1);
            }
        }
        Err(err) => println!("ERROR: {err}"),
    }
}

fn create_menu<R: RecordRepository>(service: &mut RecordService<R>) {
    println!("\n=== CREATE NEW RECORD ===");
    let record = SurveyRecord::new(
        prompt("Site identification: "),
        prompt("Year: "),
        prompt("Transect: "),
        prompt("Quadrat: "),
        prompt("Species common name: "),
        prompt("Count: "),
    );
    match service.create(&record) {
        Ok(id) => println!("\nRecord created with id {id}."),
        Err(err) => println!("ERROR: {err}"),
    }
}

fn edit_menu<R: RecordRepository>(service: &mut RecordService<R>) {
    let Some(position) = prompt_position(service) else {
        return;
    };
    let existing = match service.get_by_position(position) {
        Ok(Some(record)) => record,
        Ok(None) => {
            println!("No record at position {position}.");
            return;
        }
        Err(err) => {
            println!("ERROR: {err}");
            return;
        }
    };

    println!("\nCurrent record: {existing}");
    println!("Enter new values (press Enter to keep the current value):");
    let updated = SurveyRecord::new(
        prompt_or("Site", &existing.site),
        prompt_or("Year", &existing.year),
        prompt_or("Transect", &existing.transect),
        prompt_or("Quadrat", &existing.quadrat),
        prompt_or("Species", &existing.species),
        prompt_or("Count", &existing.count),
    );

    match service.update_by_position(position, &updated) {
        Ok(true) => println!("\nRecord updated."),
        Ok(false) => println!("\nRecord is no longer at position {position}."),
        Err(err) => println!("ERROR: {err}"),
    }
}

fn delete_menu<R: RecordRepository>(service: &mut RecordService<R>) {
    let Some(position) = prompt_position(service) else {
        return;
    };
    match service.get_by_position(position) {
        Ok(Some(record)) => {
            println!("\nRecord to delete: {record}");
            if !confirm("Are you sure? (yes/no): ") {
                println!("Deletion cancelled.");
                return;
            }
            match service.delete_by_position(position) {
                Ok(true) => println!("Record deleted."),
                Ok(false) => println!("Record is no longer at position {position}."),
                Err(err) => println!("ERROR: {err}"),
            }
        }
        Ok(None) => println!("No record at position {position}."),
        Err(err) => println!("ERROR: {err}"),
    }
}

fn prompt_position<R: RecordRepository>(service: &mut RecordService<R>) -> Option<usize> {
    let upper = service.record_count().unwrap_or(0);
    let input = prompt(&format!("Enter record number (1-{upper}): "));
    match input.parse::<usize>() {
        Ok(position) => Some(position),
        Err(_) => {
            println!("Not a valid record number: `{input}`");
            None
        }
    }
}

fn prompt(label: &str) -> String {
    print!("{label}");
    let _ = io::stdout().flush();
    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return String::new();
    }
    input.trim().to_string()
}

fn prompt_or(label: &str, current: &str) -> String {
    let input = prompt(&format!("{label} [{current}]: "));
    if input.is_empty() {
        current.to_string()
    } else {
        input
    }
}

fn confirm(label: &str) -> bool {
    prompt(label).eq_ignore_ascii_case("yes")
}
