//! Parses an itinerary text file (or imports a CSV sheet) and prints the movement records.
//!
//! ```text
//! tafweej <itinerary.txt> <group-no> <group-name> <count> [--csv|--summary] [--day-first] [-v]
//! tafweej --import <sheet.csv> [--csv|--summary] [--day-first] [-v]
//! ```
//!
//! `--summary` prints the operations summary of the records as of today instead of the records.
use std::{error::Error, fs, io, process};

use tafweej_parser::{
    DateFormat, GroupInfo, MovementRecord, ParserOptions, TimestampIdGenerator, export_csv,
    import_csv, parse_itinerary_with, summarize,
};

const USAGE: &str = "usage: tafweej <itinerary.txt> <group-no> <group-name> <count> [--csv|--summary] [--day-first] [-v]
       tafweej --import <sheet.csv> [--csv|--summary] [--day-first] [-v]";

#[derive(Debug, Default)]
struct Args {
    positional: Vec<String>,
    import: bool,
    csv: bool,
    summary: bool,
    day_first: bool,
    verbose: bool,
}

fn read_args() -> Args {
    std::env::args()
        .skip(1)
        .fold(Args::default(), |mut args, arg| {
            match arg.as_str() {
                "--import" => args.import = true,
                "--csv" => args.csv = true,
                "--summary" => args.summary = true,
                "--day-first" => args.day_first = true,
                "-v" | "--verbose" => args.verbose = true,
                _ => args.positional.push(arg),
            }
            args
        })
}

fn run(args: &Args) -> Result<Vec<MovementRecord>, Box<dyn Error>> {
    let date_format = if args.day_first {
        DateFormat::DayFirst
    } else {
        DateFormat::Iso
    };
    let ids = TimestampIdGenerator::new();

    match (args.import, args.positional.as_slice()) {
        (true, [path]) => {
            log::info!("Importing {path}...");
            Ok(import_csv(fs::File::open(path)?, &ids, date_format)?)
        }
        (false, [path, group_no, group_name, count]) => {
            log::info!("Parsing {path}...");
            let text = fs::read_to_string(path)?;
            let group = GroupInfo::new(group_no, group_name, count);
            Ok(parse_itinerary_with(
                &text,
                &group,
                ParserOptions::new(date_format),
                &ids,
            ))
        }
        _ => Err(USAGE.into()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = read_args();
    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    simple_logger::SimpleLogger::new().with_level(level).init()?;

    let records = match run(&args) {
        Ok(records) => records,
        Err(e) => {
            log::error!("{e}");
            process::exit(1);
        }
    };

    if args.summary {
        let today = chrono::Local::now().date_naive();
        serde_json::to_writer_pretty(io::stdout().lock(), &summarize(&records, today))?;
        println!();
    } else if args.csv {
        export_csv(io::stdout().lock(), &records)?;
    } else {
        serde_json::to_writer_pretty(io::stdout().lock(), &records)?;
        println!();
    }
    Ok(())
}
