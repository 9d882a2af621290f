//! circle-settlement CLI
//!
//! Keep a purchase ledger on disk and work out who owes whom.
//!
//! # Usage
//!
//! ```bash
//! # Log a purchase
//! circle-settlement add --registrant alice --buyer bob --amount 1500 --day 1
//!
//! # Settle it at the actual price
//! circle-settlement edit --id 1 --actual 1400
//! circle-settlement complete --id 1
//!
//! # Who is owed what
//! circle-settlement summary --day 1
//!
//! # What bob owes alice after offsetting
//! circle-settlement net --buyer bob --registrant alice --format json
//! ```

use circle_settlement::core::normalize::RawRecord;
use circle_settlement::core::participant::{Day, ParticipantId};
use circle_settlement::core::record::{PurchaseRecord, RecordDraft, RecordId};
use circle_settlement::error::{Result, SettlementError};
use circle_settlement::settlement::aggregation::aggregate_from_store;
use circle_settlement::settlement::netting::NettingEngine;
use circle_settlement::simulation::generator::{generate_random_ledger, LedgerConfig};
use circle_settlement::store::memory::{InMemoryStore, LedgerSnapshot};
use circle_settlement::store::LedgerStore;
use log::debug;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::process;

const STORE_ENV: &str = "CIRCLE_LEDGER";
const DEFAULT_STORE: &str = "ledger.json";

const RECORD_FLAGS: &[&str] = &[
    "--name",
    "--place",
    "--area",
    "--memo",
    "--buyer",
    "--registrant",
    "--amount",
    "--actual",
    "--day",
];

fn print_usage() {
    eprintln!(
        r#"circle-settlement — purchase ledger and settlement netting for circle runs

USAGE:
    circle-settlement <COMMAND> [OPTIONS]

COMMANDS:
    add         Log a new purchase record
    list        List purchase records, newest first
    show        Show one purchase record
    edit        Change fields of a purchase record
    delete      Delete a purchase record
    complete    Mark a record settled (fills a missing actual amount)
    uncomplete  Mark a record pending again
    summary     What each registrant is owed, grouped by buyer
    net         Net balance a buyer owes a registrant
    generate    Generate a random ledger (for testing)
    help        Show this message

OPTIONS (all commands except generate):
    --store <FILE>      Ledger file (default: $CIRCLE_LEDGER or ledger.json)

OPTIONS (add, edit):
    --name <TEXT>  --place <TEXT>  --area <TEXT>  --memo <TEXT>
    --buyer <NAME>  --registrant <NAME>  --day <DAY>
    --amount <N>        Estimated amount
    --actual <N>        Actual settled amount
    Passing an empty value on edit clears the field.

OPTIONS (show, edit, delete, complete, uncomplete):
    --id <N>            Record id

OPTIONS (list, summary, net):
    --day <DAY>         Only records for this day
    --format <FORMAT>   Output format: text (default) or json

OPTIONS (net):
    --buyer <NAME>      Participant who owes
    --registrant <NAME> Participant who is owed

OPTIONS (generate):
    --participants <N>  Number of participants (default: 10)
    --records <N>       Number of records (default: 30)
    --days <LIST>       Comma-separated day labels (default: 1,2)
    --output <FILE>     Write to file instead of stdout

EXAMPLES:
    circle-settlement add --registrant alice --buyer bob --amount 1500 --day 1
    circle-settlement complete --id 1
    circle-settlement summary --day 1 --format json
    circle-settlement net --buyer bob --registrant alice
    circle-settlement generate --participants 5 --records 50 --output ledger.json"#
    );
}

/// `--flag value` pairs given to one command.
struct Options {
    values: HashMap<String, String>,
}

impl Options {
    fn parse(args: &[String], allowed: &[&str]) -> Result<Self> {
        let mut values = HashMap::new();
        let mut i = 0;
        while i < args.len() {
            let flag = args[i].as_str();
            if !allowed.contains(&flag) {
                return Err(SettlementError::InvalidArgument(format!(
                    "unknown option: {}",
                    flag
                )));
            }
            let value = args.get(i + 1).ok_or_else(|| {
                SettlementError::InvalidArgument(format!("{} requires a value", flag))
            })?;
            values.insert(flag.to_string(), value.clone());
            i += 2;
        }
        Ok(Self { values })
    }

    fn get(&self, flag: &str) -> Option<&str> {
        self.values.get(flag).map(String::as_str)
    }

    fn day(&self) -> Option<Day> {
        self.get("--day")
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(Day::new)
    }

    fn json(&self) -> Result<bool> {
        match self.get("--format").unwrap_or("text") {
            "text" => Ok(false),
            "json" => Ok(true),
            other => Err(SettlementError::InvalidArgument(format!(
                "--format must be 'text' or 'json', got '{}'",
                other
            ))),
        }
    }

    fn id(&self) -> Result<RecordId> {
        let raw = self
            .get("--id")
            .ok_or_else(|| SettlementError::InvalidArgument("--id <N> is required".to_string()))?;
        match raw.trim().parse::<u64>() {
            Ok(id) if id > 0 => Ok(RecordId::new(id)),
            _ => Err(SettlementError::MalformedInput {
                field: "record id",
                value: raw.to_string(),
            }),
        }
    }

    fn count(&self, flag: &str, default: usize) -> Result<usize> {
        match self.get(flag) {
            None => Ok(default),
            Some(raw) => raw.trim().parse().map_err(|_| SettlementError::MalformedInput {
                field: "count",
                value: raw.to_string(),
            }),
        }
    }

    fn store_path(&self) -> PathBuf {
        self.get("--store")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os(STORE_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE))
    }

    /// Raw submission from the record flags that were given.
    fn raw_record(&self) -> RawRecord {
        let field = |flag: &str| {
            self.get(flag)
                .map(|v| Value::String(v.to_string()))
                .unwrap_or(Value::Null)
        };
        RawRecord {
            name: field("--name"),
            place: field("--place"),
            area: field("--area"),
            memo: field("--memo"),
            buyer: field("--buyer"),
            registrant: field("--registrant"),
            amount: field("--amount"),
            actual_amount: field("--actual"),
            day: field("--day"),
        }
    }

    /// Overlay the given record flags on an existing draft.
    fn overlay(&self, mut draft: RecordDraft) -> RecordDraft {
        let fresh = self.raw_record().normalize();
        if self.get("--name").is_some() {
            draft.name = fresh.name;
        }
        if self.get("--place").is_some() {
            draft.place = fresh.place;
        }
        if self.get("--area").is_some() {
            draft.area = fresh.area;
        }
        if self.get("--memo").is_some() {
            draft.memo = fresh.memo;
        }
        if self.get("--buyer").is_some() {
            draft.buyer = fresh.buyer;
        }
        if self.get("--registrant").is_some() {
            draft.registrant = fresh.registrant;
        }
        if self.get("--amount").is_some() {
            draft.amount = fresh.amount;
        }
        if self.get("--actual").is_some() {
            draft.actual_amount = fresh.actual_amount;
        }
        if self.get("--day").is_some() {
            draft.day = fresh.day;
        }
        draft
    }
}

fn with_flags(extra: &[&'static str]) -> Vec<&'static str> {
    let mut flags = vec!["--store"];
    flags.extend_from_slice(extra);
    flags
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_record(record: &PurchaseRecord) {
    let text = |v: Option<&str>| v.unwrap_or("-").to_string();
    let amount = |v: Option<i64>| v.map(|a| a.to_string()).unwrap_or_else(|| "-".to_string());
    println!(
        "#{:<5} {:<20} {:<15} -> {:<15} est {:>8}  actual {:>8}  day {:<4} {}",
        record.id().get(),
        text(record.name()),
        text(record.buyer().map(ParticipantId::as_str)),
        text(record.registrant().map(ParticipantId::as_str)),
        amount(record.amount()),
        amount(record.actual_amount()),
        text(record.day().map(Day::as_str)),
        if record.completed() { "[done]" } else { "[pending]" },
    );
    if let Some(place) = record.place() {
        println!("       place: {} {}", record.area().unwrap_or(""), place);
    }
    if let Some(memo) = record.memo() {
        println!("       memo:  {}", memo);
    }
}

fn open_store(opts: &Options) -> Result<(InMemoryStore, PathBuf)> {
    let path = opts.store_path();
    debug!("using ledger {}", path.display());
    Ok((InMemoryStore::load(&path)?, path))
}

fn cmd_add(args: &[String]) -> Result<()> {
    let opts = Options::parse(args, &with_flags(RECORD_FLAGS))?;
    let (store, path) = open_store(&opts)?;
    let record = store.insert(opts.raw_record().normalize())?;
    store.save(&path)?;
    print_record(&record);
    Ok(())
}

fn cmd_list(args: &[String]) -> Result<()> {
    let opts = Options::parse(args, &with_flags(&["--day", "--format"]))?;
    let (store, _) = open_store(&opts)?;
    let mut records = store.fetch(opts.day().as_ref())?;
    records.reverse();

    if opts.json()? {
        return print_json(&records);
    }
    if records.is_empty() {
        println!("No purchase records.");
    }
    for record in &records {
        print_record(record);
    }
    Ok(())
}

fn cmd_show(args: &[String]) -> Result<()> {
    let opts = Options::parse(args, &with_flags(&["--id", "--format"]))?;
    let (store, _) = open_store(&opts)?;
    let record = store.get(opts.id()?)?;
    if opts.json()? {
        return print_json(&record);
    }
    print_record(&record);
    Ok(())
}

fn cmd_edit(args: &[String]) -> Result<()> {
    let mut allowed = with_flags(RECORD_FLAGS);
    allowed.push("--id");
    let opts = Options::parse(args, &allowed)?;
    let (store, path) = open_store(&opts)?;
    let id = opts.id()?;
    let draft = opts.overlay(store.get(id)?.to_draft());
    let record = store.update(id, draft)?;
    store.save(&path)?;
    print_record(&record);
    Ok(())
}

fn cmd_delete(args: &[String]) -> Result<()> {
    let opts = Options::parse(args, &with_flags(&["--id"]))?;
    let (store, path) = open_store(&opts)?;
    let record = store.delete(opts.id()?)?;
    store.save(&path)?;
    println!("Deleted:");
    print_record(&record);
    Ok(())
}

fn cmd_set_completed(args: &[String], completed: bool) -> Result<()> {
    let opts = Options::parse(args, &with_flags(&["--id"]))?;
    let (store, path) = open_store(&opts)?;
    let record = store.set_completed(opts.id()?, completed)?;
    store.save(&path)?;
    print_record(&record);
    Ok(())
}

fn cmd_summary(args: &[String]) -> Result<()> {
    let opts = Options::parse(args, &with_flags(&["--day", "--format"]))?;
    let (store, _) = open_store(&opts)?;
    let report = aggregate_from_store(&store, opts.day().as_ref())?;
    if opts.json()? {
        return print_json(&report.to_vec());
    }
    print!("{}", report);
    Ok(())
}

fn cmd_net(args: &[String]) -> Result<()> {
    let opts = Options::parse(
        args,
        &with_flags(&["--buyer", "--registrant", "--day", "--format"]),
    )?;
    let json = opts.json()?;
    let buyer = ParticipantId::new(opts.get("--buyer").unwrap_or("").trim());
    let registrant = ParticipantId::new(opts.get("--registrant").unwrap_or("").trim());

    let (store, _) = open_store(&opts)?;
    let result = NettingEngine::net_balance_in(&store, &buyer, &registrant, opts.day().as_ref())?;
    if json {
        return print_json(&result);
    }
    print!("{}", result);
    Ok(())
}

fn cmd_generate(args: &[String]) -> Result<()> {
    let opts = Options::parse(
        args,
        &["--participants", "--records", "--days", "--output"],
    )?;
    let defaults = LedgerConfig::default();
    let config = LedgerConfig {
        participant_count: opts.count("--participants", defaults.participant_count)?,
        record_count: opts.count("--records", defaults.record_count)?,
        days: match opts.get("--days") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(Day::new)
                .collect(),
            None => defaults.days.clone(),
        },
        ..defaults
    };

    let records = generate_random_ledger(&config);
    let count = records.len();
    let snapshot = LedgerSnapshot {
        next_id: count as u64 + 1,
        records,
    };
    let json = serde_json::to_string_pretty(&snapshot)?;

    match opts.get("--output") {
        Some(path) => {
            fs::write(path, &json)?;
            eprintln!(
                "Generated {} records across {} participants → {}",
                count, config.participant_count, path
            );
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    let outcome = match command {
        "add" => cmd_add(rest),
        "list" => cmd_list(rest),
        "show" => cmd_show(rest),
        "edit" => cmd_edit(rest),
        "delete" => cmd_delete(rest),
        "complete" => cmd_set_completed(rest, true),
        "uncomplete" => cmd_set_completed(rest, false),
        "summary" => cmd_summary(rest),
        "net" => cmd_net(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
