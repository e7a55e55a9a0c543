use anyhow::Result;
use chrono::NaiveDateTime;
use std::io::{self, BufRead, Write};

use crate::cli::args::{MedicationCommands, ReminderCommands, ReminderFields};
use crate::config::AppConfig;
use crate::db::Store;
use crate::error::ScheduleResult;
use crate::models::{DeliveryStatus, ReminderEntry, TakenStatus};
use crate::schedule::lifecycle::parse_index;
use crate::schedule::ops::{self, AlertView, CheckReport, NewReminder};
use crate::utils::clock::CivilClock;
use crate::utils::format::{format_instant, relative_to, short_id};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;196;160;68m";

/// Everything a handler needs for one invocation.
pub struct Session<'a> {
    pub store: &'a Store,
    pub clock: &'a CivilClock,
    pub config: &'a AppConfig,
}

impl Session<'_> {
    fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }
}

/// Print operator errors and carry on; propagate store failures.
fn recover<T>(result: ScheduleResult<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_operator_error() => {
            println_colored!(RED, "  ✗ {}", e);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

// ─── Reminders ───────────────────────────────────────────────────────────────

pub fn handle_reminder(session: &Session, action: &ReminderCommands) -> Result<()> {
    match action {
        ReminderCommands::Add { owner, fields } => handle_reminder_add(session, owner, fields),
        ReminderCommands::Check { owner, all, json } => {
            handle_reminder_check(session, owner.as_deref(), *all, *json)
        }
        ReminderCommands::List { owner } => handle_reminder_list(session, owner),
        ReminderCommands::Take { owner, index, id } => {
            handle_reminder_take(session, owner, index.as_deref(), id.as_deref())
        }
    }
}

pub fn handle_reminder_add(session: &Session, owner: &str, fields: &ReminderFields) -> Result<()> {
    let Some(input) = reminder_input(owner, fields)? else {
        return cancelled();
    };

    if let Some(entry) = recover(ops::add_reminder(session.store, &input))? {
        println_colored!(
            GREEN,
            "  ✓ Reminder added for {} on {} at {}",
            entry.owner,
            entry.date,
            entry.times.join(", ")
        );
    }
    Ok(())
}

/// Fill the missing fields from stdin; `None` if input closes part way.
fn reminder_input(owner: &str, fields: &ReminderFields) -> Result<Option<NewReminder>> {
    let Some(title) = field_or_prompt(&fields.title, "Reminder title: ")? else {
        return Ok(None);
    };
    let Some(notes) = field_or_prompt(&fields.notes, "Notes (optional): ")? else {
        return Ok(None);
    };
    let Some(date) = field_or_prompt(
        &fields.date,
        "Date (DD/MM/YYYY, DD/MM/YY, DD-MM-YYYY or DD-MM-YY): ",
    )?
    else {
        return Ok(None);
    };
    let Some(times) = field_or_prompt(
        &fields.times,
        "Time(s) (HH:MM, comma-separated; e.g. 09:00, 30 minutes before): ",
    )?
    else {
        return Ok(None);
    };
    let Some(frequency) =
        field_or_prompt(&fields.frequency, "Frequency (Once/Daily/Weekly/Monthly): ")?
    else {
        return Ok(None);
    };

    Ok(Some(NewReminder {
        owner: owner.to_string(),
        title,
        notes,
        date,
        times,
        frequency,
    }))
}

pub fn handle_reminder_check(
    session: &Session,
    owner: Option<&str>,
    show_all: bool,
    json: bool,
) -> Result<()> {
    let now = session.now();
    let Some(report) = recover(ops::check_reminders(session.store, owner, show_all, now))? else {
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    if report.scanned == 0 {
        println_colored!(DIM, "  📭 No upcoming reminders.");
        println!();
        return Ok(());
    }

    println_colored!(GOLD, "  🔔 Upcoming Reminders ({} {})", format_instant(now), session.clock.label());
    println!();
    if report.alerts.is_empty() {
        println_colored!(DIM, "  Nothing ahead. Use --all to include past alerts.");
    }
    for alert in &report.alerts {
        print_alert(session, alert, now);
    }
    print_delivery_footer(&report);
    println!();
    Ok(())
}

fn print_alert(session: &Session, alert: &AlertView, now: NaiveDateTime) {
    let taken = match alert.taken {
        Some(TakenStatus::Taken) => "Yes",
        _ => "No",
    };
    let id = if session.config.display.show_ids {
        format!("[{}] ", short_id(&alert.id))
    } else {
        String::new()
    };
    let line = format!(
        "  🔹 {}{}: {} at {} | Taken: {}  ({})",
        id,
        alert.owner,
        alert.label,
        format_instant(alert.at),
        taken,
        relative_to(alert.at, now)
    );
    if alert.at < now {
        println_colored!(DIM, "{}", line);
    } else {
        println_colored!(BOLD, "{}", line);
    }
}

fn print_delivery_footer(report: &CheckReport) {
    if report.persisted {
        println!();
        println_colored!(
            DIM,
            "  {} reminder(s) marked delivered",
            report.delivered.len()
        );
    }
}

pub fn handle_reminder_list(session: &Session, owner: &str) -> Result<()> {
    let Some(rows) = recover(ops::owner_reminders(session.store, owner))? else {
        return Ok(());
    };
    print_listing(session, owner, &rows);
    Ok(())
}

fn print_listing(session: &Session, owner: &str, rows: &[(usize, ReminderEntry)]) {
    println!();
    if rows.is_empty() {
        println_colored!(DIM, "  📭 No reminders for {}.", owner);
        println!();
        return;
    }

    println_colored!(GOLD, "  📝 Reminders for {}", owner);
    println!();
    for (listed, (_, entry)) in rows.iter().enumerate() {
        print_listing_row(session, listed, entry);
    }
    println!();
}

fn print_listing_row(session: &Session, listed: usize, entry: &ReminderEntry) {
    let id = if session.config.display.show_ids {
        format!(" ({})", short_id(&entry.id))
    } else {
        String::new()
    };
    let taken = match entry.taken_status {
        TakenStatus::Taken => format!("{}Taken\x1b[0m", GREEN),
        TakenStatus::Untaken => "-".to_string(),
    };
    let delivery = match entry.delivery_status {
        DeliveryStatus::Delivered => "delivered",
        DeliveryStatus::Pending => "pending",
    };
    println!(
        "  [{}]{} {} on {} at {} | {} | {} | Taken: {}",
        listed,
        id,
        entry.title,
        entry.date,
        entry.times.join(", "),
        entry.frequency,
        delivery,
        taken
    );
}

pub fn handle_reminder_take(
    session: &Session,
    owner: &str,
    index: Option<&str>,
    id: Option<&str>,
) -> Result<()> {
    let result = match (id, index) {
        (Some(id), _) => ops::mark_taken_by_id(session.store, owner, id),
        (None, Some(raw)) => parse_index(raw).and_then(|i| ops::mark_taken(session.store, owner, i)),
        (None, None) => {
            let Some(rows) = recover(ops::owner_reminders(session.store, owner))? else {
                return Ok(());
            };
            if rows.is_empty() {
                println_colored!(DIM, "  📭 No reminders to mark as taken.");
                return Ok(());
            }
            print_listing(session, owner, &rows);
            let Some(raw) = prompt_line("Enter the index to mark as taken: ")? else {
                return cancelled();
            };
            parse_index(&raw).and_then(|i| ops::mark_taken(session.store, owner, i))
        }
    };

    if let Some(entry) = recover(result)? {
        println_colored!(GREEN, "  ✓ Marked as taken: {} on {}", entry.title, entry.date);
    }
    Ok(())
}

// ─── Medications ─────────────────────────────────────────────────────────────

pub fn handle_medication(session: &Session, action: &MedicationCommands) -> Result<()> {
    match action {
        MedicationCommands::Add {
            owner,
            medicine,
            time,
            dosage,
        } => handle_medication_add(session, owner, medicine, time, dosage),
        MedicationCommands::Check { owner, json } => {
            handle_medication_check(session, owner.as_deref(), *json)
        }
    }
}

pub fn handle_medication_add(
    session: &Session,
    owner: &str,
    medicine: &Option<String>,
    time: &Option<String>,
    dosage: &Option<String>,
) -> Result<()> {
    let Some(medicine) = field_or_prompt(medicine, "Medicine name: ")? else {
        return cancelled();
    };
    let Some(time) = field_or_prompt(time, "Time to take (HH:MM, 24-hr format): ")? else {
        return cancelled();
    };
    let Some(dosage) = field_or_prompt(dosage, "Dosage: ")? else {
        return cancelled();
    };

    let result = ops::add_medication(session.store, owner, &medicine, &time, &dosage);
    if let Some(entry) = recover(result)? {
        println_colored!(
            GREEN,
            "  ✓ {} {} added for {} at {}",
            entry.medicine,
            entry.dosage,
            entry.owner,
            entry.time
        );
    }
    Ok(())
}

pub fn handle_medication_check(session: &Session, owner: Option<&str>, json: bool) -> Result<()> {
    let now = session.now();
    let Some(report) = recover(ops::check_medications(session.store, owner, now))? else {
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    for alert in &report.alerts {
        println_colored!(
            AMBER,
            "  🔔 Upcoming Reminder for {}: {} at {} ({})",
            alert.owner,
            alert.label,
            alert.at.format("%H:%M"),
            relative_to(alert.at, now)
        );
    }
    if report.persisted {
        println_colored!(GREEN, "  ✓ Reminders delivered and updated.");
    } else {
        println_colored!(DIM, "  📭 No pending reminders right now.");
    }
    println!();
    Ok(())
}

// ─── Config ──────────────────────────────────────────────────────────────────

pub fn handle_config(session: &Session) -> Result<()> {
    println!("# {}", AppConfig::config_path()?.display());
    if let Some(path) = session.store.path() {
        println!("# store: {}", path.display());
    }
    println!();
    print!("{}", session.config.to_toml()?);
    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Read one line; `None` once stdin is closed.
pub fn prompt_line(message: &str) -> Result<Option<String>> {
    print!("{}", message);
    io::stdout().flush()?;
    read_line(&mut io::stdin().lock())
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut buf = String::new();
    if input.read_line(&mut buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(buf.trim_end_matches('\n').trim_end_matches('\r').to_string()))
}

fn field_or_prompt(value: &Option<String>, message: &str) -> Result<Option<String>> {
    match value {
        Some(v) => Ok(Some(v.clone())),
        None => prompt_line(message),
    }
}

/// Input closed mid-operation: drop this operation only.
fn cancelled() -> Result<()> {
    println!();
    println_colored!(DIM, "  Input closed, nothing saved.");
    Ok(())
}
