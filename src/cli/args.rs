use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sahayak", version, author, about = "Reminder and medication alerts for community members")]
pub struct Cli {
    /// Use this database file instead of the configured one
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// General reminders
    Reminder {
        #[command(subcommand)]
        action: ReminderCommands,
    },
    /// Medication schedule
    Medication {
        #[command(subcommand)]
        action: MedicationCommands,
    },
    /// Show the effective configuration
    Config,
}

#[derive(Subcommand, Debug)]
pub enum ReminderCommands {
    /// Add a reminder (prompts for anything not given)
    Add {
        /// Member name
        owner: String,
        #[command(flatten)]
        fields: ReminderFields,
    },
    /// Show reminders and deliver upcoming ones
    Check {
        /// Only this member's reminders
        #[arg(long)]
        owner: Option<String>,
        /// Include alerts whose time has passed
        #[arg(long)]
        all: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// List a member's reminders with their index
    List {
        /// Member name
        owner: String,
    },
    /// Mark a reminder as taken
    Take {
        /// Member name
        owner: String,
        /// Position in the full reminder table, not just this member's rows
        #[arg(long, conflicts_with = "id")]
        index: Option<String>,
        /// Reminder id (or its first characters)
        #[arg(long)]
        id: Option<String>,
    },
}

#[derive(Args, Debug, Default)]
pub struct ReminderFields {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    /// DD/MM/YYYY, DD/MM/YY, DD-MM-YYYY or DD-MM-YY
    #[arg(long)]
    pub date: Option<String>,
    /// Comma-separated: `09:00, 30 minutes before, 2 hours before`
    #[arg(long)]
    pub times: Option<String>,
    /// once, daily, weekly or monthly
    #[arg(long)]
    pub frequency: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum MedicationCommands {
    /// Add a daily medicine alert
    Add {
        /// Member name
        owner: String,
        #[arg(long)]
        medicine: Option<String>,
        /// HH:MM, 24-hour
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        dosage: Option<String>,
    },
    /// Deliver medicine alerts still ahead today
    Check {
        /// Only this member's medicines
        #[arg(long)]
        owner: Option<String>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}
