use anyhow::Result;

use crate::cli::args::ReminderFields;
use crate::cli::handlers::{self, Session, prompt_line};

const MENU: &[(&str, &str)] = &[
    ("1", "Add Reminder"),
    ("2", "Check Reminders"),
    ("3", "Mark Reminder as Taken"),
    ("4", "Add Medication Reminder"),
    ("5", "Run Medication Check"),
    ("6", "Exit"),
];

/// Line-based menu loop; each choice runs one operation and comes back here.
pub fn run(session: &Session) -> Result<()> {
    println!("=== Sahayak Reminders ===");
    let Some(name) = prompt_line("Enter your name: ")? else {
        return Ok(());
    };
    let owner = name.trim().to_string();
    if owner.is_empty() {
        println!("  A name is required.");
        return Ok(());
    }

    loop {
        println!();
        println!("=== Choose a service ===");
        for (key, label) in MENU {
            println!("{}. {}", key, label);
        }
        let Some(choice) = prompt_line("Choose an option: ")? else {
            break;
        };

        match choice.trim() {
            "1" => handlers::handle_reminder_add(session, &owner, &ReminderFields::default())?,
            "2" => handlers::handle_reminder_check(session, Some(&owner), true, false)?,
            "3" => handlers::handle_reminder_take(session, &owner, None, None)?,
            "4" => handlers::handle_medication_add(session, &owner, &None, &None, &None)?,
            "5" => handlers::handle_medication_check(session, None, false)?,
            "6" | "q" | "quit" | "exit" => break,
            other => println!("  ✗ Invalid choice '{}'.", other),
        }
    }

    println!("Goodbye, {}!", owner);
    Ok(())
}
