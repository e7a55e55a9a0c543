use anyhow::Result;
use rusqlite::types::Value;
use rusqlite::{Connection, params_from_iter};
use std::str::FromStr;

use crate::models::{
    DeliveryStatus, Frequency, MedicationEntry, ReminderEntry, TakenStatus, split_times,
};

// ─── Row mapping ─────────────────────────────────────────────────────────────

/// A row shape stored as untyped text cells.
pub trait Record: Sized {
    const TABLE: &'static str;
    /// Data columns in storage order, `id` first (the `position` column is implicit)
    const COLUMNS: &'static [&'static str];

    fn to_cells(&self) -> Vec<String>;
    /// Missing trailing cells arrive as empty strings.
    fn from_cells(cells: Vec<String>) -> Self;
}

fn cell(cells: &mut std::vec::IntoIter<String>) -> String {
    cells.next().unwrap_or_default()
}

/// Rows written before ids existed get one; `load_all` persists it.
fn id_or_new(id: String) -> String {
    if id.trim().is_empty() {
        uuid::Uuid::new_v4().to_string()
    } else {
        id
    }
}

impl Record for ReminderEntry {
    const TABLE: &'static str = "reminders";
    const COLUMNS: &'static [&'static str] = &[
        "id", "owner", "title", "notes", "date", "times", "frequency", "delivery", "taken",
    ];

    fn to_cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.owner.clone(),
            self.title.clone(),
            self.notes.clone(),
            self.date.clone(),
            self.times_cell(),
            self.frequency.display_name().to_string(),
            self.delivery_status.as_str().to_string(),
            self.taken_status.as_str().to_string(),
        ]
    }

    fn from_cells(cells: Vec<String>) -> Self {
        let mut c = cells.into_iter();
        let id = id_or_new(cell(&mut c));
        let owner = cell(&mut c);
        let title = cell(&mut c);
        let notes = cell(&mut c);
        let date = cell(&mut c);
        let times = split_times(&cell(&mut c));
        let raw_frequency = cell(&mut c);
        let frequency = Frequency::from_str(&raw_frequency).unwrap_or_else(|_| {
            log::warn!("Reminder {}: unknown frequency '{}', reading as Once", id, raw_frequency);
            Frequency::Once
        });
        ReminderEntry {
            id,
            owner,
            title,
            notes,
            date,
            times,
            frequency,
            delivery_status: DeliveryStatus::from_cell(&cell(&mut c)),
            taken_status: TakenStatus::from_cell(&cell(&mut c)),
        }
    }
}

impl Record for MedicationEntry {
    const TABLE: &'static str = "medications";
    const COLUMNS: &'static [&'static str] = &["id", "owner", "medicine", "time", "dosage", "status"];

    fn to_cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.owner.clone(),
            self.medicine.clone(),
            self.time.clone(),
            self.dosage.clone(),
            self.status.as_str().to_string(),
        ]
    }

    fn from_cells(cells: Vec<String>) -> Self {
        let mut c = cells.into_iter();
        MedicationEntry {
            id: id_or_new(cell(&mut c)),
            owner: cell(&mut c),
            medicine: cell(&mut c),
            time: cell(&mut c),
            dosage: cell(&mut c),
            status: DeliveryStatus::from_cell(&cell(&mut c)),
        }
    }
}

// ─── Whole-table access ──────────────────────────────────────────────────────

pub struct TableRepo;

impl TableRepo {
    /// Every row of `R`'s table, in table order.
    ///
    /// Rows with a blank id are given one and the table is rewritten at once,
    /// so the id stays the same on the next load.
    pub fn load_all<R: Record>(conn: &Connection) -> Result<Vec<R>> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY position",
            R::COLUMNS.join(", "),
            R::TABLE
        );
        let mut stmt = conn.prepare(&sql)?;

        let rows = stmt.query_map([], |row| {
            (0..R::COLUMNS.len())
                .map(|i| row.get::<_, Option<String>>(i).map(Option::unwrap_or_default))
                .collect::<rusqlite::Result<Vec<_>>>()
        })?;

        let mut result = Vec::new();
        let mut backfilled = 0;
        for r in rows {
            let cells = r?;
            if cells.first().is_none_or(|id| id.trim().is_empty()) {
                backfilled += 1;
            }
            result.push(R::from_cells(cells));
        }
        drop(stmt);

        if backfilled > 0 {
            log::info!("Assigned ids to {} row(s) in {}", backfilled, R::TABLE);
            Self::save_all(conn, &result)?;
        }
        Ok(result)
    }

    /// Replace the whole table with `rows`, preserving their order.
    ///
    /// No merge with concurrent writers: the last rewrite wins.
    pub fn save_all<R: Record>(conn: &Connection, rows: &[R]) -> Result<()> {
        let tx = conn.unchecked_transaction()?;
        tx.execute(&format!("DELETE FROM {}", R::TABLE), [])?;

        {
            let placeholders: Vec<String> =
                (1..=R::COLUMNS.len() + 1).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "INSERT INTO {} (position, {}) VALUES ({})",
                R::TABLE,
                R::COLUMNS.join(", "),
                placeholders.join(", ")
            );
            let mut stmt = tx.prepare(&sql)?;

            for (position, row) in rows.iter().enumerate() {
                let values = std::iter::once(Value::Integer(position as i64))
                    .chain(row.to_cells().into_iter().map(Value::Text));
                stmt.execute(params_from_iter(values))?;
            }
        }

        tx.commit()?;
        log::info!("Rewrote {} ({} rows)", R::TABLE, rows.len());
        Ok(())
    }
}
