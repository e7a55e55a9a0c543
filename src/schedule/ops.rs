//! One-shot operations: load the table, work on it in memory, rewrite it.

use chrono::NaiveDateTime;
use log::info;
use serde::Serialize;
use std::str::FromStr;

use crate::db::{Record, TableStore};
use crate::error::{ScheduleError, ScheduleResult};
use crate::models::{
    DeliveryStatus, Frequency, MedicationEntry, ReminderEntry, TakenStatus, split_times,
};
use crate::schedule::resolver::{normalize_date, parse_clock_time};
use crate::schedule::{Alertable, DueAlert, deliver_due, evaluate, lifecycle};

/// Raw operator input for a new reminder.
#[derive(Debug, Clone, Default)]
pub struct NewReminder {
    pub owner: String,
    pub title: String,
    pub notes: String,
    pub date: String,
    /// Comma-separated, e.g. `09:00, 30 minutes before`
    pub times: String,
    pub frequency: String,
}

/// A resolved alert detached from the table it came from.
#[derive(Debug, Clone, Serialize)]
pub struct AlertView {
    pub id: String,
    pub position: usize,
    pub owner: String,
    pub label: String,
    pub spec: String,
    pub at: NaiveDateTime,
    pub delivery: DeliveryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taken: Option<TakenStatus>,
    /// Delivered by the check that produced this view
    pub newly_delivered: bool,
}

impl<E: Alertable> From<DueAlert<'_, E>> for AlertView {
    fn from(alert: DueAlert<'_, E>) -> Self {
        AlertView {
            id: alert.entry.id().to_string(),
            position: alert.position,
            owner: alert.entry.owner().to_string(),
            label: alert.entry.label(),
            spec: alert.spec.to_string(),
            at: alert.at,
            delivery: alert.entry.delivery(),
            taken: alert.entry.taken(),
            newly_delivered: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckReport {
    /// Rows considered after the owner filter
    pub scanned: usize,
    pub alerts: Vec<AlertView>,
    /// Positions moved to Delivered by this check
    pub delivered: Vec<usize>,
    /// Whether the table was rewritten
    pub persisted: bool,
}

pub fn add_reminder<S: TableStore>(store: &S, input: &NewReminder) -> ScheduleResult<ReminderEntry> {
    let owner = input.owner.trim();
    if owner.is_empty() {
        return Err(ScheduleError::MissingOwner);
    }
    let date = normalize_date(&input.date)?;
    let frequency = Frequency::from_str(&input.frequency)
        .map_err(|_| ScheduleError::UnknownFrequency(input.frequency.trim().to_string()))?;
    let times = split_times(&input.times);
    if times.is_empty() {
        return Err(ScheduleError::NoTimes);
    }

    let entry = ReminderEntry::new(
        owner,
        input.title.trim(),
        input.notes.trim(),
        date,
        times,
        frequency,
    );

    let mut rows: Vec<ReminderEntry> = store.load()?;
    rows.push(entry.clone());
    store.save(&rows)?;
    info!("Added reminder {} for {}", entry.id, entry.owner);
    Ok(entry)
}

pub fn add_medication<S: TableStore>(
    store: &S,
    owner: &str,
    medicine: &str,
    time: &str,
    dosage: &str,
) -> ScheduleResult<MedicationEntry> {
    let owner = owner.trim();
    if owner.is_empty() {
        return Err(ScheduleError::MissingOwner);
    }
    let time = parse_clock_time(time)
        .ok_or_else(|| ScheduleError::MalformedTime(time.trim().to_string()))?;

    let entry = MedicationEntry::new(
        owner,
        medicine.trim(),
        time.format("%H:%M").to_string(),
        dosage.trim(),
    );

    let mut rows: Vec<MedicationEntry> = store.load()?;
    rows.push(entry.clone());
    store.save(&rows)?;
    info!("Added medication {} for {}", entry.id, entry.owner);
    Ok(entry)
}

/// Evaluate a table at `now`, apply the delivery rule and persist any change
/// with a single rewrite.
pub fn check<R, S>(
    store: &S,
    owner: Option<&str>,
    show_all: bool,
    now: NaiveDateTime,
) -> ScheduleResult<CheckReport>
where
    R: Record + Alertable,
    S: TableStore,
{
    let mut rows: Vec<R> = store.load()?;
    let scanned = rows
        .iter()
        .filter(|r| owner.is_none_or(|o| r.owner() == o))
        .count();

    let mut alerts: Vec<AlertView> = evaluate(&rows, owner, show_all, now)
        .map(AlertView::from)
        .collect();

    let delivered = deliver_due(&mut rows, owner, now);
    let persisted = !delivered.is_empty();
    if persisted {
        store.save(&rows)?;
    }

    for alert in &mut alerts {
        alert.newly_delivered = delivered.contains(&alert.position);
    }

    Ok(CheckReport {
        scanned,
        alerts,
        delivered,
        persisted,
    })
}

pub fn check_reminders<S: TableStore>(
    store: &S,
    owner: Option<&str>,
    show_all: bool,
    now: NaiveDateTime,
) -> ScheduleResult<CheckReport> {
    check::<ReminderEntry, S>(store, owner, show_all, now)
}

/// Medication checks only surface what they deliver.
pub fn check_medications<S: TableStore>(
    store: &S,
    owner: Option<&str>,
    now: NaiveDateTime,
) -> ScheduleResult<CheckReport> {
    let mut report = check::<MedicationEntry, S>(store, owner, false, now)?;
    report.alerts.retain(|a| a.newly_delivered);
    Ok(report)
}

/// The owner's reminders with their full-table positions.
pub fn owner_reminders<S: TableStore>(
    store: &S,
    owner: &str,
) -> ScheduleResult<Vec<(usize, ReminderEntry)>> {
    let rows: Vec<ReminderEntry> = store.load()?;
    Ok(lifecycle::owner_rows(&rows, owner)
        .map(|(i, r)| (i, r.clone()))
        .collect())
}

/// Mark by ordinal index into the full table. See [`lifecycle::mark_taken`].
pub fn mark_taken<S: TableStore>(
    store: &S,
    owner: &str,
    index: usize,
) -> ScheduleResult<ReminderEntry> {
    let mut rows: Vec<ReminderEntry> = store.load()?;
    lifecycle::mark_taken(&mut rows, owner, index)?;
    store.save(&rows)?;
    Ok(rows[index].clone())
}

pub fn mark_taken_by_id<S: TableStore>(
    store: &S,
    owner: &str,
    id: &str,
) -> ScheduleResult<ReminderEntry> {
    let mut rows: Vec<ReminderEntry> = store.load()?;
    let position = lifecycle::mark_taken_by_id(&mut rows, owner, id.trim())?;
    store.save(&rows)?;
    Ok(rows[position].clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Store;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    /// In-memory store that counts rewrites.
    #[derive(Default)]
    struct CountingStore {
        tables: RefCell<HashMap<&'static str, Vec<Vec<String>>>>,
        saves: Cell<usize>,
    }

    impl TableStore for CountingStore {
        fn load<R: Record>(&self) -> anyhow::Result<Vec<R>> {
            Ok(self
                .tables
                .borrow()
                .get(R::TABLE)
                .map(|rows| rows.iter().cloned().map(R::from_cells).collect())
                .unwrap_or_default())
        }

        fn save<R: Record>(&self, rows: &[R]) -> anyhow::Result<()> {
            self.saves.set(self.saves.get() + 1);
            self.tables
                .borrow_mut()
                .insert(R::TABLE, rows.iter().map(R::to_cells).collect());
            Ok(())
        }
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn request(owner: &str, date: &str, times: &str) -> NewReminder {
        NewReminder {
            owner: owner.into(),
            title: "Clinic".into(),
            notes: "bring reports".into(),
            date: date.into(),
            times: times.into(),
            frequency: "Once".into(),
        }
    }

    #[test]
    fn test_bad_date_writes_nothing() {
        let store = CountingStore::default();
        let err = add_reminder(&store, &request("asha", "2024/03/05", "09:00")).unwrap_err();
        assert!(matches!(err, ScheduleError::MalformedDate(_)));
        assert_eq!(store.saves.get(), 0);
        assert!(store.load::<ReminderEntry>().unwrap().is_empty());
    }

    #[test]
    fn test_empty_times_and_bad_frequency_rejected() {
        let store = CountingStore::default();
        assert!(matches!(
            add_reminder(&store, &request("asha", "05/03/2024", " , ")),
            Err(ScheduleError::NoTimes)
        ));

        let mut req = request("asha", "05/03/2024", "09:00");
        req.frequency = "fortnightly".into();
        assert!(matches!(
            add_reminder(&store, &req),
            Err(ScheduleError::UnknownFrequency(_))
        ));
        assert_eq!(store.saves.get(), 0);
    }

    #[test]
    fn test_add_normalizes_date() {
        let store = CountingStore::default();
        let entry = add_reminder(&store, &request("asha", "05-03-24", "09:00,30 minutes before")).unwrap();
        assert_eq!(entry.date, "2024-03-05");
        assert_eq!(entry.times, vec!["09:00", "30 minutes before"]);
        assert_eq!(store.load::<ReminderEntry>().unwrap(), vec![entry]);
    }

    #[test]
    fn test_today_reminder_reported_before_and_after_delivery() {
        let store = CountingStore::default();
        add_reminder(&store, &request("asha", "05/03/2024", "09:00")).unwrap();
        assert_eq!(store.saves.get(), 1);

        let first = check_reminders(&store, Some("asha"), false, at("2024-03-05 08:00")).unwrap();
        assert_eq!(first.alerts.len(), 1);
        assert_eq!(first.delivered, vec![0]);
        assert!(first.persisted);
        assert_eq!(store.saves.get(), 2);

        let second = check_reminders(&store, Some("asha"), false, at("2024-03-05 08:10")).unwrap();
        assert_eq!(second.alerts.len(), 1);
        assert_eq!(second.alerts[0].delivery, DeliveryStatus::Delivered);
        assert!(second.delivered.is_empty());
        assert!(!second.persisted);
        assert_eq!(store.saves.get(), 2);
    }

    #[test]
    fn test_medication_check_delivers_once_with_one_rewrite() {
        let store = CountingStore::default();
        add_medication(&store, "ravi", "Metformin", "14:30", "500mg").unwrap();
        let saves_after_add = store.saves.get();

        let report = check_medications(&store, None, at("2024-07-01 10:00")).unwrap();
        assert_eq!(report.delivered, vec![0]);
        assert_eq!(report.alerts.len(), 1);
        assert_eq!(report.alerts[0].label, "Take Metformin - 500mg");
        assert_eq!(store.saves.get(), saves_after_add + 1);

        let again = check_medications(&store, None, at("2024-07-01 10:05")).unwrap();
        assert!(again.delivered.is_empty());
        assert!(again.alerts.is_empty());
        assert_eq!(store.saves.get(), saves_after_add + 1);

        let stored: Vec<MedicationEntry> = store.load().unwrap();
        assert_eq!(stored[0].status, DeliveryStatus::Delivered);
    }

    #[test]
    fn test_medication_after_time_is_not_delivered() {
        let store = CountingStore::default();
        add_medication(&store, "ravi", "Metformin", "14:30", "500mg").unwrap();
        let report = check_medications(&store, None, at("2024-07-01 15:00")).unwrap();
        assert!(report.delivered.is_empty());
        assert!(!report.persisted);
    }

    #[test]
    fn test_medication_rejects_relative_time() {
        let store = CountingStore::default();
        assert!(matches!(
            add_medication(&store, "ravi", "Metformin", "30 minutes before", "500mg"),
            Err(ScheduleError::MalformedTime(_))
        ));
    }

    #[test]
    fn test_mark_taken_out_of_range_does_not_write() {
        let store = CountingStore::default();
        add_reminder(&store, &request("asha", "05/03/2024", "09:00")).unwrap();
        add_reminder(&store, &request("ravi", "05/03/2024", "10:00")).unwrap();
        let saves = store.saves.get();

        let err = mark_taken(&store, "asha", 2).unwrap_err();
        assert!(matches!(err, ScheduleError::IndexOutOfRange { index: 2, len: 2 }));
        assert_eq!(store.saves.get(), saves);
        assert!(
            store
                .load::<ReminderEntry>()
                .unwrap()
                .iter()
                .all(|r| r.taken_status == TakenStatus::Untaken)
        );
    }

    #[test]
    fn test_mark_taken_for_member_without_reminders_writes_nothing() {
        let store = CountingStore::default();
        add_reminder(&store, &request("ravi", "05/03/2024", "09:00")).unwrap();
        assert!(owner_reminders(&store, "nobody").unwrap().is_empty());
        let saves = store.saves.get();

        let err = mark_taken(&store, "nobody", 0).unwrap_err();
        assert!(matches!(err, ScheduleError::NoReminders { .. }));
        assert_eq!(store.saves.get(), saves);
        let rows: Vec<ReminderEntry> = store.load().unwrap();
        assert_eq!(rows[0].taken_status, TakenStatus::Untaken);
    }

    #[test]
    fn test_mark_taken_by_id_persists() {
        let store = Store::open_in_memory().unwrap();
        add_reminder(&store, &request("ravi", "05/03/2024", "08:00")).unwrap();
        let entry = add_reminder(&store, &request("asha", "05/03/2024", "09:00")).unwrap();

        let updated = mark_taken_by_id(&store, "asha", &entry.id).unwrap();
        assert_eq!(updated.taken_status, TakenStatus::Taken);

        let listing = owner_reminders(&store, "asha").unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].0, 1);
        assert_eq!(listing[0].1.taken_status, TakenStatus::Taken);
    }

    #[test]
    fn test_id_shown_for_legacy_row_can_be_taken() {
        let store = Store::open_in_memory().unwrap();
        let mut legacy = ReminderEntry::new(
            "asha",
            "Clinic",
            "",
            "2024-03-05".into(),
            vec!["09:00".into()],
            Frequency::Once,
        );
        legacy.id = String::new();
        store.save(std::slice::from_ref(&legacy)).unwrap();

        let shown = owner_reminders(&store, "asha").unwrap()[0].1.id.clone();
        assert_eq!(owner_reminders(&store, "asha").unwrap()[0].1.id, shown);

        let updated = mark_taken_by_id(&store, "asha", &shown).unwrap();
        assert_eq!(updated.id, shown);
        assert_eq!(updated.taken_status, TakenStatus::Taken);
    }

    #[test]
    fn test_check_on_empty_owner_view() {
        let store = Store::open_in_memory().unwrap();
        add_reminder(&store, &request("ravi", "05/03/2024", "08:00")).unwrap();
        let report = check_reminders(&store, Some("asha"), true, at("2024-03-05 06:00")).unwrap();
        assert_eq!(report.scanned, 0);
        assert!(report.alerts.is_empty());
    }
}
