use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info, warn};
use std::collections::BTreeSet;

use crate::models::DeliveryStatus;
use crate::schedule::{Alertable, lifecycle, resolver};

/// One resolved alert of one row.
#[derive(Debug)]
pub struct DueAlert<'a, E> {
    /// Row position in the loaded table
    pub position: usize,
    pub entry: &'a E,
    /// The raw time specification this alert came from
    pub spec: &'a str,
    pub at: NaiveDateTime,
}

/// Resolve every alert of every row (optionally for one owner).
///
/// With `show_all == false` only alerts at or after `now` are yielded.
/// Unresolvable specifications are skipped one by one; the iterator is
/// lazy and borrows the snapshot it was built from.
pub fn evaluate<'a, E: Alertable>(
    rows: &'a [E],
    owner: Option<&'a str>,
    show_all: bool,
    now: NaiveDateTime,
) -> impl Iterator<Item = DueAlert<'a, E>> + 'a {
    let today = now.date();
    rows.iter()
        .enumerate()
        .filter(move |(_, entry)| owner.is_none_or(|o| entry.owner() == o))
        .flat_map(move |(position, entry)| resolve_row(position, entry, today))
        .filter(move |alert| show_all || alert.at >= now)
}

fn resolve_row<'a, E: Alertable>(
    position: usize,
    entry: &'a E,
    today: NaiveDate,
) -> impl Iterator<Item = DueAlert<'a, E>> + 'a {
    let date = entry.anchor_date(today);
    if date.is_none() {
        warn!("Row {} ({}) has an unreadable date, skipping", position, entry.id());
    }
    let specs: &[String] = if date.is_some() { entry.time_specs() } else { &[] };
    let primary = resolver::primary_time(specs);

    specs.iter().filter_map(move |spec| {
        let at = date.and_then(|d| resolver::resolve(d, primary, spec));
        if at.is_none() {
            debug!("Row {}: skipping unresolvable time '{}'", position, spec);
        }
        Some(DueAlert {
            position,
            entry,
            spec: spec.as_str(),
            at: at?,
        })
    })
}

/// Apply the delivery rule: a pending row with an alert still ahead of `now`
/// becomes delivered. Returns the positions that changed.
///
/// Alerts already in the past never trigger delivery.
pub fn deliver_due<E: Alertable>(
    rows: &mut [E],
    owner: Option<&str>,
    now: NaiveDateTime,
) -> Vec<usize> {
    let due: BTreeSet<usize> = evaluate(rows, owner, true, now)
        .filter(|alert| alert.entry.delivery() == DeliveryStatus::Pending && now < alert.at)
        .map(|alert| alert.position)
        .collect();

    due.into_iter()
        .filter(|&position| lifecycle::deliver(&mut rows[position]))
        .inspect(|position| info!("Row {} delivered", position))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Frequency, MedicationEntry, ReminderEntry};

    fn now(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn reminder(owner: &str, date: &str, times: &[&str]) -> ReminderEntry {
        ReminderEntry::new(
            owner,
            "Clinic",
            "bring reports",
            date.into(),
            times.iter().map(|t| t.to_string()).collect(),
            Frequency::Once,
        )
    }

    #[test]
    fn test_malformed_alert_skipped_others_resolved() {
        let rows = vec![reminder(
            "asha",
            "2024-03-05",
            &["09:00", "half past nine", "30 minutes before", "1 hours before"],
        )];
        let alerts: Vec<_> = evaluate(&rows, None, true, now("2024-03-05 06:00"))
            .map(|a| (a.spec.to_string(), a.at))
            .collect();
        assert_eq!(
            alerts,
            vec![
                ("09:00".to_string(), now("2024-03-05 09:00")),
                ("30 minutes before".to_string(), now("2024-03-05 08:30")),
                ("1 hours before".to_string(), now("2024-03-05 08:00")),
            ]
        );
    }

    #[test]
    fn test_show_all_false_keeps_alerts_at_or_after_now() {
        let rows = vec![reminder("asha", "2024-03-05", &["09:00", "30 minutes before"])];
        let upcoming: Vec<_> = evaluate(&rows, None, false, now("2024-03-05 08:30"))
            .map(|a| a.at)
            .collect();
        assert_eq!(upcoming, vec![now("2024-03-05 09:00"), now("2024-03-05 08:30")]);

        let upcoming = evaluate(&rows, None, false, now("2024-03-05 09:01")).count();
        assert_eq!(upcoming, 0);
        let all = evaluate(&rows, None, true, now("2024-03-05 09:01")).count();
        assert_eq!(all, 2);
    }

    #[test]
    fn test_owner_filter() {
        let rows = vec![
            reminder("asha", "2024-03-05", &["09:00"]),
            reminder("ravi", "2024-03-05", &["10:00"]),
        ];
        let positions: Vec<usize> = evaluate(&rows, Some("ravi"), true, now("2024-03-05 06:00"))
            .map(|a| a.position)
            .collect();
        assert_eq!(positions, vec![1]);
    }

    #[test]
    fn test_relative_without_absolute_is_skipped() {
        let rows = vec![reminder("asha", "2024-03-05", &["30 minutes before"])];
        assert_eq!(evaluate(&rows, None, true, now("2024-03-05 06:00")).count(), 0);
    }

    #[test]
    fn test_corrupt_stored_date_skips_row() {
        let rows = vec![
            reminder("asha", "05/03/2024", &["09:00"]),
            reminder("asha", "2024-03-05", &["09:00"]),
        ];
        let positions: Vec<usize> = evaluate(&rows, None, true, now("2024-03-05 06:00"))
            .map(|a| a.position)
            .collect();
        assert_eq!(positions, vec![1]);
    }

    #[test]
    fn test_medication_resolves_against_today() {
        let rows = vec![MedicationEntry::new("ravi", "Metformin", "14:30".into(), "500mg")];
        let alert = evaluate(&rows, None, true, now("2024-07-01 10:00")).next().unwrap();
        assert_eq!(alert.at, now("2024-07-01 14:30"));
    }

    #[test]
    fn test_deliver_only_upcoming_pending_rows() {
        let mut rows = vec![
            reminder("asha", "2024-03-05", &["09:00"]),
            reminder("asha", "2024-03-05", &["07:00"]),
            reminder("ravi", "2024-03-05", &["11:00", "30 minutes before"]),
        ];
        let delivered = deliver_due(&mut rows, None, now("2024-03-05 08:00"));
        assert_eq!(delivered, vec![0, 2]);
        assert_eq!(rows[1].delivery_status, DeliveryStatus::Pending);
    }

    #[test]
    fn test_alert_exactly_now_is_listed_but_not_delivered() {
        let mut rows = vec![reminder("asha", "2024-03-05", &["09:00"])];
        let at_nine = now("2024-03-05 09:00");
        assert_eq!(evaluate(&rows, None, false, at_nine).count(), 1);
        assert!(deliver_due(&mut rows, None, at_nine).is_empty());
    }

    #[test]
    fn test_delivered_never_returns_to_pending() {
        let mut rows = vec![reminder("asha", "2024-03-05", &["09:00"])];
        for t in ["2024-03-05 08:00", "2024-03-05 08:30", "2024-03-05 10:00", "2024-03-04 08:00"] {
            deliver_due(&mut rows, None, now(t));
            assert_eq!(rows[0].delivery_status, DeliveryStatus::Delivered, "after {t}");
        }
    }
}
