//! Status transitions for a single entry.
//!
//! Delivery and taken status are independent axes and both only move
//! forward: Pending → Delivered, Untaken → Taken.

use log::info;

use crate::error::{ScheduleError, ScheduleResult};
use crate::models::{DeliveryStatus, ReminderEntry, TakenStatus};
use crate::schedule::Alertable;

/// Move a pending entry to delivered. Returns false if it was already delivered.
pub fn deliver<E: Alertable>(entry: &mut E) -> bool {
    match entry.delivery() {
        DeliveryStatus::Pending => {
            entry.set_delivery(DeliveryStatus::Delivered);
            true
        }
        DeliveryStatus::Delivered => false,
    }
}

/// Record the operator's acknowledgment. Returns false if already taken.
pub fn take(entry: &mut ReminderEntry) -> bool {
    match entry.taken_status {
        TakenStatus::Untaken => {
            entry.taken_status = TakenStatus::Taken;
            true
        }
        TakenStatus::Taken => false,
    }
}

/// Positions of `owner`'s rows in the full table, in table order.
///
/// The operator picks from this listing by its enumeration (0, 1, 2 ...),
/// while `mark_taken` applies the chosen number to the full table.
pub fn owner_rows<'a>(
    rows: &'a [ReminderEntry],
    owner: &'a str,
) -> impl Iterator<Item = (usize, &'a ReminderEntry)> + 'a {
    rows.iter().enumerate().filter(move |(_, r)| r.owner == owner)
}

/// Mark the row at `index` of the full table as taken.
///
/// The bound is the full table's length, not the owner's listing, and the
/// row's owner is not checked: a number picked from the filtered listing
/// can address another member's row. Prefer [`mark_taken_by_id`].
///
/// An owner with no rows at all has nothing to pick from and is refused.
pub fn mark_taken(rows: &mut [ReminderEntry], owner: &str, index: usize) -> ScheduleResult<()> {
    if owner_rows(rows, owner).next().is_none() {
        return Err(ScheduleError::NoReminders {
            owner: owner.to_string(),
        });
    }
    let len = rows.len();
    let row = rows
        .get_mut(index)
        .ok_or(ScheduleError::IndexOutOfRange { index, len })?;
    if row.owner != owner {
        info!("Row {} marked taken by {} but belongs to {}", index, owner, row.owner);
    }
    take(row);
    Ok(())
}

/// Mark a row as taken by its stable id; the row must belong to `owner`.
pub fn mark_taken_by_id(rows: &mut [ReminderEntry], owner: &str, id: &str) -> ScheduleResult<usize> {
    let unknown = || ScheduleError::UnknownId {
        id: id.to_string(),
        owner: owner.to_string(),
    };
    if id.is_empty() {
        return Err(unknown());
    }
    // Prefixes are accepted, like the short ids `list` prints
    let (position, row) = rows
        .iter_mut()
        .enumerate()
        .find(|(_, r)| r.owner == owner && r.id.starts_with(id))
        .ok_or_else(unknown)?;
    take(row);
    Ok(position)
}

/// Parse the operator's typed index.
pub fn parse_index(raw: &str) -> ScheduleResult<usize> {
    raw.trim()
        .parse()
        .map_err(|_| ScheduleError::NotANumber(raw.trim().to_string()))
}
