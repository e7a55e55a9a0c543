use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Once,
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn display_name(&self) -> &'static str {
        match self {
            Frequency::Once => "Once",
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Frequency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "once" => Ok(Frequency::Once),
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            _ => Err(anyhow::anyhow!("Unknown frequency: {}", s)),
        }
    }
}

/// Whether the alert for the current occurrence has been surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    Delivered,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "Pending",
            DeliveryStatus::Delivered => "Delivered",
        }
    }

    /// Lenient read of a stored cell; anything but `Delivered` is pending.
    pub fn from_cell(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("delivered") {
            DeliveryStatus::Delivered
        } else {
            DeliveryStatus::Pending
        }
    }
}

/// Manual acknowledgment, independent of delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TakenStatus {
    Untaken,
    Taken,
}

impl TakenStatus {
    /// Stored form. Untaken is an empty cell.
    pub fn as_str(&self) -> &'static str {
        match self {
            TakenStatus::Untaken => "",
            TakenStatus::Taken => "Taken",
        }
    }

    /// Older tables wrote `Yes` for taken rows.
    pub fn from_cell(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "taken" | "yes" => TakenStatus::Taken,
            _ => TakenStatus::Untaken,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderEntry {
    pub id: String,
    pub owner: String,
    pub title: String,
    pub notes: String,
    /// Canonical `YYYY-MM-DD`
    pub date: String,
    /// Absolute `HH:MM` entries and relative offsets from the first absolute one
    pub times: Vec<String>,
    pub frequency: Frequency,
    pub delivery_status: DeliveryStatus,
    pub taken_status: TakenStatus,
}

impl ReminderEntry {
    pub fn new(
        owner: &str,
        title: &str,
        notes: &str,
        date: String,
        times: Vec<String>,
        frequency: Frequency,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner: owner.to_string(),
            title: title.to_string(),
            notes: notes.to_string(),
            date,
            times,
            frequency,
            delivery_status: DeliveryStatus::Pending,
            taken_status: TakenStatus::Untaken,
        }
    }

    pub fn times_cell(&self) -> String {
        self.times.join(",")
    }
}

/// Split a comma-separated `Time(s)` cell, dropping blanks.
pub fn split_times(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
