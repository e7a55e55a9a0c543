use serde::{Deserialize, Serialize};

use crate::models::DeliveryStatus;

/// A daily medicine alert: one absolute time, no offsets, no taken flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationEntry {
    pub id: String,
    pub owner: String,
    pub medicine: String,
    /// `HH:MM`, always resolved against the day the check runs
    pub time: String,
    pub dosage: String,
    pub status: DeliveryStatus,
}

impl MedicationEntry {
    pub fn new(owner: &str, medicine: &str, time: String, dosage: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner: owner.to_string(),
            medicine: medicine.to_string(),
            time,
            dosage: dosage.to_string(),
            status: DeliveryStatus::Pending,
        }
    }
}
