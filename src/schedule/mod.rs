pub mod evaluator;
pub mod lifecycle;
pub mod ops;
pub mod resolver;

use chrono::NaiveDate;

use crate::models::{DeliveryStatus, MedicationEntry, ReminderEntry, TakenStatus};

pub use evaluator::{DueAlert, deliver_due, evaluate};

/// Anything the evaluator can resolve and deliver.
///
/// General reminders and medication entries share resolution and the
/// Pending → Delivered rule through this trait.
pub trait Alertable {
    fn id(&self) -> &str;
    fn owner(&self) -> &str;
    /// Short human label, e.g. `Clinic visit (bring reports)` or `Take Metformin - 500mg`
    fn label(&self) -> String;
    /// Day the time specifications resolve against, given the evaluation day.
    fn anchor_date(&self, today: NaiveDate) -> Option<NaiveDate>;
    fn time_specs(&self) -> &[String];
    fn delivery(&self) -> DeliveryStatus;
    fn set_delivery(&mut self, status: DeliveryStatus);
    /// Only shapes with a manual acknowledgment report one.
    fn taken(&self) -> Option<TakenStatus> {
        None
    }
}

impl Alertable for ReminderEntry {
    fn id(&self) -> &str {
        &self.id
    }

    fn owner(&self) -> &str {
        &self.owner
    }

    fn label(&self) -> String {
        format!("{} ({})", self.title, self.notes)
    }

    fn anchor_date(&self, _today: NaiveDate) -> Option<NaiveDate> {
        resolver::parse_stored_date(&self.date)
    }

    fn time_specs(&self) -> &[String] {
        &self.times
    }

    fn delivery(&self) -> DeliveryStatus {
        self.delivery_status
    }

    fn set_delivery(&mut self, status: DeliveryStatus) {
        self.delivery_status = status;
    }

    fn taken(&self) -> Option<TakenStatus> {
        Some(self.taken_status)
    }
}

impl Alertable for MedicationEntry {
    fn id(&self) -> &str {
        &self.id
    }

    fn owner(&self) -> &str {
        &self.owner
    }

    fn label(&self) -> String {
        format!("Take {} - {}", self.medicine, self.dosage)
    }

    fn anchor_date(&self, today: NaiveDate) -> Option<NaiveDate> {
        Some(today)
    }

    fn time_specs(&self) -> &[String] {
        std::slice::from_ref(&self.time)
    }

    fn delivery(&self) -> DeliveryStatus {
        self.status
    }

    fn set_delivery(&mut self, status: DeliveryStatus) {
        self.status = status;
    }
}
