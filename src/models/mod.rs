pub mod medication;
pub mod reminder;

pub use medication::MedicationEntry;
pub use reminder::{DeliveryStatus, Frequency, ReminderEntry, TakenStatus, split_times};
