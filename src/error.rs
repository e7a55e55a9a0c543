use thiserror::Error;

/// Errors raised by reminder and medication operations.
///
/// Everything except `Store` is an operator mistake: the requested operation
/// is skipped and the message is shown, nothing is written.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Invalid date '{0}'. Use DD/MM/YYYY, DD/MM/YY, DD-MM-YYYY or DD-MM-YY")]
    MalformedDate(String),

    #[error("Invalid time '{0}'. Use HH:MM (24-hour)")]
    MalformedTime(String),

    #[error("A member name is required")]
    MissingOwner,

    #[error("At least one time is required")]
    NoTimes,

    #[error("Unknown frequency '{0}'. Use once, daily, weekly or monthly")]
    UnknownFrequency(String),

    #[error("No reminders to mark as taken for {owner}")]
    NoReminders { owner: String },

    #[error("Invalid index {index} (table has {len} rows)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("'{0}' is not a valid number")]
    NotANumber(String),

    #[error("No reminder with id '{id}' for {owner}")]
    UnknownId { id: String, owner: String },

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl ScheduleError {
    /// True for errors that only abort the current operation.
    pub fn is_operator_error(&self) -> bool {
        !matches!(self, ScheduleError::Store(_))
    }
}

pub type ScheduleResult<T> = std::result::Result<T, ScheduleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_errors_are_recoverable() {
        assert!(ScheduleError::NoTimes.is_operator_error());
        assert!(ScheduleError::IndexOutOfRange { index: 3, len: 3 }.is_operator_error());
        assert!(ScheduleError::NoReminders { owner: "asha".into() }.is_operator_error());
        assert!(!ScheduleError::Store(anyhow::anyhow!("disk full")).is_operator_error());
    }

    #[test]
    fn test_error_display() {
        let err = ScheduleError::IndexOutOfRange { index: 4, len: 4 };
        assert_eq!(err.to_string(), "Invalid index 4 (table has 4 rows)");

        let err = ScheduleError::MalformedDate("2024/13/45".into());
        assert!(err.to_string().contains("DD/MM/YYYY"));
    }
}
