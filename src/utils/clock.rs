use anyhow::{Result, anyhow};
use chrono::{FixedOffset, NaiveDateTime, Utc};

/// Wall clock pinned to one civil offset (IST by default).
#[derive(Debug, Clone)]
pub struct CivilClock {
    offset: FixedOffset,
    label: String,
}

impl CivilClock {
    pub fn new(offset_minutes: i32, label: &str) -> Result<Self> {
        let offset = offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| anyhow!("Invalid timezone offset: {}", offset_minutes))?;
        Ok(Self {
            offset,
            label: label.to_string(),
        })
    }

    /// Current local date and time, without offset.
    pub fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.offset).naive_local()
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}
