use chrono::NaiveDateTime;

/// Format a duration in seconds to "Xh Ym" or "Ym" string
pub fn format_duration_secs(secs: i64) -> String {
    if secs <= 0 {
        return "now".to_string();
    }
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    if hours >= 24 {
        format!("{}d {}h", hours / 24, hours % 24)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Format an instant as "YYYY-MM-DD HH:MM"
pub fn format_instant(t: NaiveDateTime) -> String {
    t.format("%Y-%m-%d %H:%M").to_string()
}

/// "in 1h 5m" / "12m ago"
pub fn relative_to(at: NaiveDateTime, now: NaiveDateTime) -> String {
    let secs = (at - now).num_seconds();
    if secs >= 0 {
        format!("in {}", format_duration_secs(secs))
    } else {
        format!("{} ago", format_duration_secs(-secs))
    }
}

/// First eight characters of an id, enough to address it
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
