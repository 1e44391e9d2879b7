use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy)]
pub enum AccessorMode {
    Sort,
    Filter,
}

/// Human-readable age of an RFC3339 timestamp, kubectl style (`3d4h`, `12m5s`).
pub fn time_since(ts_str: &str) -> String {
    let Ok(ts) = ts_str.parse::<DateTime<Utc>>() else {
        return String::new();
    };
    let diff = Utc::now().signed_duration_since(ts);

    if diff.num_seconds() < 0 {
        return "In the future".to_string();
    }

    let days = diff.num_days();
    let hours = diff.num_hours() % 24;
    let minutes = diff.num_minutes() % 60;
    let seconds = diff.num_seconds() % 60;

    if days > 365 {
        format!("{}y{}d", days / 365, days % 365)
    } else if days > 7 {
        format!("{}d", days)
    } else if days > 0 {
        format!("{}d{}h", days, hours)
    } else if hours > 0 {
        format!("{}h{}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Zero-padded numeric key so lexical sorting matches numeric order.
pub fn pad_key(n: usize) -> String {
    format!("{:020}", n)
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct FieldValue {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<usize>,
}
