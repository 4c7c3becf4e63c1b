use chrono::{DateTime, Utc};
use serde::{self, Deserialize};

const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Serialize Option<String> as empty string when None
pub fn serialize_option_string<S>(option: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match option {
        Some(value) => serializer.serialize_str(value),
        None => serializer.serialize_str(""),
    }
}

/// Deserialize empty string as None
pub fn deserialize_option_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    if s.is_empty() { Ok(None) } else { Ok(Some(s)) }
}

pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format(FORMAT).to_string()
}

/// Compact timestamp used for run directory names
pub fn run_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%d_%H%M%S").to_string()
}

pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_run_timestamp_is_filesystem_safe() {
        let dt = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        assert_eq!(run_timestamp(&dt), "20250314_092653");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("a very long string here", 10), "a very ...");
    }
}
