use chrono::{DateTime, NaiveDate};

/// Truncate to `max_len` chars, ending in "..." when cut.
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    return s.to_string();
  }
  let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
  format!("{}...", kept)
}

/// `YYYY-MM-DD` for RFC 3339 timestamps and plain dates; anything else is
/// shown as-is.
pub fn format_date(raw: &str) -> String {
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return dt.format("%Y-%m-%d").to_string();
  }
  if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
    return date.format("%Y-%m-%d").to_string();
  }
  raw.to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_truncate() {
    assert_eq!(truncate("hello", 5), "hello");
    assert_eq!(truncate("hello world", 8), "hello...");
    assert_eq!(truncate("réductions", 7), "rédu...");
  }

  #[test]
  fn test_format_date() {
    assert_eq!(format_date("2024-03-01T10:15:00Z"), "2024-03-01");
    assert_eq!(format_date("2024-03-01T23:15:00-05:00"), "2024-03-01");
    assert_eq!(format_date("2024-03-01"), "2024-03-01");
    assert_eq!(format_date("soon"), "soon");
  }
}
