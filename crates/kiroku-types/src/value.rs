//! Validation for the values carried by date and time blocks.
//!
//! Values stay plain strings on the block so the structured projection is a
//! straight copy; these helpers gate what the edit engine will store.

use thiserror::Error;

/// A date or time value that does not match its expected shape.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValueError {
    #[error("invalid date {0:?}: expected YYYY-MM-DD")]
    Date(String),
    #[error("invalid time {0:?}: expected HH:MM (24h)")]
    Time(String),
}

fn digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn days_in_month(year: u32, month: u32) -> u32 {
    match month {
        2 if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Check a `YYYY-MM-DD` calendar date.
pub fn validate_date(value: &str) -> Result<(), ValueError> {
    let err = || ValueError::Date(value.to_string());
    let parts: Vec<&str> = value.split('-').collect();
    let [y, m, d] = parts.as_slice() else {
        return Err(err());
    };
    if y.len() != 4 || m.len() != 2 || d.len() != 2 {
        return Err(err());
    }
    let (year, month, day) = match (digits(y), digits(m), digits(d)) {
        (Some(y), Some(m), Some(d)) => (y, m, d),
        _ => return Err(err()),
    };
    if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
        return Err(err());
    }
    Ok(())
}

/// Check a 24-hour `HH:MM` time.
pub fn validate_time(value: &str) -> Result<(), ValueError> {
    let err = || ValueError::Time(value.to_string());
    let (h, m) = value.split_once(':').ok_or_else(err)?;
    if h.len() != 2 || m.len() != 2 {
        return Err(err());
    }
    match (digits(h), digits(m)) {
        (Some(h), Some(m)) if h < 24 && m < 60 => Ok(()),
        _ => Err(err()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_dates() {
        assert!(validate_date("2024-02-29").is_ok());
        assert!(validate_date("2023-12-31").is_ok());
    }

    #[test]
    fn test_invalid_dates() {
        assert!(validate_date("2023-02-29").is_err());
        assert!(validate_date("2023-13-01").is_err());
        assert!(validate_date("23-01-01").is_err());
        assert!(validate_date("2023-1-01").is_err());
        assert!(validate_date("tomorrow").is_err());
        assert_eq!(
            validate_date("1900-02-29"),
            Err(ValueError::Date("1900-02-29".into()))
        );
    }

    #[test]
    fn test_times() {
        assert!(validate_time("00:00").is_ok());
        assert!(validate_time("23:59").is_ok());
        assert!(validate_time("24:00").is_err());
        assert!(validate_time("9:30").is_err());
        assert!(validate_time("12:60").is_err());
        assert!(validate_time("noon").is_err());
    }
}
