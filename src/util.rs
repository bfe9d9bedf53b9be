use crate::error::{CanaiError, Result};
use chrono::{Days, Local, NaiveDate};

/// Parse a calendar day: `YYYY-MM-DD`, `today`, or a relative form such as
/// `7 days ago`, `2 weeks ago`, `3 months ago` (a month counts as 30 days).
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    parse_date_from(input, Local::now().date_naive())
}

fn parse_date_from(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let trimmed = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }

    if trimmed.eq_ignore_ascii_case("today") {
        return Ok(today);
    }

    if let Some(days) = parse_natural_days(trimmed) {
        return today.checked_sub_days(Days::new(days)).ok_or_else(|| {
            CanaiError::InvalidDate(format!("'{input}' reaches before the calendar starts"))
        });
    }

    Err(CanaiError::InvalidDate(format!(
        "'{input}'. Use the format YYYY-MM-DD."
    )))
}

fn parse_natural_days(input: &str) -> Option<u64> {
    let input = input.to_lowercase();

    let units: [(&str, u64); 6] = [
        (" days ago", 1),
        (" day ago", 1),
        (" weeks ago", 7),
        (" week ago", 7),
        (" months ago", 30),
        (" month ago", 30),
    ];

    units.iter().find_map(|(suffix, scale)| {
        input
            .strip_suffix(suffix)
            .and_then(|n| n.trim().parse::<u64>().ok())
            .and_then(|n| n.checked_mul(*scale))
    })
}
