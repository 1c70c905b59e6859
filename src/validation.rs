use validator::ValidationError;

/// Weekday abbreviations accepted in `selected_days`, indexed 0 = Sunday
pub const WEEKDAY_ABBREVS: &[&str] = &["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Validates that a color token is a `#rrggbb` hex value
pub fn validate_color_token(color: &str) -> Result<(), ValidationError> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        let mut error = ValidationError::new("invalid_color");
        error.message = Some(format!("'{}' is not a #rrggbb color token", color).into());
        return Err(error);
    }
    Ok(())
}

/// Validates that every selected-day entry is either a weekday
/// abbreviation (`Sun`..`Sat`) or a day-of-month numeral (1-31)
pub fn validate_selected_days(days: &Vec<String>) -> Result<(), ValidationError> {
    for day in days {
        let is_weekday = WEEKDAY_ABBREVS.contains(&day.as_str());
        let is_day_of_month = day
            .parse::<u32>()
            .map(|n| (1..=31).contains(&n))
            .unwrap_or(false);
        if !is_weekday && !is_day_of_month {
            let mut error = ValidationError::new("invalid_selected_day");
            error.message =
                Some(format!("'{}' is not a weekday abbreviation or day of month", day).into());
            return Err(error);
        }
    }
    Ok(())
}
