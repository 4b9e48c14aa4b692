use chrono::{Datelike, NaiveDate};

/// Whole years between `birthdate` and `today`.
///
/// The year is counted once `(month, day)` of `today` reaches the birthday,
/// so a Feb 29 birthday completes on Mar 1 in common years. Never negative.
pub fn age_on(birthdate: NaiveDate, today: NaiveDate) -> u32 {
    let mut years = today.year() - birthdate.year();
    if (today.month(), today.day()) < (birthdate.month(), birthdate.day()) {
        years -= 1;
    }
    u32::try_from(years).unwrap_or(0)
}
