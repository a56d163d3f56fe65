//! Age derived from a birth date at render time.

use chrono::{Datelike, Local, NaiveDate};
use shared::error::RecordError;

pub use shared::domain::parse_birth_date;

/// Completed years between `birth_date` and `today`.
///
/// The anniversary itself counts as reached. A 29 February birthday is reached
/// on 1 March in non-leap years.
pub fn age(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    let mut years = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        years -= 1;
    }
    years
}

pub fn age_today(birth_date: NaiveDate) -> i32 {
    age(birth_date, Local::now().date_naive())
}

/// Malformed input is an error; there is no sentinel age.
pub fn age_from_str(birth_date: &str, today: NaiveDate) -> Result<i32, RecordError> {
    parse_birth_date(birth_date).map(|birth_date| age(birth_date, today))
}

#[cfg(test)]
#[path = "tests/age_tests.rs"]
mod tests;
