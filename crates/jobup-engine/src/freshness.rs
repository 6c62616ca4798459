use chrono::{Datelike, NaiveDate};

/// Whether the portal's "last updated" marker reflects the given day.
///
/// The portal renders the date with either a zero-padded or a non-padded day
/// depending on platform and locale, so the marker matches if it contains the
/// date in either form.
pub fn matches_date(marker: &str, date: NaiveDate) -> bool {
    let padded = date.format("%b %d, %Y").to_string();
    let plain = format!("{} {}, {}", date.format("%b"), date.day(), date.year());
    marker.contains(&padded) || marker.contains(&plain)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jan5() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
    }

    #[test]
    fn accepts_zero_padded_rendering() {
        assert!(matches_date("Uploaded on Jan 05, 2024", jan5()));
    }

    #[test]
    fn accepts_non_padded_rendering() {
        assert!(matches_date("Uploaded on Jan 5, 2024", jan5()));
    }

    #[test]
    fn double_digit_days_have_one_rendering() {
        let date = NaiveDate::from_ymd_opt(2024, 11, 23).unwrap();
        assert!(matches_date("Nov 23, 2024", date));
    }

    #[test]
    fn rejects_a_different_day() {
        assert!(!matches_date("Jan 06, 2024", jan5()));
        assert!(!matches_date("Jan 6, 2024", jan5()));
        assert!(!matches_date("no date here", jan5()));
    }
}
