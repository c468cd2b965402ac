use chrono::{Datelike, NaiveDate};

/// Calendar-month windows anchored at a reference date.
///
/// The current window is open-ended (`date >= current_start`); the previous
/// window covers the whole prior calendar month, both bounds inclusive. In the
/// first month of the calendar there is no prior month and the previous
/// window is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindows {
    pub current_start: NaiveDate,
    pub previous_start: NaiveDate,
    pub previous_end: NaiveDate,
}

impl MonthWindows {
    pub fn anchored_at(reference: NaiveDate) -> Self {
        let current_start = first_of_month(reference);
        let (previous_start, previous_end) = match current_start.pred_opt() {
            Some(previous_end) => (first_of_month(previous_end), previous_end),
            None => (current_start, current_start),
        };

        Self {
            current_start,
            previous_start,
            previous_end,
        }
    }

    pub fn in_current(&self, date: NaiveDate) -> bool {
        date >= self.current_start
    }

    pub fn in_previous(&self, date: NaiveDate) -> bool {
        self.previous_end < self.current_start
            && date >= self.previous_start
            && date <= self.previous_end
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn windows_cover_current_and_prior_month() {
        let windows = MonthWindows::anchored_at(date(2025, 3, 14));
        assert_eq!(windows.current_start, date(2025, 3, 1));
        assert_eq!(windows.previous_start, date(2025, 2, 1));
        assert_eq!(windows.previous_end, date(2025, 2, 28));

        assert!(windows.in_previous(date(2025, 2, 28)));
        assert!(windows.in_previous(date(2025, 2, 1)));
        assert!(!windows.in_previous(date(2025, 3, 1)));
        assert!(windows.in_current(date(2025, 3, 1)));
        assert!(!windows.in_current(date(2025, 2, 28)));
    }

    #[test]
    fn january_rolls_back_into_december() {
        let windows = MonthWindows::anchored_at(date(2026, 1, 1));
        assert_eq!(windows.previous_start, date(2025, 12, 1));
        assert_eq!(windows.previous_end, date(2025, 12, 31));
    }

    #[test]
    fn earliest_month_has_an_empty_previous_window() {
        let windows = MonthWindows::anchored_at(NaiveDate::MIN);
        assert_eq!(windows.current_start, NaiveDate::MIN);
        assert!(!windows.in_previous(NaiveDate::MIN));
        assert!(windows.in_current(NaiveDate::MIN));
    }
}
