//! Recurrence engine: rule matching and occurrence generation.
//!
//! [`matches_on`] is the pure predicate deciding whether a template calls
//! for an occurrence on a given date; the generator in [`generator`] walks a
//! forward horizon and materializes the missing occurrences idempotently.

mod generator;

pub use generator::{
    generate_all, generate_for_template, GenerationReport, DEFAULT_HORIZON_DAYS,
    MAX_HORIZON_DAYS,
};

use chrono::{Datelike, NaiveDate};

use crate::template::{RecurUnit, Template};

/// Whether `template` calls for an occurrence on `date`.
///
/// Dates outside `[start_date, end_date]` never match. Interval counting is
/// anchored at the start date. A monthly rule whose target day does not
/// exist in a month (say the 31st in April) simply skips that month; there
/// is no roll-forward.
pub fn matches_on(date: NaiveDate, template: &Template) -> bool {
    if date < template.start_date {
        return false;
    }
    if let Some(end) = template.end_date {
        if date > end {
            return false;
        }
    }

    let interval = i64::from(template.interval.max(1));
    match template.unit {
        RecurUnit::Daily => days_between(template.start_date, date) % interval == 0,
        RecurUnit::Weekly => {
            if let Some(days) = &template.weekdays {
                if !days.contains(&date.weekday()) {
                    return false;
                }
            }
            interval == 1 || weeks_between(template.start_date, date) % interval == 0
        }
        RecurUnit::Monthly => {
            if date.day() != template.target_day_of_month() {
                return false;
            }
            interval == 1 || months_between(template.start_date, date) % interval == 0
        }
        RecurUnit::Yearly => {
            if date.month() != template.start_date.month()
                || date.day() != template.start_date.day()
            {
                return false;
            }
            interval == 1
                || i64::from(date.year() - template.start_date.year()) % interval == 0
        }
    }
}

/// Whole days from `from` to `to`.
fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Whole weeks from `from` to `to`.
fn weeks_between(from: NaiveDate, to: NaiveDate) -> i64 {
    days_between(from, to) / 7
}

/// Signed month distance, ignoring days-of-month.
fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    i64::from(to.year() - from.year()) * 12 + i64::from(to.month()) - i64::from(from.month())
}
