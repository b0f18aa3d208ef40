//! Timezone-aware calendar resolution, parsing, and formatting.
//!
//! A [`Calendar`] carries the configured IANA timezone and resolves the
//! current instant to a calendar date. Everything else in this module is a
//! pure function of its inputs: once a `NaiveDate` exists, arithmetic on it
//! is timezone-independent. The `*_from` variants take an explicit "today"
//! so parsing can be tested against literal dates.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;

use crate::error::{ConfigError, ParseError};

/// Calendar context bound to a configured timezone.
///
/// Built once per invocation from the configuration value and passed down
/// explicitly; nothing in this crate caches the resolved timezone globally.
#[derive(Debug, Clone)]
pub struct Calendar {
    tz: Tz,
}

impl Calendar {
    /// Build a calendar for an IANA timezone name such as `Europe/Berlin`.
    ///
    /// # Errors
    /// Returns an error if the name is not a known timezone.
    pub fn new(timezone: &str) -> Result<Self, ConfigError> {
        let tz = timezone.parse::<Tz>().map_err(|_| ConfigError::InvalidValue {
            key: "timezone".to_string(),
            message: format!("unknown timezone '{timezone}'"),
        })?;
        Ok(Calendar { tz })
    }

    /// The configured timezone name.
    pub fn timezone(&self) -> &'static str {
        self.tz.name()
    }

    /// Today's date in the configured timezone.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }

    /// Tomorrow's date in the configured timezone.
    pub fn tomorrow(&self) -> NaiveDate {
        self.today() + Duration::days(1)
    }

    /// The date `n` days from today; negative `n` yields a past date.
    pub fn days_from_now(&self, n: i64) -> NaiveDate {
        self.today() + Duration::days(n)
    }

    /// Parse a date expression relative to today in the configured timezone.
    ///
    /// See [`parse_date_from`] for the accepted grammar.
    ///
    /// # Errors
    /// Returns [`ParseError::Date`] on anything outside the grammar.
    pub fn parse_date(&self, input: &str) -> Result<NaiveDate, ParseError> {
        parse_date_from(input, self.today())
    }

    /// Parse a time-of-day expression. Accepts 24-hour `H:MM`/`HH:MM` and
    /// 12-hour `H[:MM]am|pm`; `12am` normalizes to 00:00, `12pm` stays 12:00.
    pub fn parse_time(&self, input: &str) -> Result<NaiveTime, ParseError> {
        parse_time(input)
    }

    /// Render a date for display, special-casing "Today" and "Tomorrow".
    pub fn format_date(&self, date: NaiveDate) -> String {
        format_date_from(date, self.today())
    }

    /// Render a time-of-day in 12-hour form, e.g. `2:30pm`.
    pub fn format_time(&self, time: NaiveTime) -> String {
        format_time(time)
    }
}

/// An ordered sequence of `count` consecutive dates starting at `start`.
pub fn date_range(start: NaiveDate, count: u32) -> Vec<NaiveDate> {
    (0..i64::from(count)).map(|i| start + Duration::days(i)).collect()
}

/// Parse a date expression against an explicit `today`.
///
/// Accepted forms, case-insensitively:
/// - `today`, `tomorrow`
/// - a weekday name, full or 3-letter (`friday`, `fri`): the next
///   occurrence strictly after today, so naming today's weekday lands 7
///   days out
/// - `next <weekday>`: as above, shifted a further 7 days
/// - `+Nd`, `+Nw`: relative offsets in days or weeks
/// - `YYYY-MM-DD`
/// - `M/D` or `M/D/YYYY`: the year defaults to today's
/// - `<month-name> D[, YYYY]`: e.g. `mar 3`, `March 3, 2027`
pub fn parse_date_from(input: &str, today: NaiveDate) -> Result<NaiveDate, ParseError> {
    let s = input.trim().to_lowercase();

    match s.as_str() {
        "today" => return Ok(today),
        "tomorrow" => return Ok(today + Duration::days(1)),
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("next ") {
        let weekday = parse_weekday(rest.trim())?;
        return Ok(next_weekday(today, weekday) + Duration::days(7));
    }

    if let Ok(weekday) = parse_weekday(&s) {
        return Ok(next_weekday(today, weekday));
    }

    if let Some(rest) = s.strip_prefix('+') {
        if let Some(n) = rest.strip_suffix('d').and_then(|num| num.parse::<i64>().ok()) {
            return Ok(today + Duration::days(n));
        }
        if let Some(n) = rest.strip_suffix('w').and_then(|num| num.parse::<i64>().ok()) {
            return Ok(today + Duration::weeks(n));
        }
        return Err(ParseError::Date(input.to_string()));
    }

    if let Ok(date) = NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
        return Ok(date);
    }

    if s.contains('/') {
        return parse_us_date(&s, today.year()).ok_or_else(|| ParseError::Date(input.to_string()));
    }

    parse_month_name_date(&s, today.year()).ok_or_else(|| ParseError::Date(input.to_string()))
}

/// Parse a time-of-day expression; see [`Calendar::parse_time`].
pub fn parse_time(input: &str) -> Result<NaiveTime, ParseError> {
    let s = input.trim().to_lowercase();

    let (body, meridiem) = if let Some(b) = s.strip_suffix("am") {
        (b.trim_end(), Some(false))
    } else if let Some(b) = s.strip_suffix("pm") {
        (b.trim_end(), Some(true))
    } else {
        (s.as_str(), None)
    };

    let err = || ParseError::Time(input.to_string());

    let (hour_str, minute_str) = match body.split_once(':') {
        Some((h, m)) => (h, Some(m)),
        None => (body, None),
    };
    let hour: u32 = hour_str.parse().map_err(|_| err())?;
    let minute: u32 = match minute_str {
        Some(m) if m.len() == 2 => m.parse().map_err(|_| err())?,
        Some(_) => return Err(err()),
        None => 0,
    };

    let hour = match meridiem {
        None => {
            // 24-hour form requires explicit minutes.
            if minute_str.is_none() || hour > 23 {
                return Err(err());
            }
            hour
        }
        Some(pm) => {
            if hour == 0 || hour > 12 {
                return Err(err());
            }
            match (pm, hour) {
                (false, 12) => 0,
                (true, h) if h < 12 => h + 12,
                (_, h) => h,
            }
        }
    };

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(err)
}

/// Render a date against an explicit `today`.
pub fn format_date_from(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        return "Today".to_string();
    }
    if date == today + Duration::days(1) {
        return "Tomorrow".to_string();
    }
    if date.year() == today.year() {
        date.format("%a %b %-d").to_string()
    } else {
        date.format("%a %b %-d %Y").to_string()
    }
}

/// Render a time in 12-hour form, e.g. `9:05am`.
pub fn format_time(time: NaiveTime) -> String {
    time.format("%-I:%M%P").to_string()
}

/// Parse a weekday name, full or 3-letter abbreviation.
pub fn parse_weekday(input: &str) -> Result<Weekday, ParseError> {
    let day = match input.trim().to_lowercase().as_str() {
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tue" => Weekday::Tue,
        "wednesday" | "wed" => Weekday::Wed,
        "thursday" | "thu" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" | "sat" => Weekday::Sat,
        "sunday" | "sun" => Weekday::Sun,
        _ => return Err(ParseError::Weekday(input.to_string())),
    };
    Ok(day)
}

/// The next occurrence of `weekday` strictly after `today`.
fn next_weekday(today: NaiveDate, weekday: Weekday) -> NaiveDate {
    let delta = (i64::from(weekday.num_days_from_monday())
        - i64::from(today.weekday().num_days_from_monday()))
    .rem_euclid(7);
    today + Duration::days(if delta == 0 { 7 } else { delta })
}

fn parse_us_date(s: &str, default_year: i32) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split('/').collect();
    let (month, day, year) = match parts.as_slice() {
        [m, d] => (m.parse().ok()?, d.parse().ok()?, default_year),
        [m, d, y] => (m.parse().ok()?, d.parse().ok()?, y.parse().ok()?),
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_month_name_date(s: &str, default_year: i32) -> Option<NaiveDate> {
    let mut parts = s.split_whitespace();
    let month = parse_month_name(parts.next()?)?;
    let day: u32 = parts.next()?.trim_end_matches(',').parse().ok()?;
    let year = match parts.next() {
        Some(y) => y.parse().ok()?,
        None => default_year,
    };
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_month_name(name: &str) -> Option<u32> {
    let month = match name {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sep" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}
