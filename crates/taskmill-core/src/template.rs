//! Recurrence templates: the repetition rule plus the payload stamped onto
//! generated occurrences.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::calendar::parse_weekday;
use crate::error::{ParseError, ValidationError};
use crate::task::Priority;

/// Recurrence shape.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecurUnit {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RecurUnit {
    /// Stored string form.
    pub fn as_str(self) -> &'static str {
        match self {
            RecurUnit::Daily => "daily",
            RecurUnit::Weekly => "weekly",
            RecurUnit::Monthly => "monthly",
            RecurUnit::Yearly => "yearly",
        }
    }
}

/// A stored repetition rule. Payload fields (title through priority) are
/// copied verbatim onto every occurrence the rule generates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    /// Unique identifier, assigned by the store on insert
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub due_time: Option<NaiveTime>,
    pub tags: Vec<String>,
    pub project: Option<String>,
    pub priority: Priority,
    /// Recurrence shape
    pub unit: RecurUnit,
    /// Every N units; at least 1
    pub interval: u32,
    /// Allowed weekdays (weekly shape only)
    pub weekdays: Option<Vec<Weekday>>,
    /// Target day of month (monthly shape only); defaults to the start
    /// date's day when unset
    pub day_of_month: Option<u32>,
    /// Inclusive lower bound, and the anchor interval counting starts from
    pub start_date: NaiveDate,
    /// Inclusive upper bound
    pub end_date: Option<NaiveDate>,
    /// Latest date an occurrence was created for. Advisory only: generation
    /// is gated by occurrence existence, never by this marker.
    pub last_generated: Option<NaiveDate>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Template {
    /// Create an enabled template with interval 1 and no bounds beyond the
    /// start date.
    pub fn new(title: impl Into<String>, unit: RecurUnit, start_date: NaiveDate) -> Self {
        let now = Utc::now();
        Template {
            id: 0,
            title: title.into(),
            description: None,
            due_time: None,
            tags: Vec::new(),
            project: None,
            priority: Priority::Normal,
            unit,
            interval: 1,
            weekdays: None,
            day_of_month: None,
            start_date,
            end_date: None,
            last_generated: None,
            enabled: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// The day-of-month a monthly rule targets.
    pub fn target_day_of_month(&self) -> u32 {
        self.day_of_month.unwrap_or_else(|| self.start_date.day())
    }

    /// Check rule invariants before a storage write.
    ///
    /// # Errors
    /// Returns an error for a blank title, a zero interval, an out-of-range
    /// day-of-month, or an end date before the start date.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.interval == 0 {
            return Err(ValidationError::ZeroInterval);
        }
        if let Some(day) = self.day_of_month {
            if !(1..=31).contains(&day) {
                return Err(ValidationError::InvalidValue {
                    field: "day_of_month".to_string(),
                    message: format!("{day} is outside 1-31"),
                });
            }
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(ValidationError::EndBeforeStart {
                    start: self.start_date,
                    end,
                });
            }
        }
        Ok(())
    }
}

/// Parse the operator-facing recurrence descriptor: `[<integer> ]<unit>[s]`
/// with unit one of day/week/month/year, case-insensitive. An omitted
/// integer means 1.
///
/// # Errors
/// Returns [`ParseError::Recurrence`] on anything else, including a zero
/// count.
pub fn parse_recurrence(input: &str) -> Result<(RecurUnit, u32), ParseError> {
    let s = input.trim().to_lowercase();
    let err = || ParseError::Recurrence(input.to_string());

    let (count, unit_str) = match s.split_once(char::is_whitespace) {
        Some((n, u)) => (n.parse::<u32>().map_err(|_| err())?, u.trim()),
        None => (1, s.as_str()),
    };
    if count == 0 {
        return Err(err());
    }

    let unit = match unit_str {
        "day" | "days" => RecurUnit::Daily,
        "week" | "weeks" => RecurUnit::Weekly,
        "month" | "months" => RecurUnit::Monthly,
        "year" | "years" => RecurUnit::Yearly,
        _ => return Err(err()),
    };
    Ok((unit, count))
}

/// Parse a comma-separated weekday list such as `mon,wed,fri`.
///
/// Duplicates collapse; order is preserved.
pub fn parse_weekday_list(input: &str) -> Result<Vec<Weekday>, ParseError> {
    let mut days = Vec::new();
    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let day = parse_weekday(part)?;
        if !days.contains(&day) {
            days.push(day);
        }
    }
    if days.is_empty() {
        return Err(ParseError::Weekday(input.to_string()));
    }
    Ok(days)
}

/// Render a weekday list in the stored `mon,wed,fri` form.
pub fn format_weekday_list(days: &[Weekday]) -> String {
    days.iter().map(|d| weekday_code(*d)).collect::<Vec<_>>().join(",")
}

/// Stored 3-letter code for a weekday.
pub fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "mon",
        Weekday::Tue => "tue",
        Weekday::Wed => "wed",
        Weekday::Thu => "thu",
        Weekday::Fri => "fri",
        Weekday::Sat => "sat",
        Weekday::Sun => "sun",
    }
}
