//! Task occurrence model and lifecycle mutations.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Task priority ordinal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Default priority
    Normal,
    /// Elevated
    High,
    /// Drop everything
    Urgent,
}

impl Priority {
    /// Stored integer form (0/1/2).
    pub fn as_i64(self) -> i64 {
        match self {
            Priority::Normal => 0,
            Priority::High => 1,
            Priority::Urgent => 2,
        }
    }

    /// From the stored integer form; out-of-range values fall back to normal.
    pub fn from_i64(value: i64) -> Self {
        match value {
            2 => Priority::Urgent,
            1 => Priority::High,
            _ => Priority::Normal,
        }
    }

    /// Parse a user-facing priority name.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "normal" => Some(Priority::Normal),
            "high" => Some(Priority::High),
            "urgent" => Some(Priority::Urgent),
            _ => None,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

/// Where an active task lives on the dashboard.
///
/// `Dated` is implied by a due date; the other three partition the undated
/// set. Placement is a stored attribute set by the move operations, so the
/// buckets never depend on magic tag values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    /// Scheduled on a concrete date
    Dated,
    /// Undated, surfaced near the top of the dashboard
    Soon,
    /// Undated, parked for future consideration
    Someday,
    /// Undated, not yet triaged
    Inbox,
}

impl Default for Placement {
    fn default() -> Self {
        Placement::Inbox
    }
}

/// A single actionable item, either ad-hoc or generated from a template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier, assigned by the store on insert
    pub id: i64,
    /// Task title
    pub title: String,
    /// Optional description
    pub description: Option<String>,
    /// Scheduled calendar date
    pub due_date: Option<NaiveDate>,
    /// Time of day; only meaningful together with a due date
    pub due_time: Option<NaiveTime>,
    /// Free-form lowercase labels
    pub tags: Vec<String>,
    /// Optional project label
    pub project: Option<String>,
    /// Priority ordinal
    pub priority: Priority,
    /// Dashboard placement; `Dated` iff a due date is set
    pub placement: Placement,
    /// When a reminder was last sent for this task
    pub reminded_at: Option<DateTime<Utc>>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
    /// Completion timestamp (null while the task is active)
    pub completed_at: Option<DateTime<Utc>>,
    /// Originating template, if generated. Weak reference: the template may
    /// have been deleted since, and the id is kept as-is.
    pub template_id: Option<i64>,
}

impl Task {
    /// Create a new inbox task with default values. The id is assigned on
    /// insert.
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Task {
            id: 0,
            title: title.into(),
            description: None,
            due_date: None,
            due_time: None,
            tags: Vec::new(),
            project: None,
            priority: Priority::Normal,
            placement: Placement::Inbox,
            reminded_at: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
            template_id: None,
        }
    }

    /// Whether the task is still open.
    pub fn is_active(&self) -> bool {
        self.completed_at.is_none()
    }

    /// Schedule the task on a concrete date, optionally with a time of day.
    pub fn set_due(&mut self, date: NaiveDate, time: Option<NaiveTime>) {
        self.due_date = Some(date);
        self.due_time = time;
        self.placement = Placement::Dated;
        self.touch();
    }

    /// Drop the due date; an un-moved task lands back in the inbox.
    pub fn clear_due(&mut self) {
        self.due_date = None;
        self.due_time = None;
        if self.placement == Placement::Dated {
            self.placement = Placement::Inbox;
        }
        self.touch();
    }

    /// Move to the soon bucket, shedding any due date.
    pub fn move_to_soon(&mut self) {
        self.move_undated(Placement::Soon);
    }

    /// Move to the someday bucket, shedding any due date.
    pub fn move_to_someday(&mut self) {
        self.move_undated(Placement::Someday);
    }

    /// Move back to the inbox, shedding any due date.
    pub fn move_to_inbox(&mut self) {
        self.move_undated(Placement::Inbox);
    }

    fn move_undated(&mut self, placement: Placement) {
        debug_assert!(placement != Placement::Dated);
        self.due_date = None;
        self.due_time = None;
        self.placement = placement;
        self.touch();
    }

    /// Mark completed now. No-op on an already completed task.
    pub fn complete(&mut self) {
        if self.completed_at.is_none() {
            self.completed_at = Some(Utc::now());
            self.touch();
        }
    }

    /// Reopen a completed task.
    pub fn reopen(&mut self) {
        self.completed_at = None;
        self.touch();
    }

    /// Record that a reminder went out.
    pub fn mark_reminded(&mut self) {
        self.reminded_at = Some(Utc::now());
        self.touch();
    }

    /// Check model invariants before a storage write.
    ///
    /// # Errors
    /// Returns an error for a blank title, a due time without a due date, or
    /// a placement that disagrees with the due date.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.due_time.is_some() && self.due_date.is_none() {
            return Err(ValidationError::InvalidValue {
                field: "due_time".to_string(),
                message: "a due time requires a due date".to_string(),
            });
        }
        if (self.placement == Placement::Dated) != self.due_date.is_some() {
            return Err(ValidationError::InvalidValue {
                field: "placement".to_string(),
                message: "dated placement must match the presence of a due date".to_string(),
            });
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Normalize a comma-separated tag list: lowercase, trimmed, deduplicated,
/// empty entries dropped. Commas cannot survive into a tag by construction.
pub fn normalize_tags(input: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for raw in input.split(',') {
        let tag = raw.trim().to_lowercase();
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_task_is_active_inbox() {
        let task = Task::new("write report");
        assert!(task.is_active());
        assert_eq!(task.placement, Placement::Inbox);
        assert!(task.validate().is_ok());
    }

    #[test]
    fn due_date_implies_dated_placement() {
        let mut task = Task::new("write report");
        task.set_due(date(2026, 3, 1), None);
        assert_eq!(task.placement, Placement::Dated);
        assert!(task.validate().is_ok());

        task.clear_due();
        assert_eq!(task.placement, Placement::Inbox);
        assert!(task.due_time.is_none());
    }

    #[test]
    fn moves_are_mutually_exclusive() {
        let mut task = Task::new("write report");
        task.set_due(date(2026, 3, 1), None);

        task.move_to_soon();
        assert_eq!(task.placement, Placement::Soon);
        assert!(task.due_date.is_none());

        task.move_to_someday();
        assert_eq!(task.placement, Placement::Someday);

        task.move_to_inbox();
        assert_eq!(task.placement, Placement::Inbox);
        assert!(task.validate().is_ok());
    }

    #[test]
    fn complete_and_reopen() {
        let mut task = Task::new("write report");
        task.complete();
        assert!(!task.is_active());
        let first = task.completed_at;
        task.complete();
        assert_eq!(task.completed_at, first);
        task.reopen();
        assert!(task.is_active());
    }

    #[test]
    fn validation_rejects_inconsistency() {
        let mut task = Task::new("  ");
        assert!(task.validate().is_err());

        task.title = "ok".to_string();
        task.due_time = chrono::NaiveTime::from_hms_opt(9, 0, 0);
        assert!(task.validate().is_err());

        task.due_time = None;
        task.placement = Placement::Dated;
        assert!(task.validate().is_err());
    }

    #[test]
    fn tag_normalization() {
        assert_eq!(
            normalize_tags("Work, home,,  WORK , deep-focus"),
            vec!["work", "home", "deep-focus"]
        );
        assert!(normalize_tags("").is_empty());
    }
}
