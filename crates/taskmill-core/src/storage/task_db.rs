//! SQLite-based storage for task occurrences and recurrence templates.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::data_dir;
use super::migrations;
use crate::error::{DatabaseError, Result};
use crate::task::{Placement, Priority, Task};
use crate::template::{format_weekday_list, parse_weekday_list, RecurUnit, Template};

// === Helper Functions ===

/// Format a calendar date for database storage
fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a calendar date column
fn parse_date_col(s: Option<String>) -> Option<NaiveDate> {
    s.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
}

/// Format a time-of-day for database storage
fn format_time_col(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Parse a time-of-day column
fn parse_time_col(s: Option<String>) -> Option<NaiveTime> {
    s.and_then(|s| NaiveTime::parse_from_str(&s, "%H:%M").ok())
}

/// Parse placement from database string
fn parse_placement(s: &str) -> Placement {
    match s {
        "dated" => Placement::Dated,
        "soon" => Placement::Soon,
        "someday" => Placement::Someday,
        _ => Placement::Inbox,
    }
}

/// Format placement for database storage
fn format_placement(placement: Placement) -> &'static str {
    match placement {
        Placement::Dated => "dated",
        Placement::Soon => "soon",
        Placement::Someday => "someday",
        Placement::Inbox => "inbox",
    }
}

/// Parse recurrence shape from database string
fn parse_unit(s: &str) -> RecurUnit {
    match s {
        "weekly" => RecurUnit::Weekly,
        "monthly" => RecurUnit::Monthly,
        "yearly" => RecurUnit::Yearly,
        _ => RecurUnit::Daily,
    }
}

/// Tags are stored comma-joined; normalization keeps commas out of tags.
fn join_tags(tags: &[String]) -> String {
    tags.join(",")
}

fn split_tags(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse datetime from RFC3339 string with fallback to current time
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn parse_datetime_opt(s: Option<String>) -> Option<DateTime<Utc>> {
    s.and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

const TASK_COLUMNS: &str = "id, title, description, due_date, due_time, tags, project, \
     priority, placement, created_at, updated_at, completed_at, template_id, reminded_at";

/// Build a Task from a database row (column order per `TASK_COLUMNS`)
fn row_to_task(row: &rusqlite::Row) -> std::result::Result<Task, rusqlite::Error> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        due_date: parse_date_col(row.get(3)?),
        due_time: parse_time_col(row.get(4)?),
        tags: split_tags(&row.get::<_, String>(5)?),
        project: row.get(6)?,
        priority: Priority::from_i64(row.get(7)?),
        placement: parse_placement(&row.get::<_, String>(8)?),
        created_at: parse_datetime_fallback(&row.get::<_, String>(9)?),
        updated_at: parse_datetime_fallback(&row.get::<_, String>(10)?),
        completed_at: parse_datetime_opt(row.get(11)?),
        template_id: row.get(12)?,
        reminded_at: parse_datetime_opt(row.get(13)?),
    })
}

const TEMPLATE_COLUMNS: &str = "id, title, description, due_time, tags, project, priority, \
     recur_unit, recur_interval, recur_days, recur_day_of_month, start_date, end_date, \
     last_generated, enabled, created_at, updated_at";

/// Build a Template from a database row (column order per `TEMPLATE_COLUMNS`)
fn row_to_template(row: &rusqlite::Row) -> std::result::Result<Template, rusqlite::Error> {
    let interval: i64 = row.get(8)?;
    let days: Option<String> = row.get(9)?;
    let day_of_month: Option<i64> = row.get(10)?;
    let start_date: String = row.get(11)?;

    Ok(Template {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        due_time: parse_time_col(row.get(3)?),
        tags: split_tags(&row.get::<_, String>(4)?),
        project: row.get(5)?,
        priority: Priority::from_i64(row.get(6)?),
        unit: parse_unit(&row.get::<_, String>(7)?),
        interval: interval.max(1) as u32,
        weekdays: days.as_deref().and_then(|s| parse_weekday_list(s).ok()),
        day_of_month: day_of_month.map(|d| d as u32),
        start_date: NaiveDate::parse_from_str(&start_date, "%Y-%m-%d").map_err(|_| {
            rusqlite::Error::InvalidColumnType(11, "start_date".to_string(), rusqlite::types::Type::Text)
        })?,
        end_date: parse_date_col(row.get(12)?),
        last_generated: parse_date_col(row.get(13)?),
        enabled: row.get::<_, i64>(14)? != 0,
        created_at: parse_datetime_fallback(&row.get::<_, String>(15)?),
        updated_at: parse_datetime_fallback(&row.get::<_, String>(16)?),
    })
}

/// SQLite database owning the `tasks` and `templates` tables.
pub struct TaskDb {
    conn: Connection,
}

impl TaskDb {
    /// Open the database at `<data_dir>/taskmill.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("taskmill.db");
        let conn = Connection::open(&path).map_err(|source| DatabaseError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "opened task database");
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        // Base tables (v1 schema) first
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS tasks (
                    id           INTEGER PRIMARY KEY AUTOINCREMENT,
                    title        TEXT NOT NULL,
                    description  TEXT,
                    due_date     TEXT,
                    due_time     TEXT,
                    tags         TEXT NOT NULL DEFAULT '',
                    project      TEXT,
                    priority     INTEGER NOT NULL DEFAULT 0,
                    placement    TEXT NOT NULL DEFAULT 'inbox',
                    created_at   TEXT NOT NULL,
                    updated_at   TEXT NOT NULL,
                    completed_at TEXT,
                    template_id  INTEGER
                );

                CREATE TABLE IF NOT EXISTS templates (
                    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
                    title              TEXT NOT NULL,
                    description        TEXT,
                    due_time           TEXT,
                    tags               TEXT NOT NULL DEFAULT '',
                    project            TEXT,
                    priority           INTEGER NOT NULL DEFAULT 0,
                    recur_unit         TEXT NOT NULL,
                    recur_interval     INTEGER NOT NULL DEFAULT 1,
                    recur_days         TEXT,
                    recur_day_of_month INTEGER,
                    start_date         TEXT NOT NULL,
                    end_date           TEXT,
                    last_generated     TEXT,
                    enabled            INTEGER NOT NULL DEFAULT 1,
                    created_at         TEXT NOT NULL,
                    updated_at         TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_tasks_due_date ON tasks(due_date);
                CREATE INDEX IF NOT EXISTS idx_tasks_completed_at ON tasks(completed_at);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        // Incremental migrations (v1 -> v2, etc.)
        migrations::migrate(&self.conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        // Occurrence deduplication index. Generation relies on this plus a
        // conflict-tolerant insert, so two racing invocations cannot both
        // materialize the same (template, date) occurrence.
        self.conn
            .execute(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_tasks_template_date
                 ON tasks(template_id, due_date)
                 WHERE template_id IS NOT NULL AND due_date IS NOT NULL",
                [],
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        Ok(())
    }

    // === Task CRUD ===

    /// Create a new task; returns the assigned id.
    ///
    /// # Errors
    /// Returns a validation error before any write if the task is
    /// inconsistent.
    pub fn create_task(&self, task: &Task) -> Result<i64> {
        task.validate()?;
        self.conn.execute(
            "INSERT INTO tasks (
                title, description, due_date, due_time, tags, project,
                priority, placement, created_at, updated_at, completed_at,
                template_id, reminded_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                task.title,
                task.description,
                task.due_date.map(format_date),
                task.due_time.map(format_time_col),
                join_tags(&task.tags),
                task.project,
                task.priority.as_i64(),
                format_placement(task.placement),
                task.created_at.to_rfc3339(),
                task.updated_at.to_rfc3339(),
                task.completed_at.map(|dt| dt.to_rfc3339()),
                task.template_id,
                task.reminded_at.map(|dt| dt.to_rfc3339()),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get a task by id.
    pub fn get_task(&self, id: i64) -> Result<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"))?;
        Ok(stmt.query_row(params![id], row_to_task).optional()?)
    }

    /// List all tasks, oldest first.
    pub fn list_tasks(&self) -> Result<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY id"))?;
        let tasks = stmt.query_map([], row_to_task)?;
        Ok(tasks.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Update an existing task.
    pub fn update_task(&self, task: &Task) -> Result<()> {
        task.validate()?;
        self.conn.execute(
            "UPDATE tasks
             SET title = ?1, description = ?2, due_date = ?3, due_time = ?4,
                 tags = ?5, project = ?6, priority = ?7, placement = ?8,
                 updated_at = ?9, completed_at = ?10, template_id = ?11,
                 reminded_at = ?12
             WHERE id = ?13",
            params![
                task.title,
                task.description,
                task.due_date.map(format_date),
                task.due_time.map(format_time_col),
                join_tags(&task.tags),
                task.project,
                task.priority.as_i64(),
                format_placement(task.placement),
                task.updated_at.to_rfc3339(),
                task.completed_at.map(|dt| dt.to_rfc3339()),
                task.template_id,
                task.reminded_at.map(|dt| dt.to_rfc3339()),
                task.id,
            ],
        )?;
        Ok(())
    }

    /// Delete a task; returns whether a row was removed.
    pub fn delete_task(&self, id: i64) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        Ok(n > 0)
    }

    /// Insert the occurrence of `template` on `date` unless one exists.
    ///
    /// The check-and-insert is a single conflict-tolerant statement against
    /// the `(template_id, due_date)` unique index, so it stays idempotent
    /// under concurrent invocations. Returns the created task, or `None` if
    /// the occurrence was already present.
    pub fn insert_occurrence_if_absent(
        &self,
        template: &Template,
        date: NaiveDate,
    ) -> Result<Option<Task>> {
        let mut task = Task::new(template.title.clone());
        task.description = template.description.clone();
        task.tags = template.tags.clone();
        task.project = template.project.clone();
        task.priority = template.priority;
        task.template_id = Some(template.id);
        task.set_due(date, template.due_time);

        let n = self.conn.execute(
            "INSERT OR IGNORE INTO tasks (
                title, description, due_date, due_time, tags, project,
                priority, placement, created_at, updated_at, template_id
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                task.title,
                task.description,
                format_date(date),
                task.due_time.map(format_time_col),
                join_tags(&task.tags),
                task.project,
                task.priority.as_i64(),
                format_placement(task.placement),
                task.created_at.to_rfc3339(),
                task.updated_at.to_rfc3339(),
                task.template_id,
            ],
        )?;

        if n == 0 {
            return Ok(None);
        }
        task.id = self.conn.last_insert_rowid();
        Ok(Some(task))
    }

    // === Template CRUD ===

    /// Create a new template; returns the assigned id.
    ///
    /// # Errors
    /// Returns a validation error before any write if the rule is invalid.
    pub fn create_template(&self, template: &Template) -> Result<i64> {
        template.validate()?;
        self.conn.execute(
            "INSERT INTO templates (
                title, description, due_time, tags, project, priority,
                recur_unit, recur_interval, recur_days, recur_day_of_month,
                start_date, end_date, last_generated, enabled, created_at,
                updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            params![
                template.title,
                template.description,
                template.due_time.map(format_time_col),
                join_tags(&template.tags),
                template.project,
                template.priority.as_i64(),
                template.unit.as_str(),
                i64::from(template.interval),
                template.weekdays.as_deref().map(format_weekday_list),
                template.day_of_month.map(i64::from),
                format_date(template.start_date),
                template.end_date.map(format_date),
                template.last_generated.map(format_date),
                template.enabled,
                template.created_at.to_rfc3339(),
                template.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get a template by id.
    pub fn get_template(&self, id: i64) -> Result<Option<Template>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM templates WHERE id = ?1"
        ))?;
        Ok(stmt.query_row(params![id], row_to_template).optional()?)
    }

    /// List all templates, oldest first.
    pub fn list_templates(&self) -> Result<Vec<Template>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM templates ORDER BY id"
        ))?;
        let templates = stmt.query_map([], row_to_template)?;
        Ok(templates.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Update an existing template.
    pub fn update_template(&self, template: &Template) -> Result<()> {
        template.validate()?;
        self.conn.execute(
            "UPDATE templates
             SET title = ?1, description = ?2, due_time = ?3, tags = ?4,
                 project = ?5, priority = ?6, recur_unit = ?7,
                 recur_interval = ?8, recur_days = ?9, recur_day_of_month = ?10,
                 start_date = ?11, end_date = ?12, last_generated = ?13,
                 enabled = ?14, updated_at = ?15
             WHERE id = ?16",
            params![
                template.title,
                template.description,
                template.due_time.map(format_time_col),
                join_tags(&template.tags),
                template.project,
                template.priority.as_i64(),
                template.unit.as_str(),
                i64::from(template.interval),
                template.weekdays.as_deref().map(format_weekday_list),
                template.day_of_month.map(i64::from),
                format_date(template.start_date),
                template.end_date.map(format_date),
                template.last_generated.map(format_date),
                template.enabled,
                Utc::now().to_rfc3339(),
                template.id,
            ],
        )?;
        Ok(())
    }

    /// Delete a template; returns whether a row was removed.
    ///
    /// Previously generated occurrences keep their dangling `template_id`
    /// and remain valid tasks.
    pub fn delete_template(&self, id: i64) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM templates WHERE id = ?1", params![id])?;
        Ok(n > 0)
    }

    /// Flip a template's enabled flag; returns whether the row exists.
    pub fn set_template_enabled(&self, id: i64, enabled: bool) -> Result<bool> {
        let n = self.conn.execute(
            "UPDATE templates SET enabled = ?1, updated_at = ?2 WHERE id = ?3",
            params![enabled, Utc::now().to_rfc3339(), id],
        )?;
        Ok(n > 0)
    }

    /// Advance the advisory last-generated marker.
    pub fn set_template_last_generated(&self, id: i64, date: NaiveDate) -> Result<()> {
        self.conn.execute(
            "UPDATE templates SET last_generated = ?1, updated_at = ?2 WHERE id = ?3",
            params![format_date(date), Utc::now().to_rfc3339(), id],
        )?;
        Ok(())
    }
}
