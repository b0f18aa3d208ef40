//! CLI command implementations.

pub mod config;
pub mod dashboard;
pub mod generate;
pub mod recur;
pub mod stats;
pub mod task;

use taskmill_core::{Calendar, Config, Priority, Task, TaskDb};

/// Open the database and calendar from the stored configuration.
pub(crate) fn context() -> Result<(TaskDb, Calendar, Config), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let calendar = Calendar::new(&config.timezone)?;
    let db = TaskDb::open()?;
    Ok((db, calendar, config))
}

/// Parse a user-facing priority name.
pub(crate) fn parse_priority(input: &str) -> Result<Priority, Box<dyn std::error::Error>> {
    Priority::parse(input).ok_or_else(|| {
        format!("unknown priority '{input}' (expected normal, high, or urgent)").into()
    })
}

/// One-line human rendering of a task.
pub(crate) fn task_line(task: &Task, calendar: &Calendar) -> String {
    let mut line = format!("#{} {}", task.id, task.title);
    if let Some(project) = &task.project {
        line.push_str(&format!(" ({project})"));
    }
    if let Some(due) = task.due_date {
        line.push_str(&format!(", due {}", calendar.format_date(due)));
        if let Some(time) = task.due_time {
            line.push_str(&format!(" at {}", calendar.format_time(time)));
        }
    }
    match task.priority {
        Priority::Urgent => line.push_str(" !urgent"),
        Priority::High => line.push_str(" !high"),
        Priority::Normal => {}
    }
    if !task.tags.is_empty() {
        line.push_str(&format!(" [{}]", task.tags.join(", ")));
    }
    line
}
