//! Task management commands for CLI.

use clap::Subcommand;
use taskmill_core::{normalize_tags, Task};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Add {
        /// Task title
        title: String,
        /// Task description
        #[arg(long)]
        description: Option<String>,
        /// Due date (e.g. "today", "fri", "+3d", "2026-03-01")
        #[arg(long)]
        due: Option<String>,
        /// Due time (e.g. "9:30", "2pm"); requires --due
        #[arg(long)]
        time: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
        /// Project label
        #[arg(long)]
        project: Option<String>,
        /// Priority: normal, high, or urgent
        #[arg(long)]
        priority: Option<String>,
        /// Park in the soon bucket instead of the inbox
        #[arg(long, conflicts_with_all = ["due", "someday"])]
        soon: bool,
        /// Park in the someday bucket instead of the inbox
        #[arg(long, conflicts_with = "due")]
        someday: bool,
        /// Print the task as JSON
        #[arg(long)]
        json: bool,
    },
    /// List tasks
    List {
        /// Filter by project label
        #[arg(long)]
        project: Option<String>,
        /// Filter by tag
        #[arg(long)]
        tag: Option<String>,
        /// Show completed tasks instead of active ones
        #[arg(long)]
        completed: bool,
        /// Print tasks as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show task details
    Show {
        /// Task ID
        id: i64,
        #[arg(long)]
        json: bool,
    },
    /// Mark a task completed
    Done {
        /// Task ID
        id: i64,
    },
    /// Reopen a completed task
    Reopen {
        /// Task ID
        id: i64,
    },
    /// Record that a reminder went out for a task
    Remind {
        /// Task ID
        id: i64,
    },
    /// Update a task
    Update {
        /// Task ID
        id: i64,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New due date
        #[arg(long)]
        due: Option<String>,
        /// New due time; requires a due date
        #[arg(long)]
        time: Option<String>,
        /// Drop the due date (moves the task back to the inbox)
        #[arg(long, conflicts_with_all = ["due", "time"])]
        clear_due: bool,
        /// Replace tags (comma-separated)
        #[arg(long)]
        tags: Option<String>,
        /// New project label
        #[arg(long)]
        project: Option<String>,
        /// New priority
        #[arg(long)]
        priority: Option<String>,
    },
    /// Move a task between the undated buckets
    Move {
        /// Task ID
        id: i64,
        /// Target bucket: soon, someday, or inbox
        bucket: String,
    },
    /// Delete a task; `skip` does the same for a generated occurrence
    #[command(alias = "skip")]
    Delete {
        /// Task ID
        id: i64,
    },
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let (db, calendar, _config) = super::context()?;

    match action {
        TaskAction::Add {
            title,
            description,
            due,
            time,
            tags,
            project,
            priority,
            soon,
            someday,
            json,
        } => {
            let mut task = Task::new(title);
            task.description = description;
            task.project = project;
            if let Some(t) = tags {
                task.tags = normalize_tags(&t);
            }
            if let Some(p) = priority {
                task.priority = super::parse_priority(&p)?;
            }
            if let Some(d) = due {
                let date = calendar.parse_date(&d)?;
                let time = time.map(|t| calendar.parse_time(&t)).transpose()?;
                task.set_due(date, time);
            } else if time.is_some() {
                return Err("--time requires --due".into());
            } else if soon {
                task.move_to_soon();
            } else if someday {
                task.move_to_someday();
            }

            task.id = db.create_task(&task)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&task)?);
            } else {
                println!("Created {}", super::task_line(&task, &calendar));
            }
        }
        TaskAction::List {
            project,
            tag,
            completed,
            json,
        } => {
            let tasks: Vec<Task> = db
                .list_tasks()?
                .into_iter()
                .filter(|task| task.is_active() != completed)
                .filter(|task| {
                    project.as_deref().map_or(true, |p| task.project.as_deref() == Some(p))
                })
                .filter(|task| {
                    tag.as_deref().map_or(true, |t| task.tags.iter().any(|x| x == t))
                })
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else if tasks.is_empty() {
                println!("No tasks.");
            } else {
                for task in &tasks {
                    println!("{}", super::task_line(task, &calendar));
                }
            }
        }
        TaskAction::Show { id, json } => match db.get_task(id)? {
            Some(task) => {
                if json {
                    println!("{}", serde_json::to_string_pretty(&task)?);
                } else {
                    println!("{}", super::task_line(&task, &calendar));
                    if let Some(desc) = &task.description {
                        println!("  {desc}");
                    }
                    if let Some(done) = task.completed_at {
                        println!("  completed {done}");
                    }
                }
            }
            None => println!("Task not found: {id}"),
        },
        TaskAction::Done { id } => {
            let mut task = db.get_task(id)?.ok_or(format!("Task not found: {id}"))?;
            task.complete();
            db.update_task(&task)?;
            println!("Completed #{id} {}", task.title);
        }
        TaskAction::Reopen { id } => {
            let mut task = db.get_task(id)?.ok_or(format!("Task not found: {id}"))?;
            task.reopen();
            db.update_task(&task)?;
            println!("Reopened #{id} {}", task.title);
        }
        TaskAction::Remind { id } => {
            let mut task = db.get_task(id)?.ok_or(format!("Task not found: {id}"))?;
            task.mark_reminded();
            db.update_task(&task)?;
            println!("Reminded #{id} {}", task.title);
        }
        TaskAction::Update {
            id,
            title,
            description,
            due,
            time,
            clear_due,
            tags,
            project,
            priority,
        } => {
            let mut task = db.get_task(id)?.ok_or(format!("Task not found: {id}"))?;

            if let Some(t) = title {
                task.title = t;
            }
            if let Some(d) = description {
                task.description = Some(d);
            }
            if let Some(t) = tags {
                task.tags = normalize_tags(&t);
            }
            if let Some(p) = project {
                task.project = Some(p);
            }
            if let Some(p) = priority {
                task.priority = super::parse_priority(&p)?;
            }
            if clear_due {
                task.clear_due();
            }
            if let Some(d) = due {
                let date = calendar.parse_date(&d)?;
                let time = match time {
                    Some(t) => Some(calendar.parse_time(&t)?),
                    None => task.due_time,
                };
                task.set_due(date, time);
            } else if let Some(t) = time {
                if task.due_date.is_none() {
                    return Err("--time requires a due date".into());
                }
                task.due_time = Some(calendar.parse_time(&t)?);
            }

            db.update_task(&task)?;
            println!("Updated {}", super::task_line(&task, &calendar));
        }
        TaskAction::Move { id, bucket } => {
            let mut task = db.get_task(id)?.ok_or(format!("Task not found: {id}"))?;
            match bucket.as_str() {
                "soon" => task.move_to_soon(),
                "someday" => task.move_to_someday(),
                "inbox" => task.move_to_inbox(),
                other => {
                    return Err(
                        format!("unknown bucket '{other}' (expected soon, someday, or inbox)")
                            .into(),
                    )
                }
            }
            db.update_task(&task)?;
            println!("Moved #{id} to {bucket}");
        }
        TaskAction::Delete { id } => {
            if db.delete_task(id)? {
                println!("Deleted task {id}");
            } else {
                println!("Task not found: {id}");
            }
        }
    }
    Ok(())
}
