//! Recurring template commands for CLI.

use clap::Subcommand;
use taskmill_core::template::{format_weekday_list, parse_weekday_list};
use taskmill_core::{normalize_tags, parse_recurrence, RecurUnit, Template};

#[derive(Subcommand)]
pub enum RecurAction {
    /// Create a recurring template
    Add {
        /// Template title, stamped onto every generated task
        title: String,
        /// Repetition rule (e.g. "day", "2 weeks", "month", "year")
        #[arg(long)]
        every: String,
        /// First date the rule applies (defaults to today)
        #[arg(long)]
        start: Option<String>,
        /// Last date the rule applies
        #[arg(long)]
        end: Option<String>,
        /// Weekly only: allowed weekdays (e.g. "mon,wed,fri")
        #[arg(long)]
        days: Option<String>,
        /// Monthly only: target day of month (defaults to the start date's)
        #[arg(long)]
        day_of_month: Option<u32>,
        /// Due time stamped onto generated tasks
        #[arg(long)]
        time: Option<String>,
        /// Description stamped onto generated tasks
        #[arg(long)]
        description: Option<String>,
        /// Comma-separated tags stamped onto generated tasks
        #[arg(long)]
        tags: Option<String>,
        /// Project label stamped onto generated tasks
        #[arg(long)]
        project: Option<String>,
        /// Priority stamped onto generated tasks
        #[arg(long)]
        priority: Option<String>,
        /// Print the template as JSON
        #[arg(long)]
        json: bool,
    },
    /// List templates
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show template details
    Show {
        /// Template ID
        id: i64,
        #[arg(long)]
        json: bool,
    },
    /// Update a template
    Update {
        /// Template ID
        id: i64,
        #[arg(long)]
        title: Option<String>,
        /// New repetition rule
        #[arg(long)]
        every: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        days: Option<String>,
        #[arg(long)]
        day_of_month: Option<u32>,
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        tags: Option<String>,
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        priority: Option<String>,
    },
    /// Resume generation for a template
    Enable {
        /// Template ID
        id: i64,
    },
    /// Suspend generation for a template
    Disable {
        /// Template ID
        id: i64,
    },
    /// Delete a template; tasks it generated are kept
    Delete {
        /// Template ID
        id: i64,
    },
}

fn describe(template: &Template) -> String {
    let mut rule = if template.interval == 1 {
        template.unit.as_str().to_string()
    } else {
        format!("every {} {}", template.interval, match template.unit {
            RecurUnit::Daily => "days",
            RecurUnit::Weekly => "weeks",
            RecurUnit::Monthly => "months",
            RecurUnit::Yearly => "years",
        })
    };
    if let Some(days) = &template.weekdays {
        rule.push_str(&format!(" on {}", format_weekday_list(days)));
    }
    if let Some(day) = template.day_of_month {
        rule.push_str(&format!(" on day {day}"));
    }
    let state = if template.enabled { "" } else { " [disabled]" };
    format!("#{} {} ({rule}, from {}){state}", template.id, template.title, template.start_date)
}

pub fn run(action: RecurAction) -> Result<(), Box<dyn std::error::Error>> {
    let (db, calendar, _config) = super::context()?;

    match action {
        RecurAction::Add {
            title,
            every,
            start,
            end,
            days,
            day_of_month,
            time,
            description,
            tags,
            project,
            priority,
            json,
        } => {
            let (unit, interval) = parse_recurrence(&every)?;
            let start_date = match start {
                Some(s) => calendar.parse_date(&s)?,
                None => calendar.today(),
            };

            let mut template = Template::new(title, unit, start_date);
            template.interval = interval;
            template.description = description;
            template.project = project;
            if let Some(t) = tags {
                template.tags = normalize_tags(&t);
            }
            if let Some(p) = priority {
                template.priority = super::parse_priority(&p)?;
            }
            if let Some(t) = time {
                template.due_time = Some(calendar.parse_time(&t)?);
            }
            if let Some(e) = end {
                template.end_date = Some(calendar.parse_date(&e)?);
            }
            if let Some(d) = days {
                if unit != RecurUnit::Weekly {
                    return Err("--days only applies to weekly rules".into());
                }
                template.weekdays = Some(parse_weekday_list(&d)?);
            }
            if day_of_month.is_some() {
                if unit != RecurUnit::Monthly {
                    return Err("--day-of-month only applies to monthly rules".into());
                }
                template.day_of_month = day_of_month;
            }

            template.id = db.create_template(&template)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&template)?);
            } else {
                println!("Created {}", describe(&template));
            }
        }
        RecurAction::List { json } => {
            let templates = db.list_templates()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&templates)?);
            } else if templates.is_empty() {
                println!("No templates.");
            } else {
                for template in &templates {
                    println!("{}", describe(template));
                }
            }
        }
        RecurAction::Show { id, json } => match db.get_template(id)? {
            Some(template) => {
                if json {
                    println!("{}", serde_json::to_string_pretty(&template)?);
                } else {
                    println!("{}", describe(&template));
                    if let Some(last) = template.last_generated {
                        println!("  last generated {last}");
                    }
                }
            }
            None => println!("Template not found: {id}"),
        },
        RecurAction::Update {
            id,
            title,
            every,
            start,
            end,
            days,
            day_of_month,
            time,
            description,
            tags,
            project,
            priority,
        } => {
            let mut template = db
                .get_template(id)?
                .ok_or(format!("Template not found: {id}"))?;

            if let Some(t) = title {
                template.title = t;
            }
            if let Some(e) = every {
                let (unit, interval) = parse_recurrence(&e)?;
                template.unit = unit;
                template.interval = interval;
                if unit != RecurUnit::Weekly {
                    template.weekdays = None;
                }
                if unit != RecurUnit::Monthly {
                    template.day_of_month = None;
                }
            }
            if let Some(s) = start {
                template.start_date = calendar.parse_date(&s)?;
            }
            if let Some(e) = end {
                template.end_date = Some(calendar.parse_date(&e)?);
            }
            if let Some(d) = days {
                if template.unit != RecurUnit::Weekly {
                    return Err("--days only applies to weekly rules".into());
                }
                template.weekdays = Some(parse_weekday_list(&d)?);
            }
            if day_of_month.is_some() {
                if template.unit != RecurUnit::Monthly {
                    return Err("--day-of-month only applies to monthly rules".into());
                }
                template.day_of_month = day_of_month;
            }
            if let Some(t) = time {
                template.due_time = Some(calendar.parse_time(&t)?);
            }
            if let Some(d) = description {
                template.description = Some(d);
            }
            if let Some(t) = tags {
                template.tags = normalize_tags(&t);
            }
            if let Some(p) = project {
                template.project = Some(p);
            }
            if let Some(p) = priority {
                template.priority = super::parse_priority(&p)?;
            }

            db.update_template(&template)?;
            println!("Updated {}", describe(&template));
        }
        RecurAction::Enable { id } => {
            if db.set_template_enabled(id, true)? {
                println!("Enabled template {id}");
            } else {
                println!("Template not found: {id}");
            }
        }
        RecurAction::Disable { id } => {
            if db.set_template_enabled(id, false)? {
                println!("Disabled template {id}");
            } else {
                println!("Template not found: {id}");
            }
        }
        RecurAction::Delete { id } => {
            if db.delete_template(id)? {
                println!("Deleted template {id}");
            } else {
                println!("Template not found: {id}");
            }
        }
    }
    Ok(())
}
