//! Dashboard view: the bucket partition of active tasks.

use taskmill_core::{classify, Calendar, Task};

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (db, calendar, _config) = super::context()?;
    let buckets = classify(db.list_tasks()?, calendar.today());

    if json {
        println!("{}", serde_json::to_string_pretty(&buckets)?);
        return Ok(());
    }

    if buckets.is_empty() {
        println!("No active tasks.");
        return Ok(());
    }

    section("Overdue", &buckets.overdue, &calendar);
    section("Today", &buckets.today, &calendar);
    if !buckets.upcoming.is_empty() {
        println!("Upcoming:");
        for (date, tasks) in &buckets.upcoming {
            println!("  {}:", calendar.format_date(*date));
            for task in tasks {
                println!("    {}", super::task_line(task, &calendar));
            }
        }
    }
    section("Soon", &buckets.soon, &calendar);
    section("Someday", &buckets.someday, &calendar);
    section("Inbox", &buckets.inbox, &calendar);

    Ok(())
}

fn section(title: &str, tasks: &[Task], calendar: &Calendar) {
    if tasks.is_empty() {
        return;
    }
    println!("{title}:");
    for task in tasks {
        println!("  {}", super::task_line(task, calendar));
    }
}
