//! Aggregate task counts.

use taskmill_core::stats;

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (db, calendar, _config) = super::context()?;
    let stats = stats(&db.list_tasks()?, calendar.today());

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!(
            "Total: {} (active {}, completed {})",
            stats.total, stats.active, stats.completed
        );
        println!(
            "Overdue: {}  Today: {}  Upcoming: {}",
            stats.overdue, stats.due_today, stats.upcoming
        );
        println!(
            "Soon: {}  Someday: {}  Inbox: {}",
            stats.soon, stats.someday, stats.inbox
        );
    }
    Ok(())
}
