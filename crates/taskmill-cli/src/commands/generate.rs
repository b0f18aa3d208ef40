//! Occurrence generation command.

use taskmill_core::generate_all;

pub fn run(days: Option<u32>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (db, calendar, config) = super::context()?;
    let days = days.unwrap_or(config.default_horizon_days);

    let report = generate_all(&db, &calendar, days)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Processed {} templates, created {} tasks",
            report.templates_processed, report.tasks_created
        );
    }
    Ok(())
}
