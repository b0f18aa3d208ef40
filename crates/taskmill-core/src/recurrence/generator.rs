//! Idempotent materialization of template occurrences over a forward
//! horizon.
//!
//! Generation never consults the advisory `last_generated` marker to decide
//! what to insert; the store's `(template_id, due_date)` unique index is the
//! only idempotency gate. A disabled-then-re-enabled template therefore
//! backfills any dates that are still inside the horizon.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::matches_on;
use crate::calendar::{date_range, Calendar};
use crate::error::Result;
use crate::storage::TaskDb;
use crate::task::Task;
use crate::template::Template;

/// Hard ceiling on the forward generation window, in days.
pub const MAX_HORIZON_DAYS: u32 = 365;

/// Horizon used when the caller does not specify one.
pub const DEFAULT_HORIZON_DAYS: u32 = 14;

/// Aggregate result of a generation pass.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerationReport {
    /// Enabled templates that completed a scan
    pub templates_processed: usize,
    /// Occurrences created across all of them
    pub tasks_created: usize,
}

/// Materialize missing occurrences for one template over
/// `[today, today + horizon_days - 1]`.
///
/// Unknown and disabled templates yield an empty list; neither is an error.
/// Returns the newly created occurrences.
pub fn generate_for_template(
    db: &TaskDb,
    calendar: &Calendar,
    template_id: i64,
    horizon_days: u32,
) -> Result<Vec<Task>> {
    let Some(template) = db.get_template(template_id)? else {
        return Ok(Vec::new());
    };
    if !template.enabled {
        return Ok(Vec::new());
    }
    generate(db, calendar.today(), &template, horizon_days)
}

/// Materialize missing occurrences for every enabled template.
///
/// A failure on one template is logged and does not stop the rest; the
/// report counts only templates that completed their scan.
pub fn generate_all(db: &TaskDb, calendar: &Calendar, horizon_days: u32) -> Result<GenerationReport> {
    let today = calendar.today();
    let mut report = GenerationReport::default();

    for template in db.list_templates()? {
        if !template.enabled {
            continue;
        }
        match generate(db, today, &template, horizon_days) {
            Ok(created) => {
                report.templates_processed += 1;
                report.tasks_created += created.len();
            }
            Err(e) => {
                warn!(template_id = template.id, error = %e, "generation failed for template");
            }
        }
    }

    info!(
        templates = report.templates_processed,
        tasks = report.tasks_created,
        "generation pass complete"
    );
    Ok(report)
}

/// Scan the horizon for one template against an explicit `today`.
fn generate(
    db: &TaskDb,
    today: NaiveDate,
    template: &Template,
    horizon_days: u32,
) -> Result<Vec<Task>> {
    let horizon = horizon_days.clamp(1, MAX_HORIZON_DAYS);
    let mut created = Vec::new();

    for date in date_range(today, horizon) {
        if !matches_on(date, template) {
            continue;
        }
        if let Some(task) = db.insert_occurrence_if_absent(template, date)? {
            created.push(task);
        }
    }

    if let Some(latest) = created.iter().filter_map(|t| t.due_date).max() {
        db.set_template_last_generated(template.id, latest)?;
    }

    debug!(
        template_id = template.id,
        created = created.len(),
        "scanned template horizon"
    );
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Placement;
    use crate::template::RecurUnit;
    use chrono::{Datelike, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn store_template(db: &TaskDb, mut template: Template) -> Template {
        template.id = db.create_template(&template).unwrap();
        template
    }

    #[test]
    fn daily_template_fills_the_whole_horizon() {
        let db = TaskDb::open_memory().unwrap();
        let today = date(2026, 3, 2);
        let template = store_template(&db, Template::new("journal", RecurUnit::Daily, today));

        let created = generate(&db, today, &template, 14).unwrap();
        assert_eq!(created.len(), 14);
        assert_eq!(created[0].due_date, Some(today));
        assert_eq!(created[13].due_date, Some(date(2026, 3, 15)));
        for task in &created {
            assert_eq!(task.placement, Placement::Dated);
            assert_eq!(task.template_id, Some(template.id));
        }
    }

    #[test]
    fn weekly_mon_wed_fri_creates_six_over_two_weeks() {
        let db = TaskDb::open_memory().unwrap();
        let monday = date(2026, 3, 2);
        let mut template = Template::new("standup", RecurUnit::Weekly, monday);
        template.weekdays = Some(vec![Weekday::Mon, Weekday::Wed, Weekday::Fri]);
        let template = store_template(&db, template);

        let created = generate(&db, monday, &template, 14).unwrap();
        assert_eq!(created.len(), 6);
        for task in &created {
            let weekday = task.due_date.unwrap().weekday();
            assert!(matches!(weekday, Weekday::Mon | Weekday::Wed | Weekday::Fri));
        }
    }

    #[test]
    fn monthly_day_31_yields_nothing_in_a_short_month() {
        let db = TaskDb::open_memory().unwrap();
        let mut template = Template::new("invoice", RecurUnit::Monthly, date(2026, 3, 31));
        template.day_of_month = Some(31);
        let template = store_template(&db, template);

        // April has 30 days; a window covering all of April creates nothing.
        let created = generate(&db, date(2026, 4, 1), &template, 30).unwrap();
        assert!(created.is_empty());
        assert!(db.get_template(template.id).unwrap().unwrap().last_generated.is_none());
    }

    #[test]
    fn second_run_creates_nothing() {
        let db = TaskDb::open_memory().unwrap();
        let today = date(2026, 3, 2);
        let template = store_template(&db, Template::new("journal", RecurUnit::Daily, today));

        let first = generate(&db, today, &template, 14).unwrap();
        assert_eq!(first.len(), 14);
        let second = generate(&db, today, &template, 14).unwrap();
        assert!(second.is_empty());
        assert_eq!(db.list_tasks().unwrap().len(), 14);
    }

    #[test]
    fn occurrences_stay_inside_template_bounds() {
        let db = TaskDb::open_memory().unwrap();
        let today = date(2026, 3, 2);
        let mut template = Template::new("course", RecurUnit::Daily, date(2026, 3, 5));
        template.end_date = Some(date(2026, 3, 8));
        let template = store_template(&db, template);

        let created = generate(&db, today, &template, 14).unwrap();
        let dates: Vec<_> = created.iter().filter_map(|t| t.due_date).collect();
        assert_eq!(
            dates,
            vec![date(2026, 3, 5), date(2026, 3, 6), date(2026, 3, 7), date(2026, 3, 8)]
        );
    }

    #[test]
    fn marker_tracks_latest_created_date() {
        let db = TaskDb::open_memory().unwrap();
        let today = date(2026, 3, 2);
        let template = store_template(&db, Template::new("journal", RecurUnit::Daily, today));

        generate(&db, today, &template, 3).unwrap();
        assert_eq!(
            db.get_template(template.id).unwrap().unwrap().last_generated,
            Some(date(2026, 3, 4))
        );
    }

    #[test]
    fn regenerate_after_reenable_backfills() {
        let db = TaskDb::open_memory().unwrap();
        let today = date(2026, 3, 2);
        let template = store_template(&db, Template::new("journal", RecurUnit::Daily, today));

        // First pass covers three days, then the template is disabled with
        // the marker pointing at the last one.
        generate(&db, today, &template, 3).unwrap();
        db.set_template_enabled(template.id, false).unwrap();
        db.set_template_enabled(template.id, true).unwrap();

        // A wider pass must backfill past the marker, not trust it.
        let template = db.get_template(template.id).unwrap().unwrap();
        let created = generate(&db, today, &template, 7).unwrap();
        assert_eq!(created.len(), 4);
        assert_eq!(db.list_tasks().unwrap().len(), 7);
    }

    #[test]
    fn disabled_and_unknown_templates_yield_nothing() {
        let db = TaskDb::open_memory().unwrap();
        let calendar = Calendar::new("UTC").unwrap();
        let template = store_template(
            &db,
            Template::new("journal", RecurUnit::Daily, calendar.today()),
        );
        db.set_template_enabled(template.id, false).unwrap();

        let created = generate_for_template(&db, &calendar, template.id, 14).unwrap();
        assert!(created.is_empty());
        let created = generate_for_template(&db, &calendar, 999, 14).unwrap();
        assert!(created.is_empty());
    }

    #[test]
    fn generate_all_aggregates_and_skips_disabled() {
        let db = TaskDb::open_memory().unwrap();
        let calendar = Calendar::new("UTC").unwrap();
        let today = calendar.today();

        store_template(&db, Template::new("journal", RecurUnit::Daily, today));
        let mut weekly = Template::new("review", RecurUnit::Weekly, today);
        weekly.weekdays = Some(vec![today.weekday()]);
        store_template(&db, weekly);
        let disabled = store_template(&db, Template::new("paused", RecurUnit::Daily, today));
        db.set_template_enabled(disabled.id, false).unwrap();

        let report = generate_all(&db, &calendar, 14).unwrap();
        assert_eq!(report.templates_processed, 2);
        assert_eq!(report.tasks_created, 14 + 2);

        // Idempotent across full passes as well.
        let report = generate_all(&db, &calendar, 14).unwrap();
        assert_eq!(report.templates_processed, 2);
        assert_eq!(report.tasks_created, 0);
    }
}
