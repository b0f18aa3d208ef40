//! Dashboard buckets: the mutually exclusive partition of the live task
//! set, plus aggregate counts.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::task::{Placement, Task};

/// The partition of active tasks. Every active task lands in exactly one
/// bucket; completed tasks are excluded entirely.
#[derive(Debug, Default, Serialize)]
pub struct Buckets {
    /// Due strictly before today
    pub overdue: Vec<Task>,
    /// Due today
    pub today: Vec<Task>,
    /// Dated beyond today, keyed by due date (for calendar/week views)
    pub upcoming: BTreeMap<NaiveDate, Vec<Task>>,
    /// Undated, placed soon
    pub soon: Vec<Task>,
    /// Undated, parked someday
    pub someday: Vec<Task>,
    /// Undated, untriaged
    pub inbox: Vec<Task>,
}

impl Buckets {
    /// Total number of tasks across all buckets.
    pub fn len(&self) -> usize {
        self.overdue.len()
            + self.today.len()
            + self.upcoming.values().map(Vec::len).sum::<usize>()
            + self.soon.len()
            + self.someday.len()
            + self.inbox.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Aggregate task counts.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub overdue: usize,
    pub due_today: usize,
    pub upcoming: usize,
    pub soon: usize,
    pub someday: usize,
    pub inbox: usize,
}

/// Partition `tasks` into display buckets against `today`.
pub fn classify(tasks: Vec<Task>, today: NaiveDate) -> Buckets {
    let mut buckets = Buckets::default();

    for task in tasks.into_iter().filter(Task::is_active) {
        match (task.placement, task.due_date) {
            (Placement::Dated, Some(due)) if due < today => buckets.overdue.push(task),
            (Placement::Dated, Some(due)) if due == today => buckets.today.push(task),
            (Placement::Dated, Some(due)) => buckets.upcoming.entry(due).or_default().push(task),
            (Placement::Soon, _) => buckets.soon.push(task),
            (Placement::Someday, _) => buckets.someday.push(task),
            _ => buckets.inbox.push(task),
        }
    }

    sort_dated(&mut buckets.overdue);
    sort_dated(&mut buckets.today);
    for group in buckets.upcoming.values_mut() {
        sort_dated(group);
    }
    sort_undated(&mut buckets.soon);
    sort_undated(&mut buckets.someday);
    sort_inbox(&mut buckets.inbox);

    buckets
}

/// Completed tasks, most recently finished first.
pub fn completed(tasks: Vec<Task>) -> Vec<Task> {
    let mut done: Vec<Task> = tasks.into_iter().filter(|t| !t.is_active()).collect();
    done.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    done
}

/// Aggregate counts over a snapshot.
pub fn stats(tasks: &[Task], today: NaiveDate) -> TaskStats {
    let mut stats = TaskStats {
        total: tasks.len(),
        ..TaskStats::default()
    };

    for task in tasks {
        if !task.is_active() {
            stats.completed += 1;
            continue;
        }
        stats.active += 1;
        match (task.placement, task.due_date) {
            (Placement::Dated, Some(due)) if due < today => stats.overdue += 1,
            (Placement::Dated, Some(due)) if due == today => stats.due_today += 1,
            (Placement::Dated, Some(_)) => stats.upcoming += 1,
            (Placement::Soon, _) => stats.soon += 1,
            (Placement::Someday, _) => stats.someday += 1,
            _ => stats.inbox += 1,
        }
    }
    stats
}

/// Date, then time of day with all-day entries first, then priority, then
/// age.
fn sort_dated(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| {
        a.due_date
            .cmp(&b.due_date)
            .then(a.due_time.cmp(&b.due_time))
            .then(b.priority.cmp(&a.priority))
            .then(a.created_at.cmp(&b.created_at))
    });
}

/// Priority, then oldest first.
fn sort_undated(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then(a.created_at.cmp(&b.created_at))
    });
}

/// Priority, then newest first: the inbox surfaces what just arrived.
fn sort_inbox(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then(b.created_at.cmp(&a.created_at))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Priority;
    use chrono::{Duration, NaiveTime, TimeZone, Utc};
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2026, 2, 15)
    }

    fn dated(id: i64, due: NaiveDate) -> Task {
        let mut task = Task::new(format!("task {id}"));
        task.id = id;
        task.set_due(due, None);
        task
    }

    fn placed(id: i64, placement: Placement) -> Task {
        let mut task = Task::new(format!("task {id}"));
        task.id = id;
        match placement {
            Placement::Soon => task.move_to_soon(),
            Placement::Someday => task.move_to_someday(),
            _ => {}
        }
        task
    }

    #[test]
    fn partitions_by_date_and_placement() {
        let tasks = vec![
            dated(1, date(2020, 1, 1)),
            dated(2, today()),
            dated(3, date(2026, 2, 20)),
            placed(4, Placement::Soon),
            placed(5, Placement::Someday),
            placed(6, Placement::Inbox),
        ];
        let buckets = classify(tasks, today());

        assert_eq!(buckets.overdue.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1]);
        assert_eq!(buckets.today.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2]);
        assert_eq!(buckets.upcoming[&date(2026, 2, 20)][0].id, 3);
        assert_eq!(buckets.soon[0].id, 4);
        assert_eq!(buckets.someday[0].id, 5);
        assert_eq!(buckets.inbox[0].id, 6);
        assert_eq!(buckets.len(), 6);
    }

    #[test]
    fn ancient_overdue_task_is_overdue() {
        let task = dated(1, date(2020, 1, 1));
        let buckets = classify(vec![task], today());
        assert_eq!(buckets.overdue.len(), 1);
        assert!(buckets.today.is_empty());
    }

    #[test]
    fn completed_tasks_are_excluded_from_buckets() {
        let mut task = dated(1, today());
        task.complete();
        let buckets = classify(vec![task.clone()], today());
        assert!(buckets.is_empty());
        assert_eq!(completed(vec![task]).len(), 1);
    }

    #[test]
    fn dated_sort_puts_all_day_first_then_time_then_priority() {
        let mut early = dated(1, today());
        early.due_time = NaiveTime::from_hms_opt(9, 0, 0);
        let mut late = dated(2, today());
        late.due_time = NaiveTime::from_hms_opt(17, 0, 0);
        let all_day_urgent = {
            let mut t = dated(3, today());
            t.priority = Priority::Urgent;
            t
        };
        let all_day = dated(4, today());

        let buckets = classify(vec![late, all_day, early, all_day_urgent], today());
        let ids: Vec<_> = buckets.today.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 4, 1, 2]);
    }

    #[test]
    fn undated_sorts_differ_between_inbox_and_soon() {
        let base = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let make = |id: i64, placement: Placement, offset: i64| {
            let mut t = placed(id, placement);
            t.created_at = base + Duration::hours(offset);
            t
        };

        let buckets = classify(
            vec![
                make(1, Placement::Soon, 0),
                make(2, Placement::Soon, 1),
                make(3, Placement::Inbox, 0),
                make(4, Placement::Inbox, 1),
            ],
            today(),
        );
        // Soon: oldest first. Inbox: newest first.
        assert_eq!(buckets.soon.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(buckets.inbox.iter().map(|t| t.id).collect::<Vec<_>>(), vec![4, 3]);
    }

    #[test]
    fn stats_counts_match_buckets() {
        let mut done = dated(7, today());
        done.complete();
        let tasks = vec![
            dated(1, date(2020, 1, 1)),
            dated(2, today()),
            dated(3, date(2026, 2, 20)),
            placed(4, Placement::Soon),
            placed(5, Placement::Someday),
            placed(6, Placement::Inbox),
            done,
        ];

        let s = stats(&tasks, today());
        assert_eq!(s.total, 7);
        assert_eq!(s.active, 6);
        assert_eq!(s.completed, 1);
        assert_eq!(s.overdue, 1);
        assert_eq!(s.due_today, 1);
        assert_eq!(s.upcoming, 1);
        assert_eq!(s.soon, 1);
        assert_eq!(s.someday, 1);
        assert_eq!(s.inbox, 1);
    }

    prop_compose! {
        fn arb_task()(
            id in 1i64..10_000,
            kind in 0u8..4,
            day_offset in -30i64..30,
            priority in 0i64..3,
            done in proptest::bool::ANY,
        ) -> Task {
            let mut task = Task::new(format!("task {id}"));
            task.id = id;
            task.priority = Priority::from_i64(priority);
            match kind {
                0 => task.set_due(today() + Duration::days(day_offset), None),
                1 => task.move_to_soon(),
                2 => task.move_to_someday(),
                _ => {}
            }
            if done {
                task.complete();
            }
            task
        }
    }

    proptest! {
        /// The partition is total and disjoint: every active task appears in
        /// exactly one bucket.
        #[test]
        fn partition_is_total_and_disjoint(tasks in proptest::collection::vec(arb_task(), 0..40)) {
            let active: Vec<i64> = tasks.iter().filter(|t| t.is_active()).map(|t| t.id).collect();
            let buckets = classify(tasks, today());

            let mut seen: Vec<i64> = buckets.overdue.iter()
                .chain(buckets.today.iter())
                .chain(buckets.upcoming.values().flatten())
                .chain(buckets.soon.iter())
                .chain(buckets.someday.iter())
                .chain(buckets.inbox.iter())
                .map(|t| t.id)
                .collect();

            prop_assert_eq!(seen.len(), active.len());
            let mut expected = active;
            expected.sort_unstable();
            seen.sort_unstable();
            prop_assert_eq!(seen, expected);
        }
    }
}
