use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::model::task::Task;

/// View-level completion filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Completed,
    Pending,
}

impl Filter {
    pub const ALL: [Filter; 3] = [Filter::All, Filter::Completed, Filter::Pending];

    pub fn as_str(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Completed => "completed",
            Filter::Pending => "pending",
        }
    }

    /// Display label for filter tabs
    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Completed => "Completed",
            Filter::Pending => "Pending",
        }
    }

    pub fn next(self) -> Filter {
        match self {
            Filter::All => Filter::Completed,
            Filter::Completed => Filter::Pending,
            Filter::Pending => Filter::All,
        }
    }

    pub fn matches(self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Completed => task.completed,
            Filter::Pending => !task.completed,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "completed" | "done" => Ok(Filter::Completed),
            "pending" | "todo" => Ok(Filter::Pending),
            other => Err(format!(
                "unknown filter '{}' (expected all, completed or pending)",
                other
            )),
        }
    }
}

/// Why a projection came out empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyState {
    /// Nothing passes the filter and there is no search term
    NoTasks,
    /// A non-empty search term matched nothing
    NoMatches,
}

impl EmptyState {
    pub fn message(self) -> &'static str {
        match self {
            EmptyState::NoTasks => "No tasks found. Add your first task!",
            EmptyState::NoMatches => "No tasks found. Try a different search.",
        }
    }
}

/// The visible slice of the task collection
#[derive(Debug, Clone, PartialEq)]
pub struct Projection<'a> {
    /// Surviving tasks in collection order
    pub tasks: Vec<&'a Task>,
    pub count: usize,
    /// Set only when `tasks` is empty
    pub empty: Option<EmptyState>,
}

/// Does the task's title or notes contain `needle` (already lowercased)?
fn matches_search(task: &Task, needle: &str) -> bool {
    needle.is_empty()
        || task.title.to_lowercase().contains(needle)
        || task.notes_or_empty().to_lowercase().contains(needle)
}

/// Select the tasks to display: filter AND case-insensitive substring search
/// over title and notes, keeping collection order.
pub fn project<'a>(tasks: &'a [Task], filter: Filter, search: &str) -> Projection<'a> {
    let needle = search.to_lowercase();
    let visible: Vec<&Task> = tasks
        .iter()
        .filter(|t| filter.matches(t) && matches_search(t, &needle))
        .collect();
    let count = visible.len();
    let empty = if count > 0 {
        None
    } else if search.is_empty() {
        Some(EmptyState::NoTasks)
    } else {
        Some(EmptyState::NoMatches)
    };
    Projection {
        tasks: visible,
        count,
        empty,
    }
}

/// "1 task" / "3 tasks"
pub fn count_label(count: usize) -> String {
    format!("{} {}", count, if count == 1 { "task" } else { "tasks" })
}

/// Human label for a due date relative to `now`, in `now`'s time zone
pub fn format_due_date<Tz: TimeZone>(due: &DateTime<Utc>, now: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    let local = due.with_timezone(&now.timezone());
    let today = now.date_naive();
    let day = local.date_naive();
    let time = local.format("%H:%M");
    if day == today {
        format!("Today at {}", time)
    } else if Some(day) == today.succ_opt() {
        format!("Tomorrow at {}", time)
    } else {
        local.format("%Y-%m-%d %H:%M").to_string()
    }
}

/// Pending task whose due date has passed
pub fn is_overdue(task: &Task, now: DateTime<Utc>) -> bool {
    !task.completed && task.due_date.is_some_and(|d| d < now)
}

/// Pending task due within the next day
pub fn is_due_soon(task: &Task, now: DateTime<Utc>) -> bool {
    !task.completed
        && task
            .due_date
            .is_some_and(|d| d >= now && d - now <= Duration::days(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::Priority;
    use pretty_assertions::assert_eq;

    fn task(id: &str, title: &str, notes: Option<&str>, completed: bool) -> Task {
        Task {
            id: id.into(),
            title: title.into(),
            notes: notes.map(str::to_string),
            due_date: None,
            priority: Priority::Medium,
            completed,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn ids(p: &Projection) -> Vec<String> {
        p.tasks.iter().map(|t| t.id.clone()).collect()
    }

    fn sample() -> Vec<Task> {
        vec![
            task("1", "Buy milk", None, false),
            task("2", "Walk dog", Some("at shop"), true),
            task("3", "Write report", Some("Q2 numbers"), true),
            task("4", "Call mom", None, false),
        ]
    }

    #[test]
    fn completed_filter_keeps_order() {
        let tasks = sample();
        let p = project(&tasks, Filter::Completed, "");
        assert_eq!(ids(&p), vec!["2", "3"]);
        assert_eq!(p.count, 2);
        assert_eq!(p.empty, None);
    }

    #[test]
    fn pending_filter() {
        let tasks = sample();
        assert_eq!(ids(&project(&tasks, Filter::Pending, "")), vec!["1", "4"]);
    }

    #[test]
    fn search_matches_title_or_notes_case_insensitively() {
        let tasks = vec![
            task("1", "Buy milk", None, false),
            task("2", "Walk dog", Some("at shop"), false),
        ];
        // "shop" is only in notes; "Buy" matches via title with "BUY"
        assert_eq!(ids(&project(&tasks, Filter::All, "shop")), vec!["2"]);
        assert_eq!(ids(&project(&tasks, Filter::All, "BUY")), vec!["1"]);
        assert_eq!(ids(&project(&tasks, Filter::All, "")), vec!["1", "2"]);
    }

    #[test]
    fn search_matches_substring_of_both_fields() {
        let tasks = vec![
            task("1", "Shopping list", None, false),
            task("2", "Walk dog", Some("at shop"), false),
        ];
        assert_eq!(ids(&project(&tasks, Filter::All, "shop")), vec!["1", "2"]);
    }

    #[test]
    fn filter_and_search_are_anded() {
        let tasks = sample();
        let p = project(&tasks, Filter::Pending, "report");
        assert_eq!(p.count, 0);
        assert_eq!(p.empty, Some(EmptyState::NoMatches));
    }

    #[test]
    fn empty_states() {
        let none: Vec<Task> = Vec::new();
        let p = project(&none, Filter::All, "");
        assert_eq!(p.count, 0);
        assert_eq!(p.empty, Some(EmptyState::NoTasks));

        let tasks = vec![task("1", "Open", None, false)];
        assert_eq!(
            project(&tasks, Filter::Completed, "").empty,
            Some(EmptyState::NoTasks)
        );
        assert_eq!(
            project(&tasks, Filter::All, "zzz").empty,
            Some(EmptyState::NoMatches)
        );
    }

    #[test]
    fn filter_parse() {
        assert_eq!("Completed".parse::<Filter>(), Ok(Filter::Completed));
        assert_eq!("pending".parse::<Filter>(), Ok(Filter::Pending));
        assert!("archived".parse::<Filter>().is_err());
        assert_eq!(Filter::Pending.next(), Filter::All);
    }

    #[test]
    fn count_labels() {
        assert_eq!(count_label(0), "0 tasks");
        assert_eq!(count_label(1), "1 task");
        assert_eq!(count_label(7), "7 tasks");
    }

    #[test]
    fn due_date_labels() {
        let now = Utc.with_ymd_and_hms(2025, 5, 14, 9, 0, 0).unwrap();
        let today = Utc.with_ymd_and_hms(2025, 5, 14, 17, 5, 0).unwrap();
        let tomorrow = Utc.with_ymd_and_hms(2025, 5, 15, 8, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 6, 2, 13, 45, 0).unwrap();
        assert_eq!(format_due_date(&today, &now), "Today at 17:05");
        assert_eq!(format_due_date(&tomorrow, &now), "Tomorrow at 08:00");
        assert_eq!(format_due_date(&later, &now), "2025-06-02 13:45");
    }

    #[test]
    fn overdue_only_for_pending() {
        let now = Utc.with_ymd_and_hms(2025, 5, 14, 9, 0, 0).unwrap();
        let mut t = task("1", "Late", None, false);
        t.due_date = Some(now - Duration::hours(1));
        assert!(is_overdue(&t, now));
        assert!(!is_due_soon(&t, now));
        t.completed = true;
        assert!(!is_overdue(&t, now));

        let mut soon = task("2", "Soon", None, false);
        soon.due_date = Some(now + Duration::hours(3));
        assert!(is_due_soon(&soon, now));
        assert!(!is_overdue(&soon, now));
    }
}
