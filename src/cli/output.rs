use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::model::task::{Priority, Task};
use crate::ops::view::{self, EmptyState, Filter, Projection};

/// Characters of the id shown in human output
pub const SHORT_ID_LEN: usize = 8;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(rename = "dueDate", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Priority,
    pub completed: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct TaskListJson {
    pub filter: Filter,
    pub search: String,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty: Option<EmptyState>,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct ThemeJson {
    pub effective: String,
    pub system: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explicit: Option<String>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(task: &Task) -> TaskJson {
    TaskJson {
        id: task.id.clone(),
        title: task.title.clone(),
        notes: task.notes.clone(),
        due_date: task.due_date,
        priority: task.priority,
        completed: task.completed,
        created_at: task.created_at,
    }
}

pub fn projection_to_json(projection: &Projection, filter: Filter, search: &str) -> TaskListJson {
    TaskListJson {
        filter,
        search: search.to_string(),
        count: projection.count,
        empty: projection.empty,
        tasks: projection.tasks.iter().map(|t| task_to_json(t)).collect(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((i, _)) => &id[..i],
        None => id,
    }
}

/// One-line summary: `[x] 1a2b3c4d Title  !high  due Today at 17:00`
pub fn format_task_line(task: &Task, now: &DateTime<Local>) -> String {
    let check = if task.completed { 'x' } else { ' ' };
    let mut line = format!("[{}] {} {}", check, short_id(&task.id), task.title);
    if task.priority != Priority::Medium {
        line.push_str(&format!("  !{}", task.priority));
    }
    if let Some(due) = &task.due_date {
        line.push_str(&format!("  due {}", view::format_due_date(due, now)));
        if view::is_overdue(task, now.with_timezone(&Utc)) {
            line.push_str(" (overdue)");
        }
    }
    line
}

/// Lines for `tl list`: one per task, then the count label; or the empty
/// message when nothing is visible.
pub fn format_list(projection: &Projection, now: &DateTime<Local>) -> Vec<String> {
    if let Some(empty) = projection.empty {
        return vec![empty.message().to_string()];
    }
    let mut lines: Vec<String> = projection
        .tasks
        .iter()
        .map(|t| format_task_line(t, now))
        .collect();
    lines.push(view::count_label(projection.count));
    lines
}

/// Detailed view for `tl show`
pub fn format_task_detail(task: &Task, now: &DateTime<Local>) -> Vec<String> {
    let mut lines = vec![
        task.title.clone(),
        format!("  id:        {}", task.id),
        format!(
            "  status:    {}",
            if task.completed { "completed" } else { "pending" }
        ),
        format!("  priority:  {}", task.priority),
    ];
    if let Some(due) = &task.due_date {
        lines.push(format!("  due:       {}", view::format_due_date(due, now)));
    }
    lines.push(format!(
        "  created:   {}",
        task.created_at
            .with_timezone(&now.timezone())
            .format("%Y-%m-%d %H:%M")
    ));
    if let Some(notes) = &task.notes {
        lines.push("  notes:".to_string());
        for line in notes.lines() {
            lines.push(format!("    {}", line));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(completed: bool) -> Task {
        Task {
            id: "0123456789abcdef".into(),
            title: "Buy milk".into(),
            notes: Some("2%\nskim if none".into()),
            due_date: None,
            priority: Priority::High,
            completed,
            created_at: Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn short_ids() {
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn task_line_marks_completion_and_priority() {
        let now = Local::now();
        assert_eq!(
            format_task_line(&sample(false), &now),
            "[ ] 01234567 Buy milk  !high"
        );
        assert!(format_task_line(&sample(true), &now).starts_with("[x] "));
    }

    #[test]
    fn detail_lists_notes_lines() {
        let lines = format_task_detail(&sample(false), &Local::now());
        assert_eq!(lines[0], "Buy milk");
        assert!(lines.contains(&"    skim if none".to_string()));
        assert!(lines.contains(&"  status:    pending".to_string()));
    }

    #[test]
    fn json_uses_stored_field_names() {
        let json = serde_json::to_value(task_to_json(&sample(true))).unwrap();
        assert_eq!(json["createdAt"], "2025-05-01T00:00:00Z");
        assert_eq!(json["completed"], true);
        assert!(json.get("dueDate").is_none());
    }
}
