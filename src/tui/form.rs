use chrono::{DateTime, Local, TimeZone, Utc};

use crate::model::task::{Priority, Task, TaskDraft};
use crate::ops::codec::parse_due_date_in;
use crate::util::unicode;

/// Single-line text buffer with a byte-offset cursor on grapheme boundaries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    pub text: String,
    pub cursor: usize,
}

impl TextInput {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.len();
        TextInput { text, cursor }
    }

    pub fn insert(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if let Some(start) = unicode::prev_grapheme_boundary(&self.text, self.cursor) {
            self.text.replace_range(start..self.cursor, "");
            self.cursor = start;
        }
    }

    pub fn delete(&mut self) {
        if let Some(end) = unicode::next_grapheme_boundary(&self.text, self.cursor) {
            self.text.replace_range(self.cursor..end, "");
        }
    }

    /// Ctrl-W: delete the word left of the cursor
    pub fn delete_word(&mut self) {
        let start = unicode::word_boundary_left(&self.text, self.cursor);
        self.text.replace_range(start..self.cursor, "");
        self.cursor = start;
    }

    pub fn left(&mut self) {
        if let Some(i) = unicode::prev_grapheme_boundary(&self.text, self.cursor) {
            self.cursor = i;
        }
    }

    pub fn right(&mut self) {
        if let Some(i) = unicode::next_grapheme_boundary(&self.text, self.cursor) {
            self.cursor = i;
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.len();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Cursor position in terminal cells
    pub fn cursor_col(&self) -> usize {
        unicode::byte_offset_to_display_col(&self.text, self.cursor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Due,
    Priority,
    Notes,
}

impl FormField {
    pub const ALL: [FormField; 4] = [
        FormField::Title,
        FormField::Due,
        FormField::Priority,
        FormField::Notes,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Due => "Due",
            FormField::Priority => "Priority",
            FormField::Notes => "Notes",
        }
    }

    pub fn next(self) -> FormField {
        match self {
            FormField::Title => FormField::Due,
            FormField::Due => FormField::Priority,
            FormField::Priority => FormField::Notes,
            FormField::Notes => FormField::Title,
        }
    }

    pub fn prev(self) -> FormField {
        match self {
            FormField::Title => FormField::Notes,
            FormField::Due => FormField::Title,
            FormField::Priority => FormField::Due,
            FormField::Notes => FormField::Priority,
        }
    }
}

/// Add / edit form state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    /// Id of the task being edited; `None` when adding
    pub editing: Option<String>,
    pub title: TextInput,
    pub due: TextInput,
    pub priority: Priority,
    pub notes: TextInput,
    pub focus: FormField,
    /// Inline error shown under the fields
    pub error: Option<String>,
}

impl TaskForm {
    pub fn add() -> Self {
        TaskForm {
            editing: None,
            title: TextInput::default(),
            due: TextInput::default(),
            priority: Priority::default(),
            notes: TextInput::default(),
            focus: FormField::Title,
            error: None,
        }
    }

    pub fn edit(task: &Task) -> Self {
        Self::edit_in(task, &Local)
    }

    /// Edit form with the due date rendered in `tz`
    pub fn edit_in<Tz: TimeZone>(task: &Task, tz: &Tz) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        TaskForm {
            editing: Some(task.id.clone()),
            title: TextInput::new(task.title.clone()),
            due: TextInput::new(
                task.due_date
                    .map(|d| format_due_input(&d, tz))
                    .unwrap_or_default(),
            ),
            priority: task.priority,
            notes: TextInput::new(task.notes_or_empty()),
            focus: FormField::Title,
            error: None,
        }
    }

    pub fn heading(&self) -> &'static str {
        if self.editing.is_some() {
            "Edit task"
        } else {
            "Add task"
        }
    }

    /// The focused text buffer (`None` on the priority selector)
    pub fn focused_input(&mut self) -> Option<&mut TextInput> {
        match self.focus {
            FormField::Title => Some(&mut self.title),
            FormField::Due => Some(&mut self.due),
            FormField::Notes => Some(&mut self.notes),
            FormField::Priority => None,
        }
    }

    pub fn to_draft(&self) -> Result<TaskDraft, String> {
        self.to_draft_in(&Local)
    }

    /// Build a draft, reading a naive due date in `tz`. A non-blank due date
    /// that cannot be parsed is an error.
    pub fn to_draft_in<Tz: TimeZone>(&self, tz: &Tz) -> Result<TaskDraft, String> {
        let due_date = if self.due.text.trim().is_empty() {
            None
        } else {
            Some(parse_due_date_in(&self.due.text, tz).ok_or("Invalid due date")?)
        };
        Ok(TaskDraft {
            title: self.title.text.clone(),
            due_date,
            priority: self.priority,
            notes: Some(self.notes.text.clone()),
        })
    }
}

fn format_due_input<Tz: TimeZone>(due: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    due.with_timezone(tz).format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn text_input_editing() {
        let mut input = TextInput::new("buy milk");
        input.delete_word();
        assert_eq!(input.text, "buy ");
        input.insert('o');
        input.insert('a');
        input.insert('t');
        input.left();
        input.backspace();
        assert_eq!(input.text, "buy ot");
        assert_eq!(input.cursor, 5);
        input.home();
        input.delete();
        assert_eq!(input.text, "uy ot");
        input.end();
        assert_eq!(input.cursor_col(), 5);
    }

    #[test]
    fn text_input_steps_over_graphemes() {
        let mut input = TextInput::new("cafe\u{0301}");
        input.backspace();
        assert_eq!(input.text, "caf");
    }

    #[test]
    fn focus_cycles() {
        let mut field = FormField::Title;
        for _ in 0..FormField::ALL.len() {
            field = field.next();
        }
        assert_eq!(field, FormField::Title);
        assert_eq!(FormField::Title.prev(), FormField::Notes);
    }

    #[test]
    fn draft_from_form() {
        let mut form = TaskForm::add();
        form.title = TextInput::new("Pay rent");
        form.due = TextInput::new("2025-06-01 09:30");
        form.priority = Priority::High;
        let draft = form.to_draft_in(&Utc).unwrap();
        assert_eq!(draft.title, "Pay rent");
        assert_eq!(
            draft.due_date,
            Some(Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap())
        );
        assert_eq!(draft.priority, Priority::High);
    }

    #[test]
    fn bad_due_date_is_rejected() {
        let mut form = TaskForm::add();
        form.title = TextInput::new("Pay rent");
        form.due = TextInput::new("next tuesday");
        assert_eq!(form.to_draft_in(&Utc), Err("Invalid due date".to_string()));
    }

    #[test]
    fn edit_form_prefills() {
        let task = Task {
            id: "abc".into(),
            title: "Call mom".into(),
            notes: None,
            due_date: Some(Utc.with_ymd_and_hms(2025, 5, 14, 17, 0, 0).unwrap()),
            priority: Priority::Low,
            completed: true,
            created_at: Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap(),
        };
        let form = TaskForm::edit_in(&task, &Utc);
        assert_eq!(form.heading(), "Edit task");
        assert_eq!(form.due.text, "2025-05-14 17:00");
        assert_eq!(form.notes.text, "");
        assert_eq!(form.editing.as_deref(), Some("abc"));
    }
}
