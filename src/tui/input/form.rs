use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::{App, Mode};
use crate::tui::form::{FormField, TaskForm};

pub(super) fn handle_form(app: &mut App, key: KeyEvent) {
    let Some(form) = app.form.as_mut() else {
        app.mode = Mode::Navigate;
        return;
    };

    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) => close(app),
        (_, KeyCode::Enter) => submit(app),

        (_, KeyCode::Tab) => form.focus = form.focus.next(),
        (_, KeyCode::BackTab) => form.focus = form.focus.prev(),

        // Priority selector
        (_, KeyCode::Left) if form.focus == FormField::Priority => {
            form.priority = form.priority.prev();
        }
        (_, KeyCode::Right | KeyCode::Char(' ')) if form.focus == FormField::Priority => {
            form.priority = form.priority.next();
        }

        _ => edit_text(form, key),
    }
}

fn edit_text(form: &mut TaskForm, key: KeyEvent) {
    let Some(input) = form.focused_input() else {
        return;
    };
    match (key.modifiers, key.code) {
        (_, KeyCode::Left) => input.left(),
        (_, KeyCode::Right) => input.right(),
        (_, KeyCode::Home) | (KeyModifiers::CONTROL, KeyCode::Char('a')) => input.home(),
        (_, KeyCode::End) | (KeyModifiers::CONTROL, KeyCode::Char('e')) => input.end(),
        (_, KeyCode::Backspace) => input.backspace(),
        (_, KeyCode::Delete) => input.delete(),
        (KeyModifiers::CONTROL, KeyCode::Char('w')) => input.delete_word(),
        (KeyModifiers::CONTROL, KeyCode::Char('u')) => input.clear(),
        (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => input.insert(c),
        _ => {}
    }
}

fn submit(app: &mut App) {
    let Some(form) = app.form.as_mut() else {
        return;
    };
    let draft = match form.to_draft() {
        Ok(draft) => draft,
        Err(message) => {
            form.focus = FormField::Due;
            form.error = Some(message);
            return;
        }
    };

    let editing = form.editing.clone();
    let feedback = match &editing {
        Some(id) => app.session.update(id, draft),
        None => app.session.add(draft),
    };

    // Validation failures keep the form open
    if feedback.is_error() {
        if let Some(form) = app.form.as_mut() {
            form.focus = FormField::Title;
            form.error = Some(feedback.message.text);
        }
        return;
    }

    if editing.is_none() {
        app.cursor = 0;
    }
    close(app);
    app.apply_feedback(feedback);
}

fn close(app: &mut App) {
    app.form = None;
    app.mode = Mode::Navigate;
}

#[cfg(test)]
mod tests {
    use super::super::handle_key;
    use super::super::test_keys::*;
    use crate::model::task::Priority;
    use crate::tui::app::Mode;
    use crate::tui::form::FormField;
    use crate::tui::render::test_helpers::*;
    use crossterm::event::KeyCode;
    use pretty_assertions::assert_eq;

    fn type_str(app: &mut crate::tui::app::App, s: &str) {
        for c in s.chars() {
            handle_key(app, ch(c));
        }
    }

    #[test]
    fn add_through_form() {
        let (mut app, _) = app_with_tasks(&["older"]);
        app.cursor = 0;
        handle_key(&mut app, ch('a'));
        assert_eq!(app.mode, Mode::Form);

        type_str(&mut app, "Pay rent");
        handle_key(&mut app, key(KeyCode::Tab));
        handle_key(&mut app, key(KeyCode::Tab));
        assert_eq!(app.form.as_ref().unwrap().focus, FormField::Priority);
        handle_key(&mut app, key(KeyCode::Right));
        handle_key(&mut app, key(KeyCode::Tab));
        type_str(&mut app, "by friday");
        handle_key(&mut app, key(KeyCode::Enter));

        assert_eq!(app.mode, Mode::Navigate);
        let task = &app.session.store().tasks()[0];
        assert_eq!(task.title, "Pay rent");
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.notes.as_deref(), Some("by friday"));
        assert_eq!(app.status.as_ref().unwrap().0.text, "Task added successfully");
    }

    #[test]
    fn empty_title_keeps_form_open() {
        let (mut app, _) = app_with_tasks(&[]);
        handle_key(&mut app, ch('a'));
        type_str(&mut app, "   ");
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.mode, Mode::Form);
        assert_eq!(
            app.form.as_ref().unwrap().error.as_deref(),
            Some("Task title is required")
        );
        assert!(app.session.store().is_empty());
    }

    #[test]
    fn invalid_due_date_keeps_form_open() {
        let (mut app, _) = app_with_tasks(&[]);
        handle_key(&mut app, ch('a'));
        type_str(&mut app, "Pay rent");
        handle_key(&mut app, key(KeyCode::Tab));
        type_str(&mut app, "soon");
        handle_key(&mut app, key(KeyCode::Enter));
        let form = app.form.as_ref().unwrap();
        assert_eq!(form.error.as_deref(), Some("Invalid due date"));
        assert_eq!(form.focus, FormField::Due);
        assert!(app.session.store().is_empty());
    }

    #[test]
    fn edit_keeps_completion() {
        let (mut app, _) = app_with_tasks(&["Buy milk"]);
        handle_key(&mut app, ch(' '));
        handle_key(&mut app, ch('e'));
        assert_eq!(app.form.as_ref().unwrap().title.text, "Buy milk");
        handle_key(&mut app, ctrl('w'));
        type_str(&mut app, "oat milk");
        handle_key(&mut app, key(KeyCode::Enter));

        let task = &app.session.store().tasks()[0];
        assert_eq!(task.title, "Buy oat milk");
        assert!(task.completed);
        assert_eq!(app.status.as_ref().unwrap().0.text, "Task updated successfully");
    }

    #[test]
    fn esc_discards() {
        let (mut app, _) = app_with_tasks(&[]);
        handle_key(&mut app, ch('a'));
        type_str(&mut app, "draft");
        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.mode, Mode::Navigate);
        assert!(app.form.is_none());
        assert!(app.session.store().is_empty());
    }

    #[test]
    fn shift_tab_goes_back() {
        let (mut app, _) = app_with_tasks(&[]);
        handle_key(&mut app, ch('a'));
        handle_key(&mut app, shift_tab());
        assert_eq!(app.form.as_ref().unwrap().focus, FormField::Notes);
    }
}
