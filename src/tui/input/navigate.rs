use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::info;

use crate::ops::view::Filter;
use crate::tui::app::{App, Mode};
use crate::tui::form::TaskForm;

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    match (key.modifiers, key.code) {
        (KeyModifiers::NONE, KeyCode::Char('q')) | (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
            app.should_quit = true;
        }

        // Cursor
        (_, KeyCode::Char('j') | KeyCode::Down) => {
            if app.cursor + 1 < app.visible_count() {
                app.cursor += 1;
            }
        }
        (_, KeyCode::Char('k') | KeyCode::Up) => {
            app.cursor = app.cursor.saturating_sub(1);
        }
        (_, KeyCode::Char('g') | KeyCode::Home) => app.cursor = 0,
        (_, KeyCode::Char('G') | KeyCode::End) => {
            app.cursor = app.visible_count().saturating_sub(1);
        }

        // Task commands
        (_, KeyCode::Char('a')) => {
            app.form = Some(TaskForm::add());
            app.mode = Mode::Form;
        }
        (_, KeyCode::Char('e') | KeyCode::Enter) => {
            let form = app
                .selected_id()
                .and_then(|id| app.session.store().get(&id).map(TaskForm::edit));
            if let Some(form) = form {
                app.form = Some(form);
                app.mode = Mode::Form;
            }
        }
        (_, KeyCode::Char(' ')) => {
            if let Some(id) = app.selected_id() {
                let feedback = app.session.toggle(&id);
                app.apply_feedback(feedback);
            }
        }
        (_, KeyCode::Char('d') | KeyCode::Delete) => {
            if let Some(id) = app.selected_id() {
                app.confirm_delete = Some(id);
                app.mode = Mode::Confirm;
            }
        }
        (_, KeyCode::Char('u')) => {
            let restoring = app.session.store().pending_undo().is_some();
            let feedback = app.session.undo();
            app.undo_offer = None;
            app.apply_feedback(feedback);
            // The restored task goes back on top
            if restoring {
                app.cursor = 0;
                app.scroll_offset = 0;
            }
        }

        // View
        (_, KeyCode::Char('/')) => app.mode = Mode::Search,
        (_, KeyCode::Esc) => {
            if !app.session.search().is_empty() {
                app.session.set_search("");
                app.clamp_cursor();
            }
        }
        (_, KeyCode::Tab) => set_filter(app, app.session.filter().next()),
        (_, KeyCode::Char(c @ '1'..='3')) => {
            let index = c as usize - '1' as usize;
            set_filter(app, Filter::ALL[index]);
        }
        (_, KeyCode::Char('t')) => {
            let mode = app.themes.toggle();
            info!("event=theme_toggle theme={}", mode);
            app.refresh_theme();
        }
        _ => {}
    }
}

fn set_filter(app: &mut App, filter: Filter) {
    app.session.set_filter(filter);
    app.cursor = 0;
    app.scroll_offset = 0;
}
