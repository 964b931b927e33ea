use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::{App, Mode};

/// Search mode edits the session's search term directly, so the list
/// filters as you type.
pub(super) fn handle_search(app: &mut App, key: KeyEvent) {
    match (key.modifiers, key.code) {
        // Clear and leave
        (_, KeyCode::Esc) => {
            app.session.set_search("");
            app.mode = Mode::Navigate;
        }

        // Keep the term and leave
        (_, KeyCode::Enter) => {
            app.mode = Mode::Navigate;
        }

        (_, KeyCode::Backspace) => {
            let mut term = app.session.search().to_string();
            term.pop();
            set_term(app, term);
        }

        (KeyModifiers::CONTROL, KeyCode::Char('u')) => set_term(app, String::new()),

        // Type character
        (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => {
            let mut term = app.session.search().to_string();
            term.push(c);
            set_term(app, term);
        }

        _ => {}
    }
}

fn set_term(app: &mut App, term: String) {
    app.session.set_search(term);
    app.cursor = 0;
    app.scroll_offset = 0;
}
