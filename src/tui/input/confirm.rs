use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::{App, Mode};

pub(super) fn handle_confirm(app: &mut App, key: KeyEvent) {
    match (key.modifiers, key.code) {
        // Confirm: y
        (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char('y' | 'Y')) => {
            app.mode = Mode::Navigate;
            if let Some(id) = app.confirm_delete.take() {
                let feedback = app.session.delete(&id);
                app.apply_feedback(feedback);
            }
        }
        // Cancel: n or Esc
        (_, KeyCode::Char('n' | 'N')) | (_, KeyCode::Esc) => {
            app.confirm_delete = None;
            app.mode = Mode::Navigate;
        }
        _ => {}
    }
}
