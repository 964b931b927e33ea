use std::path::PathBuf;

use chrono::{TimeZone, Utc};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::io::store::MemoryStore;
use crate::model::config::AppConfig;
use crate::model::task::TaskDraft;
use crate::ops::clock::ManualClock;
use crate::ops::session::Session;
use crate::ops::task_store::TaskStore;
use crate::ops::theme::{ThemeManager, ThemeMode};
use crate::tui::app::App;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// An App over an in-memory store, with `titles` added in order (so the last
/// one is on top). The clock starts at 2025-05-14 09:00 UTC.
pub fn app_with_tasks(titles: &[&str]) -> (App, ManualClock) {
    app_over_store(MemoryStore::new(), titles)
}

/// Like [`app_with_tasks`], over a store the test keeps a handle to
pub fn app_over_store(tasks_store: MemoryStore, titles: &[&str]) -> (App, ManualClock) {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 5, 14, 9, 0, 0).unwrap());
    let tasks = TaskStore::load_all(Box::new(tasks_store), Box::new(clock.clone()));
    let mut session = Session::new(tasks);
    for title in titles {
        session.add(TaskDraft::new(*title));
    }
    let themes = ThemeManager::load(Box::new(MemoryStore::new()), ThemeMode::Dark);
    let app = App::new(
        session,
        themes,
        AppConfig::default(),
        PathBuf::from("/tmp/tasklist-test"),
    );
    (app, clock)
}
