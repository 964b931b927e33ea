use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use log::{info, warn};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use regex::Regex;

use crate::cli::handlers::Context;
use crate::io::config_io::read_config;
use crate::io::state::{UiState, read_ui_state, write_ui_state};
use crate::io::store::DirStore;
use crate::io::system_theme;
use crate::io::watcher::{DataWatcher, FileEvent};
use crate::model::config::AppConfig;
use crate::ops::clock::SystemClock;
use crate::ops::session::{Feedback, Session, StatusMessage, UndoOffer};
use crate::ops::task_store::TaskStore;
use crate::ops::theme::ThemeManager;

use super::form::TaskForm;
use super::input;
use super::render;
use super::theme::Theme;

/// How long a status message stays on screen
pub const STATUS_TTL: Duration = Duration::from_secs(3);

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    Search,
    Form,
    Confirm,
}

/// Main application state
pub struct App {
    pub session: Session,
    pub themes: ThemeManager,
    pub theme: Theme,
    pub config: AppConfig,
    pub data_dir: PathBuf,
    pub mode: Mode,
    pub should_quit: bool,
    /// Cursor index into the visible task list
    pub cursor: usize,
    /// First visible task index
    pub scroll_offset: usize,
    /// Transient message and when it was posted
    pub status: Option<(StatusMessage, Instant)>,
    /// Restore offer for the last deleted task
    pub undo_offer: Option<UndoOffer>,
    pub form: Option<TaskForm>,
    /// Id of the task awaiting delete confirmation
    pub confirm_delete: Option<String>,
}

impl App {
    pub fn new(session: Session, themes: ThemeManager, config: AppConfig, data_dir: PathBuf) -> Self {
        let theme = Theme::for_mode(themes.effective(), &config.ui);
        App {
            session,
            themes,
            theme,
            config,
            data_dir,
            mode: Mode::Navigate,
            should_quit: false,
            cursor: 0,
            scroll_offset: 0,
            status: None,
            undo_offer: None,
            form: None,
            confirm_delete: None,
        }
    }

    /// Number of tasks in the current view
    pub fn visible_count(&self) -> usize {
        self.session.view().count
    }

    /// Id of the task under the cursor
    pub fn selected_id(&self) -> Option<String> {
        self.session
            .view()
            .tasks
            .get(self.cursor)
            .map(|t| t.id.clone())
    }

    pub fn clamp_cursor(&mut self) {
        let count = self.visible_count();
        self.cursor = if count == 0 {
            0
        } else {
            self.cursor.min(count - 1)
        };
    }

    /// Case-insensitive literal pattern for highlighting the search term
    pub fn search_re(&self) -> Option<Regex> {
        let term = self.session.search().trim();
        if term.is_empty() {
            return None;
        }
        Regex::new(&format!("(?i){}", regex::escape(term))).ok()
    }

    /// Record the outcome of a session command for the status row
    pub fn apply_feedback(&mut self, feedback: Feedback) {
        if let Some(offer) = feedback.undo_offer {
            self.undo_offer = Some(offer);
            self.status = None;
        } else {
            self.post(feedback.message);
        }
        self.clamp_cursor();
    }

    pub fn post(&mut self, message: StatusMessage) {
        self.status = Some((message, Instant::now()));
    }

    /// Apply the current theme preference to the palette
    pub fn refresh_theme(&mut self) {
        self.theme = Theme::for_mode(self.themes.effective(), &self.config.ui);
    }

    /// Periodic housekeeping: undo expiry, status timeout, file changes
    pub fn tick(&mut self, watcher: Option<&DataWatcher>) {
        if self.session.tick() {
            self.undo_offer = None;
        }
        if let Some((_, at)) = &self.status
            && at.elapsed() >= STATUS_TTL
        {
            self.status = None;
        }
        for event in watcher.map(|w| w.poll()).unwrap_or_default() {
            self.handle_file_event(event);
        }
    }

    pub fn handle_file_event(&mut self, event: FileEvent) {
        match event {
            FileEvent::ConfigChanged => self.reload_config(),
            FileEvent::TasksChanged => {
                // Our own writes land here too and reload as a no-op
                if self.session.reload() {
                    info!("event=tasks_external_change count={}", self.session.store().len());
                    self.clamp_cursor();
                }
            }
        }
    }

    /// Re-read config.toml and re-detect the system theme
    pub fn reload_config(&mut self) {
        match read_config(&self.data_dir) {
            Ok(config) => self.config = config,
            Err(e) => {
                warn!("event=config_reload status=error error={}", e);
                return;
            }
        }
        let system = system_theme::detect(&self.config);
        if let Some(mode) = self.themes.system_changed(system) {
            info!("event=system_theme_change theme={}", mode);
        }
        self.refresh_theme();
    }

    pub fn ui_state(&self) -> UiState {
        UiState {
            filter: self.session.filter(),
            search: self.session.search().to_string(),
            cursor: self.cursor,
        }
    }

    pub fn restore_ui_state(&mut self, state: UiState) {
        self.session.set_filter(state.filter);
        self.session.set_search(state.search);
        self.cursor = state.cursor;
        self.clamp_cursor();
    }
}

fn save_ui_state(app: &App) {
    if let Err(e) = write_ui_state(&app.data_dir, &app.ui_state()) {
        warn!("event=ui_state_save status=error error={}", e);
    }
}

/// Run the TUI application
pub fn run(ctx: Context) -> Result<(), Box<dyn std::error::Error>> {
    let Context { data_dir, config } = ctx;

    let tasks = TaskStore::load_all(
        Box::new(DirStore::open(&data_dir)?),
        Box::new(SystemClock),
    );
    let themes = ThemeManager::load(
        Box::new(DirStore::open(&data_dir)?),
        system_theme::detect(&config),
    );
    let mut app = App::new(Session::new(tasks), themes, config, data_dir);

    if let Some(state) = read_ui_state(&app.data_dir) {
        app.restore_ui_state(state);
    }

    let watcher = match DataWatcher::start(&app.data_dir) {
        Ok(w) => Some(w),
        Err(e) => {
            warn!("event=data_watch status=error error={}", e);
            None
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    info!("event=tui_start tasks={}", app.session.store().len());
    let result = run_event_loop(&mut terminal, &mut app, watcher.as_ref());

    save_ui_state(&app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    watcher: Option<&DataWatcher>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut save_counter = 0u32;
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
            // Debounced state save: every ~5 key presses
            save_counter += 1;
            if save_counter >= 5 {
                save_ui_state(app);
                save_counter = 0;
            }
        }

        app.tick(watcher);

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
