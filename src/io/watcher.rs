use std::path::Path;
use std::sync::mpsc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::io::config_io::CONFIG_FILE;
use crate::io::store::TASKS_KEY;

/// Events sent from the watcher to the TUI event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEvent {
    /// config.toml was created, modified or removed
    ConfigChanged,
    /// The task file was replaced, possibly by another `tl` process
    TasksChanged,
}

/// Watches the data directory for config and task file changes.
pub struct DataWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<FileEvent>,
}

impl DataWatcher {
    /// Start watching `data_dir`. Call `poll()` each tick.
    pub fn start(data_dir: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let event = match result {
                    Ok(e) => e,
                    Err(_) => return,
                };
                for file_event in classify(&event) {
                    let _ = tx.send(file_event);
                }
            },
            Config::default(),
        )?;

        watcher.watch(data_dir, RecursiveMode::NonRecursive)?;
        Ok(DataWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Non-blocking poll. Bursts collapse to at most one event of each kind.
    pub fn poll(&self) -> Vec<FileEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.rx.try_recv() {
            if !events.contains(&evt) {
                events.push(evt);
            }
        }
        events
    }
}

/// Map a notify event to the files we care about. Temp files, the lock,
/// logs and `.state.json` are ignored.
fn classify(event: &Event) -> Vec<FileEvent> {
    match event.kind {
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
        _ => return Vec::new(),
    }
    let mut out = Vec::new();
    for name in event
        .paths
        .iter()
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
    {
        let kind = match name {
            CONFIG_FILE => FileEvent::ConfigChanged,
            TASKS_KEY => FileEvent::TasksChanged,
            _ => continue,
        };
        if !out.contains(&kind) {
            out.push(kind);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind, RenameMode};
    use std::path::PathBuf;

    fn modify(path: &str) -> Event {
        Event::new(EventKind::Modify(ModifyKind::Any)).add_path(PathBuf::from(path))
    }

    #[test]
    fn config_and_task_files_are_classified() {
        assert_eq!(classify(&modify("/data/config.toml")), vec![FileEvent::ConfigChanged]);
        assert_eq!(classify(&modify("/data/tasks")), vec![FileEvent::TasksChanged]);

        let created = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/data/config.toml"));
        assert_eq!(classify(&created), vec![FileEvent::ConfigChanged]);
    }

    #[test]
    fn atomic_replace_of_tasks_counts() {
        // Temp file renamed over the task file
        let renamed = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            .add_path(PathBuf::from("/data/.tmpAb12Cd"))
            .add_path(PathBuf::from("/data/tasks"));
        assert_eq!(classify(&renamed), vec![FileEvent::TasksChanged]);
    }

    #[test]
    fn other_files_and_access_are_ignored() {
        assert!(classify(&modify("/data/.lock")).is_empty());
        assert!(classify(&modify("/data/.state.json")).is_empty());
        assert!(classify(&modify("/data/tasks.corrupt")).is_empty());
        assert!(classify(&modify("/data/theme")).is_empty());

        let accessed = Event::new(EventKind::Access(AccessKind::Any))
            .add_path(PathBuf::from("/data/tasks"));
        assert!(classify(&accessed).is_empty());
    }
}
