pub mod config_io;
pub mod lock;
pub mod logging;
pub mod state;
pub mod store;
pub mod system_theme;
pub mod watcher;
