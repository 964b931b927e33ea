pub mod clock;
pub mod codec;
pub mod session;
pub mod task_store;
pub mod theme;
pub mod view;
