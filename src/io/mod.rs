pub mod config_io;
pub mod file_index;
pub mod images;
pub mod lock;
pub mod project_io;
pub mod recovery;
pub mod store;
pub mod watcher;
