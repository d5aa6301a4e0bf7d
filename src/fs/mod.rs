pub mod naming;
pub mod path;
pub mod store;
pub mod watcher;
