pub mod entry;
pub mod github;
pub mod snapshot;
