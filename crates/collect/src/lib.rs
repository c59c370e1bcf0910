pub mod collector;
pub mod github;
