pub mod add;
pub mod dashboard;
pub mod format;
pub mod import;
pub mod summary;
