//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&SqlitePool` as the first argument.

pub mod history_repo;
pub mod user_repo;

pub use history_repo::HistoryRepo;
pub use user_repo::UserRepo;
