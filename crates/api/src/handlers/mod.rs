pub mod auth;
pub mod history;
pub mod patients;
pub mod users;
pub mod videos;
