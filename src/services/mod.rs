pub mod auth;
pub mod sharing;
