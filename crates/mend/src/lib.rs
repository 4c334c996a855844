pub mod assistant;
pub mod config;
pub mod conversation;
pub mod errors;
pub mod formatter;
pub mod models;
pub mod providers;
pub mod vision;
