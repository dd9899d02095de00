pub mod config;
pub mod coordinator;
pub mod error;
pub mod household;
pub mod model;
pub mod notification;
pub mod parser;
pub mod reminders;
pub mod schedule;
pub mod sound;
pub mod status;
pub mod store;
