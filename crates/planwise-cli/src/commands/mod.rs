pub mod agenda;
pub mod config;
pub mod optimize;
pub mod task;
