//! CLI command implementations.

pub mod backups;
pub mod chat;
pub mod config;
pub mod doctor;
pub mod sections;
