//! # dermabot-core
//!
//! Core types and abstractions for Dermabot - a menu-driven browser and
//! editor for educational dermatology content.
//!
//! This crate provides:
//! - Fixed content sections and their labels
//! - Items and section collections (the on-disk data model)
//! - Per-user session state (navigation and admin workflow)
//! - Outbound replies
//! - Configuration system
//! - Common error types

pub mod config;
pub mod content;
pub mod error;
pub mod labels;
pub mod reply;
pub mod section;
pub mod session;

pub use config::{AdminList, Config, IdStrategy};
pub use content::{Item, SectionCollection};
pub use error::{Error, Result};
pub use reply::Reply;
pub use section::{PayloadFormat, Section};
pub use session::{AdminState, Session, TopState, UserId};
