//! # dermabot-bot
//!
//! Conversation engine for Dermabot.
//!
//! This crate provides:
//! - Main menu and section browsing
//! - Admin Add/Edit/Delete workflows as an explicit state machine
//! - User-safe error categories for failed admin steps
//! - A [`Transport`] trait and the [`serve`] loop

mod admin;
pub mod bot;
pub mod error;
mod navigation;
pub mod texts;
pub mod transport;

pub use admin::parse_add_payload;
pub use bot::{Bot, BotEventHandler, NoOpEventHandler};
pub use error::{BotError, BotResult};
pub use transport::{serve, Inbound, Transport};
