//! # dermabot-session
//!
//! In-memory conversation sessions for Dermabot.
//!
//! The [`SessionRegistry`] maps each user to a [`Session`] behind its own
//! async mutex, so one user's updates are handled strictly in order while
//! different users proceed independently. Sessions are created lazily on
//! first contact and are lost on restart.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dermabot_session::SessionRegistry;
//!
//! let registry = Arc::new(SessionRegistry::new(Some(Duration::from_secs(86400))));
//! let sweeper = registry.clone().spawn_sweeper(Duration::from_secs(600));
//!
//! let handle = registry.get_or_create(user);
//! let mut session = handle.lock().await;
//! ```
//!
//! [`Session`]: dermabot_core::Session

pub mod registry;

pub use registry::{SessionHandle, SessionRegistry};
