//! Conversation engine.
//!
//! The [`Bot`] owns nothing mutable itself: content goes through the
//! [`ContentStore`] and per-user state through the [`SessionRegistry`].
//!
//! ## Dispatch
//!
//! ```text
//! input
//! ├── /start, main-menu label   -> reset to main menu (any state)
//! ├── state = admin_panel       -> admin::step (after allow-list check)
//! └── state = main_menu/section -> navigation::handle
//! ```

use std::sync::Arc;

use dermabot_core::labels;
use dermabot_core::{AdminList, Config, Reply, Session, TopState, UserId};
use dermabot_session::SessionRegistry;
use dermabot_store::ContentStore;
use tracing::{debug, info, warn};

use crate::admin;
use crate::error::BotError;
use crate::navigation;
use crate::texts;

// ============================================================================
// Event Handler
// ============================================================================

/// Observer for engine events.
///
/// Front ends implement this to surface state changes; every method has
/// a no-op default.
pub trait BotEventHandler: Send + Sync {
    /// Called after each handled input with the state before and after.
    fn on_transition(&self, _user: UserId, _from: &TopState, _to: &TopState) {}

    /// Called when an admin step fails.
    fn on_error(&self, _user: UserId, _error: &BotError) {}
}

/// Default event handler that does nothing.
pub struct NoOpEventHandler;

impl BotEventHandler for NoOpEventHandler {}

// ============================================================================
// Bot
// ============================================================================

/// Menu-driven content browser and admin editor.
pub struct Bot {
    store: Arc<ContentStore>,
    sessions: Arc<SessionRegistry>,
    admins: AdminList,
    event_handler: Arc<dyn BotEventHandler>,
}

impl Bot {
    pub fn new(store: Arc<ContentStore>, sessions: Arc<SessionRegistry>, admins: AdminList) -> Self {
        Self {
            store,
            sessions,
            admins,
            event_handler: Arc::new(NoOpEventHandler),
        }
    }

    /// Wire up a store and registry from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(ContentStore::from_config(&config.storage)),
            Arc::new(SessionRegistry::from_config(&config.sessions)),
            config.bot.admins.clone(),
        )
    }

    pub fn with_event_handler(mut self, handler: Arc<dyn BotEventHandler>) -> Self {
        self.event_handler = handler;
        self
    }

    pub fn store(&self) -> &Arc<ContentStore> {
        &self.store
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    pub fn admins(&self) -> &AdminList {
        &self.admins
    }

    pub fn is_admin(&self, user: UserId) -> bool {
        self.admins.contains(user)
    }

    /// Reset the user's session and show the welcome menu.
    pub async fn start(&self, user: UserId) -> Reply {
        self.handle_text(user, labels::START).await
    }

    /// Handle one inbound text for `user`.
    ///
    /// Holds the user's session for the whole transition, so inputs from
    /// the same user are processed one at a time.
    pub async fn handle_text(&self, user: UserId, text: &str) -> Reply {
        let handle = self.sessions.get_or_create(user);
        let mut session = handle.lock().await;
        let before = session.state.clone();

        let reply = self.dispatch(&mut session, text);
        session.touch();

        info!(
            "User {}: {} -> {}, message: {:?}",
            user,
            before.describe(),
            session.describe(),
            text
        );
        self.event_handler.on_transition(user, &before, &session.state);
        reply
    }

    fn dispatch(&self, session: &mut Session, text: &str) -> Reply {
        let user = session.user;
        let is_admin = self.is_admin(user);

        if text == labels::START {
            info!("User {} started the bot", user);
            session.reset();
            return texts::main_menu(texts::WELCOME, is_admin);
        }

        if text == labels::MAIN_MENU {
            session.reset();
            return texts::main_menu(texts::CHOOSE_SECTION, is_admin);
        }

        let TopState::AdminPanel(admin_state) = session.state.clone() else {
            return navigation::handle(&self.store, session, is_admin, text);
        };

        if !is_admin {
            warn!(
                "User {} is not an admin but was in {}; resetting",
                user,
                session.describe()
            );
            session.reset();
            return texts::main_menu(texts::ACCESS_DENIED, false);
        }

        let transition = admin::step(&self.store, user, &admin_state, text);
        if let Some(err) = &transition.error {
            admin::log_failure(user, &admin_state, err);
            self.event_handler.on_error(user, err);
        }
        debug!("Admin step {} -> {}", admin_state.name(), transition.next.name());
        session.state = TopState::AdminPanel(transition.next);
        transition.reply
    }
}
