//! Per-user conversation state.
//!
//! The state is two-level: a [`TopState`] saying where the user is, and,
//! only while inside the admin panel, an [`AdminState`] saying which step
//! of an Add/Edit/Delete workflow is pending. Data a step needs (chosen
//! section, selected item) lives inside the variant, so a state can never
//! reference a selection it does not have.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::Item;
use crate::section::Section;

/// Caller identity as delivered by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        UserId(id)
    }
}

/// Top-level navigation state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TopState {
    #[default]
    MainMenu,
    /// Browsing one section's item list
    Browsing(Section),
    /// Inside the admin panel
    AdminPanel(AdminState),
}

impl TopState {
    /// Compact `top/sub` description for logs.
    pub fn describe(&self) -> String {
        match self {
            TopState::Browsing(section) => format!("section:{}", section),
            TopState::AdminPanel(admin) => format!("admin_panel/{}", admin.name()),
            TopState::MainMenu => "main_menu".to_string(),
        }
    }
}

/// Step within an admin workflow.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AdminState {
    /// No workflow in progress
    #[default]
    Idle,
    WaitingAddSection,
    WaitingAddItem { section: Section },
    WaitingEditSection,
    WaitingEditItemList { section: Section },
    WaitingEditItem { section: Section, item: Item },
    WaitingDeleteSection,
    WaitingDeleteItemList { section: Section },
}

impl AdminState {
    pub fn name(&self) -> &'static str {
        match self {
            AdminState::Idle => "none",
            AdminState::WaitingAddSection => "waiting_add_section",
            AdminState::WaitingAddItem { .. } => "waiting_add_item",
            AdminState::WaitingEditSection => "waiting_edit_section",
            AdminState::WaitingEditItemList { .. } => "waiting_edit_item_list",
            AdminState::WaitingEditItem { .. } => "waiting_edit_item",
            AdminState::WaitingDeleteSection => "waiting_delete_section",
            AdminState::WaitingDeleteItemList { .. } => "waiting_delete_item_list",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, AdminState::Idle)
    }
}

/// A user's conversation record.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: UserId,
    pub state: TopState,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
}

impl Session {
    /// Create a session in the main menu.
    pub fn new(user: UserId) -> Self {
        let now = Utc::now();
        Self {
            user,
            state: TopState::MainMenu,
            created_at: now,
            last_active_at: now,
        }
    }

    /// Drop all navigation and workflow state.
    pub fn reset(&mut self) {
        self.state = TopState::MainMenu;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.last_active_at = Utc::now();
    }

    /// The admin sub-state, if the session is inside the admin panel.
    pub fn admin_state(&self) -> Option<&AdminState> {
        match &self.state {
            TopState::AdminPanel(admin) => Some(admin),
            _ => None,
        }
    }

    /// True while an admin Add/Edit/Delete workflow awaits input.
    pub fn is_mid_workflow(&self) -> bool {
        self.admin_state().is_some_and(|admin| !admin.is_idle())
    }

    pub fn describe(&self) -> String {
        self.state.describe()
    }
}
