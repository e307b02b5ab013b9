//! Main menu and section browsing.

use dermabot_core::labels;
use dermabot_core::{AdminState, Reply, Section, Session, TopState};
use dermabot_store::ContentStore;
use tracing::debug;

use crate::texts;

/// Handle input while in the main menu or browsing a section.
pub(crate) fn handle(store: &ContentStore, session: &mut Session, is_admin: bool, text: &str) -> Reply {
    if let Some(section) = Section::from_menu_label(text) {
        return open_section(store, session, section, is_admin);
    }

    if text == labels::ADMIN_PANEL && is_admin {
        session.state = TopState::AdminPanel(AdminState::Idle);
        return texts::admin_menu(texts::ADMIN_WELCOME);
    }

    texts::main_menu(texts::UNKNOWN_COMMAND, is_admin)
}

/// List a section's items, or report that it is empty.
///
/// An empty section leaves the state untouched.
fn open_section(store: &ContentStore, session: &mut Session, section: Section, is_admin: bool) -> Reply {
    let collection = store.load(section);
    if collection.is_empty() {
        debug!("Section {} is empty", section);
        return texts::main_menu(section.empty_notice(), is_admin);
    }

    session.state = TopState::Browsing(section);
    texts::item_picker(
        texts::item_listing(section.browse_prompt(), &collection.items),
        &collection.items,
        labels::MAIN_MENU,
    )
}
