//! Admin panel workflows.
//!
//! [`step`] is the whole transition table for the admin sub-state: given
//! the current step and the user's input it performs any store mutation
//! and returns the next step with its reply. The caller has already
//! checked the allow-list and handled the main-menu label.

use dermabot_core::labels;
use dermabot_core::{AdminState, Item, PayloadFormat, Reply, Section, UserId};
use dermabot_store::ContentStore;
use tracing::{error, info, warn};

use crate::error::{BotError, BotResult};
use crate::texts;

/// Next admin sub-state plus the reply to send.
#[derive(Debug)]
pub(crate) struct Transition {
    pub next: AdminState,
    pub reply: Reply,
    pub error: Option<BotError>,
}

impl Transition {
    fn to(next: AdminState, reply: Reply) -> Self {
        Self {
            next,
            reply,
            error: None,
        }
    }

    /// Back to the admin menu.
    fn idle(text: impl Into<String>) -> Self {
        Self::to(AdminState::Idle, texts::admin_menu(text))
    }

    /// Recoverable errors keep the current step; anything else ends it.
    fn failed(current: &AdminState, err: BotError) -> Self {
        let reply_text = err.user_message();
        let (next, reply) = if err.is_recoverable() {
            (current.clone(), texts::cancel_only(reply_text))
        } else {
            (AdminState::Idle, texts::admin_menu(reply_text))
        };
        Self {
            next,
            reply,
            error: Some(err),
        }
    }
}

/// Which workflow a section choice belongs to.
#[derive(Debug, Clone, Copy)]
enum Action {
    Edit,
    Delete,
}

pub(crate) fn step(store: &ContentStore, user: UserId, state: &AdminState, text: &str) -> Transition {
    if !state.is_idle() && text == labels::CANCEL {
        return Transition::idle(texts::CANCELLED);
    }

    match state {
        AdminState::Idle => match text {
            labels::ADD_ITEM => Transition::to(
                AdminState::WaitingAddSection,
                texts::section_picker(texts::PICK_SECTION_ADD),
            ),
            labels::EDIT_ITEM => Transition::to(
                AdminState::WaitingEditSection,
                texts::section_picker(texts::PICK_SECTION_EDIT),
            ),
            labels::DELETE_ITEM => Transition::to(
                AdminState::WaitingDeleteSection,
                texts::section_picker(texts::PICK_SECTION_DELETE),
            ),
            _ => Transition::idle(texts::UNKNOWN_ACTION),
        },

        AdminState::WaitingAddSection => match Section::from_admin_label(text) {
            Some(section) => Transition::to(
                AdminState::WaitingAddItem { section },
                texts::cancel_only(texts::add_prompt(section)),
            ),
            None => Transition::idle(texts::INVALID_SECTION),
        },

        AdminState::WaitingAddItem { section } => match add_item(store, user, *section, text) {
            Ok(item) => Transition::idle(texts::added(&item, *section)),
            Err(e) => Transition::failed(state, e),
        },

        AdminState::WaitingEditSection => choose_section(store, text, Action::Edit),

        AdminState::WaitingEditItemList { section } => match store.find_by_name(*section, text) {
            Some(item) => {
                let prompt = texts::rename_prompt(&item);
                Transition::to(
                    AdminState::WaitingEditItem {
                        section: *section,
                        item,
                    },
                    texts::cancel_only(prompt),
                )
            }
            None => Transition::idle(texts::ITEM_NOT_FOUND),
        },

        AdminState::WaitingEditItem { section, item } => {
            match rename_item(store, user, *section, item, text) {
                Ok(renamed) => Transition::idle(texts::renamed(&renamed)),
                Err(e) => Transition::failed(state, e),
            }
        }

        AdminState::WaitingDeleteSection => choose_section(store, text, Action::Delete),

        AdminState::WaitingDeleteItemList { section } => {
            match store.remove_item(*section, text) {
                Ok(item) => {
                    info!("User {} deleted '{}' from {}", user, item.name, section);
                    Transition::idle(texts::deleted(&item))
                }
                Err(e) => Transition::failed(state, e.into()),
            }
        }
    }
}

/// Section choice for Edit or Delete: list its items, or bail out if it
/// has none.
fn choose_section(store: &ContentStore, text: &str, action: Action) -> Transition {
    let Some(section) = Section::from_admin_label(text) else {
        return Transition::idle(texts::INVALID_SECTION);
    };

    let collection = store.load(section);
    if collection.is_empty() {
        return Transition::idle(match action {
            Action::Edit => texts::nothing_to_edit(section),
            Action::Delete => texts::nothing_to_delete(section),
        });
    }

    let (next, heading) = match action {
        Action::Edit => (
            AdminState::WaitingEditItemList { section },
            format!(
                "Выберите элемент для редактирования в разделе '{}'",
                section.admin_label()
            ),
        ),
        Action::Delete => (
            AdminState::WaitingDeleteItemList { section },
            format!(
                "Выберите элемент для удаления в разделе '{}'",
                section.admin_label()
            ),
        ),
    };
    Transition::to(
        next,
        texts::item_picker(
            texts::item_listing(&heading, &collection.items),
            &collection.items,
            labels::CANCEL,
        ),
    )
}

/// Extract the item name from an Add payload.
///
/// Topics take `category|name` with exactly one separator; other sections
/// take the whole input. The name is trimmed and must not be empty.
pub fn parse_add_payload(section: Section, text: &str) -> BotResult<String> {
    let name = match section.payload_format() {
        PayloadFormat::CategoryAndName => {
            let mut parts = text.split(labels::PAYLOAD_SEPARATOR);
            let (Some(category), Some(name), None) = (parts.next(), parts.next(), parts.next())
            else {
                return Err(BotError::InvalidInput(format!(
                    "ожидается формат раздел{}название",
                    labels::PAYLOAD_SEPARATOR
                )));
            };
            tracing::debug!("Topic category '{}'", category.trim());
            name.trim()
        }
        PayloadFormat::Name => text.trim(),
    };

    if name.is_empty() {
        return Err(BotError::InvalidInput("название не может быть пустым".into()));
    }
    Ok(name.to_string())
}

fn add_item(store: &ContentStore, user: UserId, section: Section, text: &str) -> BotResult<Item> {
    let name = parse_add_payload(section, text)?;
    let item = store.add_item(section, &name)?;
    info!("User {} added '{}' to {}", user, item.name, section);
    Ok(item)
}

fn rename_item(
    store: &ContentStore,
    user: UserId,
    section: Section,
    item: &Item,
    text: &str,
) -> BotResult<Item> {
    let new_name = text.trim();
    if new_name.is_empty() {
        return Err(BotError::InvalidInput("название не может быть пустым".into()));
    }
    let renamed = store.rename_item(section, item, new_name)?;
    info!("User {} renamed '{}' to '{}' in {}", user, item.name, renamed.name, section);
    Ok(renamed)
}

/// Log a failed step at the level its category deserves.
pub(crate) fn log_failure(user: UserId, state: &AdminState, err: &BotError) {
    match err {
        BotError::InvalidInput(_) => info!("User {} sent invalid input in {}: {}", user, state.name(), err),
        BotError::ItemNotFound(_) => warn!("User {} in {}: {}", user, state.name(), err),
        BotError::SaveFailed(_) => error!("Admin step {} failed for user {}: {}", state.name(), user, err),
    }
}
