//! Reserved input labels.
//!
//! Display text is a fixed set; these are the strings the bot matches
//! user input against, besides the section labels in [`crate::Section`].

/// Command that resets the session.
pub const START: &str = "/start";

/// Return to the main menu from any state.
pub const MAIN_MENU: &str = "🔙 Главное меню";

/// Enter the admin panel (admins only).
pub const ADMIN_PANEL: &str = "👑 Админ-панель";

pub const ADD_ITEM: &str = "Добавить элемент";
pub const EDIT_ITEM: &str = "Редактировать элемент";
pub const DELETE_ITEM: &str = "Удалить элемент";

/// Abort the current admin workflow.
pub const CANCEL: &str = "Отмена";

/// Separator in the topics "Add" payload.
pub const PAYLOAD_SEPARATOR: char = '|';
