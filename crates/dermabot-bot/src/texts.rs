//! Reply texts and keyboards.

use dermabot_core::labels;
use dermabot_core::{Item, Reply, Section};

pub const WELCOME: &str = "Добро пожаловать в бот по дерматовенерологии!\nВыберите раздел:";
pub const CHOOSE_SECTION: &str = "Выберите раздел:";
pub const UNKNOWN_COMMAND: &str = "Неизвестная команда. Выберите раздел:";
pub const ACCESS_DENIED: &str = "Доступ запрещен.";

pub const ADMIN_WELCOME: &str = "Вы в админ-панели. Выберите действие:";
pub const UNKNOWN_ACTION: &str = "Неизвестная команда. Выберите действие:";
pub const INVALID_SECTION: &str = "Неверный раздел. Выберите действие:";
pub const ITEM_NOT_FOUND: &str = "Элемент не найден. Выберите действие:";
pub const CANCELLED: &str = "Действие отменено. Выберите действие:";
pub const SAVE_FAILED: &str = "Не удалось сохранить изменения. Выберите действие:";

pub const PICK_SECTION_ADD: &str = "Выберите раздел для добавления элемента:";
pub const PICK_SECTION_EDIT: &str = "Выберите раздел для редактирования элемента:";
pub const PICK_SECTION_DELETE: &str = "Выберите раздел для удаления элемента:";

pub fn add_prompt(section: Section) -> String {
    format!(
        "Введите данные для нового элемента в разделе '{}'.\n\
         Для 'Теория' используйте формат: раздел|название темы (например: Дерматиты|Экзема).\n\
         Для других разделов просто название (например: Что такое экзема?).",
        section.admin_label()
    )
}

pub fn added(item: &Item, section: Section) -> String {
    format!(
        "Элемент '{}' добавлен в раздел '{}'.",
        item.name,
        section.admin_label()
    )
}

pub fn rename_prompt(item: &Item) -> String {
    format!("Введите новое название для '{}':", item.name)
}

pub fn renamed(item: &Item) -> String {
    format!("Элемент переименован в '{}'.", item.name)
}

pub fn deleted(item: &Item) -> String {
    format!("Элемент '{}' удален.", item.name)
}

pub fn nothing_to_edit(section: Section) -> String {
    format!(
        "В разделе '{}' нет элементов для редактирования.",
        section.admin_label()
    )
}

pub fn nothing_to_delete(section: Section) -> String {
    format!("В разделе '{}' нет элементов для удаления.", section.admin_label())
}

pub fn input_error(detail: &str) -> String {
    format!("Ошибка: {}. Попробуйте снова или выберите '{}'.", detail, labels::CANCEL)
}

/// `"<heading>:\n<id>. <name>\n..."`
pub fn item_listing(heading: &str, items: &[Item]) -> String {
    let lines: Vec<String> = items
        .iter()
        .map(|item| format!("{}. {}", item.id, item.name))
        .collect();
    format!("{}:\n{}", heading, lines.join("\n"))
}

/// The five section buttons, plus the admin button for admins.
pub fn main_menu(text: impl Into<String>, is_admin: bool) -> Reply {
    let mut buttons: Vec<&str> = Section::ALL.iter().map(|s| s.menu_label()).collect();
    if is_admin {
        buttons.push(labels::ADMIN_PANEL);
    }
    Reply::new(text).with_buttons(buttons)
}

pub fn admin_menu(text: impl Into<String>) -> Reply {
    Reply::new(text).with_buttons([
        labels::ADD_ITEM,
        labels::EDIT_ITEM,
        labels::DELETE_ITEM,
        labels::MAIN_MENU,
    ])
}

/// Admin section labels followed by Cancel.
pub fn section_picker(text: impl Into<String>) -> Reply {
    let buttons = Section::ALL
        .iter()
        .map(|s| s.admin_label())
        .chain([labels::CANCEL]);
    Reply::new(text).with_buttons(buttons)
}

/// One button per item name, followed by `last`.
pub fn item_picker(text: impl Into<String>, items: &[Item], last: &str) -> Reply {
    let buttons = items
        .iter()
        .map(|item| item.name.as_str())
        .chain([last]);
    Reply::new(text).with_buttons(buttons)
}

pub fn cancel_only(text: impl Into<String>) -> Reply {
    Reply::new(text).with_buttons([labels::CANCEL])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_menu_admin_button() {
        let reply = main_menu(WELCOME, false);
        assert_eq!(reply.keyboard.len(), 5);
        assert!(!reply.has_label(labels::ADMIN_PANEL));

        let reply = main_menu(WELCOME, true);
        assert_eq!(reply.keyboard.len(), 6);
        assert!(reply.has_label(labels::ADMIN_PANEL));
    }

    #[test]
    fn test_item_listing() {
        let items = vec![Item::new("1", "A"), Item::new("2", "B")];
        assert_eq!(item_listing("Выберите тест", &items), "Выберите тест:\n1. A\n2. B");
    }
}
