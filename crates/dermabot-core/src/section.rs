//! Fixed content sections.
//!
//! Sections are defined at compile time. Each one carries four names: the
//! main-menu button label, the shorter label used inside the admin panel,
//! the storage directory under `data/`, and the JSON field holding its
//! items. Directory and key differ only for [`Section::Topics`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A top-level content category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// Theory topics
    Topics,
    /// Theory questions
    Questions,
    /// Tests
    Tests,
    /// Image-based tests
    ImageTests,
    /// Situational tasks
    Tasks,
}

/// How the admin "Add" payload is parsed for a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    /// `category|name`, exactly one separator
    CategoryAndName,
    /// The whole input is the name
    Name,
}

impl Section {
    /// All sections in menu order.
    pub const ALL: [Section; 5] = [
        Section::Topics,
        Section::Questions,
        Section::Tests,
        Section::ImageTests,
        Section::Tasks,
    ];

    /// Position in [`Section::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// JSON field name inside the collection file.
    pub fn key(self) -> &'static str {
        match self {
            Section::Topics => "topics",
            Section::Questions => "questions",
            Section::Tests => "tests",
            Section::ImageTests => "image_tests",
            Section::Tasks => "tasks",
        }
    }

    /// Directory under the data root.
    pub fn dir(self) -> &'static str {
        match self {
            Section::Topics => "theory",
            other => other.key(),
        }
    }

    /// Button label on the main menu.
    pub fn menu_label(self) -> &'static str {
        match self {
            Section::Topics => "📚 Теория",
            Section::Questions => "❓ Теоретические вопросы",
            Section::Tests => "📝 Тесты",
            Section::ImageTests => "🖼️ Тесты по изображениям",
            Section::Tasks => "🧩 Ситуационные задачи",
        }
    }

    /// Button label inside the admin panel.
    pub fn admin_label(self) -> &'static str {
        match self {
            Section::Topics => "Теория",
            Section::Questions => "Теоретические вопросы",
            Section::Tests => "Тесты",
            Section::ImageTests => "Тесты по изображениям",
            Section::Tasks => "Ситуационные задачи",
        }
    }

    /// Heading shown above the item list while browsing.
    pub fn browse_prompt(self) -> &'static str {
        match self {
            Section::Topics => "Выберите тему",
            Section::Questions => "Выберите вопрос",
            Section::Tests => "Выберите тест",
            Section::ImageTests => "Выберите тест по изображениям",
            Section::Tasks => "Выберите задачу",
        }
    }

    /// Notice shown when the section has no items.
    pub fn empty_notice(self) -> &'static str {
        match self {
            Section::Topics => "Тем пока нет.",
            Section::Questions => "Вопросов пока нет.",
            Section::Tests => "Тестов пока нет.",
            Section::ImageTests => "Тестов по изображениям пока нет.",
            Section::Tasks => "Задач пока нет.",
        }
    }

    pub fn payload_format(self) -> PayloadFormat {
        match self {
            Section::Topics => PayloadFormat::CategoryAndName,
            _ => PayloadFormat::Name,
        }
    }

    pub fn from_menu_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.menu_label() == label)
    }

    pub fn from_admin_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.admin_label() == label)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Section {
    type Err = Error;

    /// Accepts either the JSON key or the directory name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sec| sec.key() == s || sec.dir() == s)
            .ok_or_else(|| Error::NotFound(format!("section '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topics_dir_differs_from_key() {
        assert_eq!(Section::Topics.dir(), "theory");
        assert_eq!(Section::Topics.key(), "topics");
        assert_eq!(Section::ImageTests.dir(), "image_tests");
    }

    #[test]
    fn test_label_lookup() {
        assert_eq!(Section::from_menu_label("📝 Тесты"), Some(Section::Tests));
        assert_eq!(Section::from_admin_label("Тесты"), Some(Section::Tests));
        // Admin labels are not main-menu labels and vice versa
        assert_eq!(Section::from_menu_label("Тесты"), None);
        assert_eq!(Section::from_admin_label("📝 Тесты"), None);
    }

    #[test]
    fn test_index_matches_all_order() {
        for (i, section) in Section::ALL.into_iter().enumerate() {
            assert_eq!(section.index(), i);
        }
    }

    #[test]
    fn test_parse_by_key_or_dir() {
        assert_eq!("theory".parse::<Section>().unwrap(), Section::Topics);
        assert_eq!("topics".parse::<Section>().unwrap(), Section::Topics);
        assert!("nope".parse::<Section>().is_err());
    }
}
