//! Items and their per-section collections.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::section::Section;

/// A single content entry.
///
/// `id` is not guaranteed unique: with the default id strategy it is
/// derived from the collection length at insert time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
}

impl Item {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// All items of one section, in insertion order.
///
/// On disk this is `{ "<section key>": [ {"id": .., "name": ..}, .. ] }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionCollection {
    pub section: Section,
    pub items: Vec<Item>,
}

impl SectionCollection {
    /// Create an empty collection.
    pub fn empty(section: Section) -> Self {
        Self {
            section,
            items: Vec::new(),
        }
    }

    pub fn with_items(section: Section, items: Vec<Item>) -> Self {
        Self { section, items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// First item with exactly this display name.
    pub fn find_by_name(&self, name: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.name == name)
    }

    /// Convert to the on-disk JSON shape.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert(
            self.section.key().to_string(),
            Value::Array(
                self.items
                    .iter()
                    .map(|item| {
                        let mut obj = Map::new();
                        obj.insert("id".to_string(), Value::String(item.id.clone()));
                        obj.insert("name".to_string(), Value::String(item.name.clone()));
                        Value::Object(obj)
                    })
                    .collect(),
            ),
        );
        Value::Object(map)
    }

    /// Parse the on-disk JSON shape.
    ///
    /// Fails when the section key is missing or does not hold a list of items.
    pub fn from_json(section: Section, value: Value) -> Result<Self> {
        let Value::Object(mut map) = value else {
            return Err(Error::Validation("collection must be a JSON object".into()));
        };
        let items = map
            .remove(section.key())
            .ok_or_else(|| Error::Validation(format!("missing '{}' field", section.key())))?;
        let items: Vec<Item> = serde_json::from_value(items)?;
        Ok(Self { section, items })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_shape_uses_section_key() {
        let coll = SectionCollection::with_items(Section::Topics, vec![Item::new("1", "Экзема")]);
        assert_eq!(
            coll.to_json(),
            json!({ "topics": [ { "id": "1", "name": "Экзема" } ] })
        );
    }

    #[test]
    fn test_from_json_rejects_wrong_key() {
        let value = json!({ "tests": [] });
        assert!(SectionCollection::from_json(Section::Tasks, value).is_err());
    }

    #[test]
    fn test_from_json_rejects_non_string_id() {
        let value = json!({ "tasks": [ { "id": 1, "name": "x" } ] });
        assert!(SectionCollection::from_json(Section::Tasks, value).is_err());
    }

    #[test]
    fn test_find_by_name_returns_first_match() {
        let coll = SectionCollection::with_items(
            Section::Tests,
            vec![Item::new("1", "A"), Item::new("2", "A")],
        );
        assert_eq!(coll.find_by_name("A").map(|i| i.id.as_str()), Some("1"));
        assert!(coll.find_by_name("B").is_none());
    }
}
