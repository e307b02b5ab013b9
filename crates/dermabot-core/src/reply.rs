//! Outbound responses.

use serde::{Deserialize, Serialize};

/// A text response plus the labels the user can pick next.
///
/// The keyboard is a list of rows; transports render it however they can.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    #[serde(default)]
    pub keyboard: Vec<Vec<String>>,
}

impl Reply {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: Vec::new(),
        }
    }

    /// Attach a keyboard with one button per row.
    pub fn with_buttons<I, S>(mut self, buttons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keyboard = buttons.into_iter().map(|b| vec![b.into()]).collect();
        self
    }

    /// All selectable labels, flattened.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.keyboard.iter().flatten().map(String::as_str)
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels().any(|l| l == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_buttons_one_per_row() {
        let reply = Reply::new("hi").with_buttons(["a", "b"]);
        assert_eq!(reply.keyboard, vec![vec!["a".to_string()], vec!["b".to_string()]]);
        assert!(reply.has_label("b"));
        assert!(!reply.has_label("c"));
    }
}
