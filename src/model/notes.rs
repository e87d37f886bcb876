//! Free-form notes document.

use serde::{Deserialize, Serialize};

/// The notebook: one text document persisted under its own key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notes {
    pub content: String,
    #[serde(default)]
    pub updated_at: i64,
}

impl Notes {
    pub const STORAGE_KEY: &'static str = "macrum.notes";

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Append `text` as a new paragraph.
    pub fn append(&mut self, text: &str) {
        if !self.content.is_empty() && !self.content.ends_with('\n') {
            self.content.push('\n');
        }
        self.content.push_str(text);
    }
}
