use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Text keyed by language name, e.g. `{"English": "How did we do?"}`.
///
/// The API sometimes sends a bare string instead; it is stored under
/// `English`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Repr")]
pub struct LocalizedText(pub BTreeMap<String, String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum Repr {
    Map(BTreeMap<String, String>),
    Text(String),
    // PHP-style empty arrays show up for untitled items.
    Empty(Vec<String>),
}

impl From<Repr> for LocalizedText {
    fn from(repr: Repr) -> Self {
        match repr {
            Repr::Map(map) => LocalizedText(map),
            Repr::Text(text) => LocalizedText(BTreeMap::from([("English".to_string(), text)])),
            Repr::Empty(_) => LocalizedText::default(),
        }
    }
}

impl LocalizedText {
    /// The text in `language`, if present.
    pub fn get(&self, language: &str) -> Option<&str> {
        self.0.get(language).map(String::as_str)
    }

    /// The English text, if present.
    pub fn english(&self) -> Option<&str> {
        self.get("English")
    }
}
