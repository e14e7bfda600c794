// src/entity/note.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque note identifier. Assigned once by the store and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of ids generated from the clock, if this is one.
    pub(crate) fn as_millis(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

impl std::fmt::Display for NoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A single note. `content` is authoritative; `title` is derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    #[serde(rename = "lastModified")]
    pub last_modified: DateTime<Utc>,
}

impl Note {
    pub fn new(id: NoteId, title: String, content: String, last_modified: DateTime<Utc>) -> Self {
        Self {
            id,
            title,
            content,
            last_modified,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_serializes_with_camel_case_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let note = Note::new(
            NoteId::new("1714979289000"),
            "Groceries".to_string(),
            "Groceries\nmilk".to_string(),
            at,
        );

        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["id"], "1714979289000");
        assert_eq!(json["title"], "Groceries");
        assert_eq!(json["lastModified"], "2024-05-06T07:08:09Z");
        assert!(json.get("last_modified").is_none());
    }

    #[test]
    fn test_numeric_ids() {
        assert_eq!(NoteId::new("42").as_millis(), Some(42));
        assert_eq!(NoteId::new("abc").as_millis(), None);
    }
}
