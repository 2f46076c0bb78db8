//! Observed author model.
//!
//! Observed authors are the locally tracked researchers whose publications
//! the pipeline imports. They are created and maintained by the content
//! store; the pipeline only reads a snapshot at construction time.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// An institution an author has been affiliated with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Affiliation {
    /// Scopus affiliation id.
    pub id: String,

    /// Institution name.
    #[serde(default)]
    pub name: Option<String>,

    /// City of the institution.
    #[serde(default)]
    pub city: Option<String>,
}

/// A locally tracked researcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservedAuthor {
    /// Local record id.
    pub id: i64,

    /// First name.
    pub first_name: String,

    /// Last name.
    pub last_name: String,

    /// Scopus author ids associated with this author. One author may have
    /// several profiles; each id is a non-empty string.
    pub scopus_author_ids: Vec<String>,

    /// Known affiliations keyed by Scopus affiliation id.
    #[serde(default)]
    pub affiliations: HashMap<String, Affiliation>,

    /// Affiliation ids whose co-authorship causes a publication to be
    /// rejected. These reference the author's collaboration history and need
    /// not appear in the affiliation map.
    #[serde(default)]
    pub affiliation_blacklist: HashSet<String>,

    /// Topic labels assigned to this author. Imported publications inherit
    /// the union of their matched authors' topics.
    #[serde(default)]
    pub topics: Vec<String>,
}

impl ObservedAuthor {
    /// Display name in "Last, First" form.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }

    /// Whether one of this author's Scopus profiles carries the given id.
    #[must_use]
    pub fn has_scopus_id(&self, scopus_author_id: &str) -> bool {
        self.scopus_author_ids.iter().any(|id| id == scopus_author_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_author() -> ObservedAuthor {
        ObservedAuthor {
            id: 1,
            first_name: "Marie".to_string(),
            last_name: "Curie".to_string(),
            scopus_author_ids: vec!["A1".to_string(), "A2".to_string()],
            affiliations: HashMap::new(),
            affiliation_blacklist: HashSet::new(),
            topics: vec!["physics".to_string()],
        }
    }

    #[test]
    fn test_full_name() {
        assert_eq!(sample_author().full_name(), "Curie, Marie");
    }

    #[test]
    fn test_has_scopus_id() {
        let author = sample_author();
        assert!(author.has_scopus_id("A1"));
        assert!(author.has_scopus_id("A2"));
        assert!(!author.has_scopus_id("A3"));
    }

    #[test]
    fn test_deserialize_minimal() {
        // Blacklist, affiliations and topics default to empty.
        let author: ObservedAuthor = serde_json::from_str(
            r#"{"id": 7, "first_name": "A", "last_name": "B", "scopus_author_ids": ["X"]}"#,
        )
        .unwrap();
        assert_eq!(author.id, 7);
        assert!(author.affiliation_blacklist.is_empty());
        assert!(author.topics.is_empty());
    }

    #[test]
    fn test_blacklist_ids_need_not_be_known_affiliations() {
        let mut author = sample_author();
        author.affiliation_blacklist.insert("60000".to_string());
        assert!(!author.affiliations.contains_key("60000"));
        assert!(author.affiliation_blacklist.contains("60000"));
    }
}
