//! Normalized import record.
//!
//! The unit the pipeline emits and the content store persists. All external
//! string fields are coerced to empty strings when the source document does
//! not carry them.

use serde::{Deserialize, Serialize};

/// One author position of an imported publication.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordAuthor {
    /// Scopus author id.
    pub scopus_author_id: String,

    /// Indexed display name.
    pub indexed_name: String,

    /// Scopus affiliation id for this author on this publication. Not every
    /// author carries affiliation information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliation_id: Option<String>,
}

/// A normalized publication ready for insertion into the content store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportRecord {
    /// Publication title.
    pub title: String,

    /// Abstract / short description.
    pub r#abstract: String,

    /// Publication date in ISO format (YYYY-MM-DD).
    pub publish_date: String,

    /// Scopus publication id.
    pub scopus_id: String,

    /// Digital Object Identifier.
    pub doi: String,

    /// Electronic identifier.
    pub eid: String,

    /// ISSN of the journal.
    pub issn: String,

    /// Journal name.
    pub journal: String,

    /// Journal volume.
    pub volume: String,

    /// Author list in original publication order, possibly truncated by the
    /// pipeline's `max_author_count` parameter.
    #[serde(default)]
    pub authors: Vec<RecordAuthor>,

    /// Total number of authors on the publication. Reflects the full list
    /// even when `authors` has been truncated.
    pub author_count: usize,

    /// Tags derived from the publication's index terms.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Union of the matched observed authors' topics.
    #[serde(default)]
    pub topics: Vec<String>,

    /// Local ids of the observed authors matched against this publication.
    #[serde(default)]
    pub observed_author_ids: Vec<i64>,
}
