//! Raw Scopus payload models.
//!
//! These deserialize the abstract-retrieval and search response documents as
//! the API actually sends them, prefixed keys and all. The affiliation id of
//! a publication author and the EID have no cleaner surface than this raw
//! shape, so the adapter is built on these models rather than on a wrapped
//! accessor API.

use serde::{Deserialize, Deserializer, Serialize};

/// Prefix the API puts in front of scopus ids in `dc:identifier` fields.
const SCOPUS_ID_PREFIX: &str = "SCOPUS_ID:";

/// A full abstract-retrieval response for one publication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbstractsDocument {
    /// The response envelope.
    #[serde(rename = "abstracts-retrieval-response")]
    pub response: RetrievalResponse,
}

impl AbstractsDocument {
    /// Shorthand for the coredata block.
    #[must_use]
    pub const fn coredata(&self) -> &Coredata {
        &self.response.coredata
    }

    /// All author entries of the publication in original order. Empty if the
    /// response carries no author group.
    #[must_use]
    pub fn authors(&self) -> &[DocumentAuthor] {
        self.response.authors.as_ref().map_or(&[], |group| group.author.as_slice())
    }

    /// Index terms ("tags") if the response carries any.
    #[must_use]
    pub fn index_terms(&self) -> Vec<String> {
        let Some(idxterms) = &self.response.idxterms else {
            return Vec::new();
        };
        idxterms.mainterm.iter().filter_map(|term| term.value.clone()).collect()
    }
}

/// The `abstracts-retrieval-response` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResponse {
    /// Bibliographic core fields.
    pub coredata: Coredata,

    /// Author group; absent for some records.
    #[serde(default)]
    pub authors: Option<AuthorGroup>,

    /// Index terms; absent for most records.
    #[serde(default)]
    pub idxterms: Option<IdxTerms>,
}

/// The `coredata` block of an abstract-retrieval response.
///
/// Every field is optional; the adapter coerces missing values to empty
/// strings when building the import record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Coredata {
    /// Publication title.
    #[serde(rename = "dc:title", default)]
    pub title: Option<String>,

    /// Abstract / short description.
    #[serde(rename = "dc:description", default)]
    pub description: Option<String>,

    /// Publication date in ISO format (YYYY-MM-DD).
    #[serde(rename = "prism:coverDate", default)]
    pub cover_date: Option<String>,

    /// Identifier in `SCOPUS_ID:<id>` form.
    #[serde(rename = "dc:identifier", default)]
    pub identifier: Option<String>,

    /// Digital Object Identifier.
    #[serde(rename = "prism:doi", default)]
    pub doi: Option<String>,

    /// Electronic identifier. Only present in the raw payload.
    #[serde(default)]
    pub eid: Option<String>,

    /// Name of the journal or other publication venue.
    #[serde(rename = "prism:publicationName", default)]
    pub publication_name: Option<String>,

    /// Journal volume. The API sends this as string or number.
    #[serde(rename = "prism:volume", default, deserialize_with = "opt_string_or_number")]
    pub volume: Option<String>,

    /// ISSN of the journal.
    #[serde(rename = "prism:issn", default)]
    pub issn: Option<String>,
}

impl Coredata {
    /// The bare scopus id, stripped of the `SCOPUS_ID:` prefix.
    #[must_use]
    pub fn scopus_id(&self) -> Option<&str> {
        let identifier = self.identifier.as_deref()?;
        Some(identifier.strip_prefix(SCOPUS_ID_PREFIX).unwrap_or(identifier))
    }
}

/// The `authors` block of an abstract-retrieval response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorGroup {
    /// Author entries in original publication order.
    #[serde(default)]
    pub author: Vec<DocumentAuthor>,
}

/// One author entry of a publication document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentAuthor {
    /// Scopus author id.
    #[serde(rename = "@auid")]
    pub auid: String,

    /// Indexed display name ("Curie M.").
    #[serde(rename = "ce:indexed-name", default)]
    pub indexed_name: Option<String>,

    /// Affiliation reference. Not supplied for every author.
    #[serde(default)]
    pub affiliation: Option<AffiliationRef>,
}

impl DocumentAuthor {
    /// The affiliation id for this author on this publication, if supplied.
    #[must_use]
    pub fn affiliation_id(&self) -> Option<&str> {
        self.affiliation.as_ref()?.id.as_deref()
    }
}

/// The `affiliation` sub-object of an author entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffiliationRef {
    /// Scopus affiliation id.
    #[serde(rename = "@id", default)]
    pub id: Option<String>,
}

/// The `idxterms` block of an abstract-retrieval response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdxTerms {
    /// Main terms; the API sends one object or a list.
    #[serde(default, deserialize_with = "one_or_many")]
    pub mainterm: Vec<IdxTerm>,
}

/// One index term.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdxTerm {
    /// The term text.
    #[serde(rename = "$", default)]
    pub value: Option<String>,
}

/// A publication search response (`AU-ID` query).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    /// The response envelope.
    #[serde(rename = "search-results")]
    pub results: SearchResultsInner,
}

impl SearchResults {
    /// Scopus ids of all entries on this result page, skipping entries
    /// without a usable identifier.
    #[must_use]
    pub fn scopus_ids(&self) -> Vec<String> {
        self.results
            .entry
            .iter()
            .filter_map(|entry| entry.scopus_id().map(str::to_string))
            .collect()
    }

    /// Number of entries on this result page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.entry.len()
    }

    /// Whether the result page is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.entry.is_empty()
    }
}

/// The `search-results` envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResultsInner {
    /// Result entries for this page.
    #[serde(default)]
    pub entry: Vec<SearchEntry>,
}

/// One search result entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchEntry {
    /// Identifier in `SCOPUS_ID:<id>` form.
    #[serde(rename = "dc:identifier", default)]
    pub identifier: Option<String>,
}

impl SearchEntry {
    /// The bare scopus id, stripped of the `SCOPUS_ID:` prefix.
    #[must_use]
    pub fn scopus_id(&self) -> Option<&str> {
        let identifier = self.identifier.as_deref()?;
        Some(identifier.strip_prefix(SCOPUS_ID_PREFIX).unwrap_or(identifier))
    }
}

/// Accept a JSON string or number, yielding the string form.
fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Accept a single JSON object or a list of them.
fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        One(T),
        Many(Vec<T>),
    }

    Ok(match OneOrMany::<T>::deserialize(deserializer)? {
        OneOrMany::One(one) => vec![one],
        OneOrMany::Many(many) => many,
    })
}
