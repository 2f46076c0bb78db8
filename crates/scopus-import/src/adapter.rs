//! Adapter from a raw Scopus publication document to the import record.
//!
//! Wraps one [`AbstractsDocument`] together with the observed-author
//! snapshot and derives everything the content store and the meta cache
//! need: the normalized author list, the matched observed authors, the
//! derived topic and tag lists and finally the full [`ImportRecord`].

use std::collections::{HashMap, HashSet};

use crate::cache::CacheMeta;
use crate::models::{AbstractsDocument, ImportRecord, ObservedAuthor, RecordAuthor};

/// Adapter over one fetched publication document.
///
/// The author list and the matched-observed-author map are computed once at
/// construction; the other accessors re-derive from the raw document on
/// every call.
pub struct PublicationAdapter<'a> {
    document: &'a AbstractsDocument,
    authors: Vec<RecordAuthor>,
    matched: Vec<(String, &'a ObservedAuthor)>,
}

impl<'a> PublicationAdapter<'a> {
    /// Build the adapter over a document and the observed-author snapshot.
    #[must_use]
    pub fn new(document: &'a AbstractsDocument, observed_authors: &'a [ObservedAuthor]) -> Self {
        let authors = Self::collect_authors(document);
        let matched = Self::match_observed_authors(&authors, observed_authors);
        Self { document, authors, matched }
    }

    /// Every author position of the publication in original order. Authors
    /// without affiliation information appear without an affiliation id.
    #[must_use]
    pub fn authors(&self) -> &[RecordAuthor] {
        &self.authors
    }

    /// The observed authors that participated on this publication, keyed by
    /// the scopus author id they matched on. First match wins; uniqueness of
    /// scopus author ids across observed authors is assumed, not enforced.
    #[must_use]
    pub fn matched_observed_authors(&self) -> &[(String, &'a ObservedAuthor)] {
        &self.matched
    }

    /// Local ids of the matched observed authors, deduplicated.
    #[must_use]
    pub fn observed_author_ids(&self) -> Vec<i64> {
        let mut seen = HashSet::new();
        self.matched.iter().map(|(_, author)| author.id).filter(|id| seen.insert(*id)).collect()
    }

    /// Union of the matched observed authors' topics, deduplicated. Order is
    /// not significant.
    #[must_use]
    pub fn topics(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.matched
            .iter()
            .flat_map(|(_, author)| author.topics.iter())
            .filter(|topic| seen.insert(topic.to_string()))
            .cloned()
            .collect()
    }

    /// Tags from the publication's index terms; empty if the document
    /// carries none.
    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        self.document.index_terms()
    }

    /// Scopus author id to affiliation id for the authors that carry
    /// affiliation information. Partial: authors without one are omitted.
    #[must_use]
    pub fn author_affiliations(&self) -> HashMap<String, String> {
        self.authors
            .iter()
            .filter_map(|author| {
                author
                    .affiliation_id
                    .as_ref()
                    .map(|affiliation| (author.scopus_author_id.clone(), affiliation.clone()))
            })
            .collect()
    }

    /// Publication date, empty string if the document carries none.
    #[must_use]
    pub fn publish_date(&self) -> String {
        self.document.coredata().cover_date.clone().unwrap_or_default()
    }

    /// The metadata the orchestrator writes into the meta cache.
    #[must_use]
    pub fn cache_meta(&self) -> CacheMeta {
        CacheMeta {
            publish_date: self.publish_date(),
            author_affiliations: self.author_affiliations(),
            observed_author_ids: self.observed_author_ids(),
        }
    }

    /// Assemble the full normalized import record.
    #[must_use]
    pub fn to_import_record(&self) -> ImportRecord {
        let coredata = self.document.coredata();
        ImportRecord {
            title: coredata.title.clone().unwrap_or_default(),
            r#abstract: coredata.description.clone().unwrap_or_default(),
            publish_date: self.publish_date(),
            scopus_id: coredata.scopus_id().unwrap_or_default().to_string(),
            doi: coredata.doi.clone().unwrap_or_default(),
            eid: coredata.eid.clone().unwrap_or_default(),
            issn: coredata.issn.clone().unwrap_or_default(),
            journal: coredata.publication_name.clone().unwrap_or_default(),
            volume: coredata.volume.clone().unwrap_or_default(),
            authors: self.authors.clone(),
            author_count: self.authors.len(),
            tags: self.tags(),
            topics: self.topics(),
            observed_author_ids: self.observed_author_ids(),
        }
    }

    fn collect_authors(document: &AbstractsDocument) -> Vec<RecordAuthor> {
        document
            .authors()
            .iter()
            .map(|author| RecordAuthor {
                scopus_author_id: author.auid.clone(),
                indexed_name: author.indexed_name.clone().unwrap_or_default(),
                affiliation_id: author.affiliation_id().map(str::to_string),
            })
            .collect()
    }

    /// For each author position, linearly scan the observed authors for the
    /// first one whose scopus id set contains the position's author id.
    fn match_observed_authors(
        authors: &[RecordAuthor],
        observed_authors: &'a [ObservedAuthor],
    ) -> Vec<(String, &'a ObservedAuthor)> {
        let mut matched: Vec<(String, &'a ObservedAuthor)> = Vec::new();
        for record_author in authors {
            let scopus_author_id = record_author.scopus_author_id.as_str();
            if matched.iter().any(|(id, _)| id == scopus_author_id) {
                continue;
            }
            if let Some(author) =
                observed_authors.iter().find(|author| author.has_scopus_id(scopus_author_id))
            {
                matched.push((scopus_author_id.to_string(), author));
            }
        }
        matched
    }
}
