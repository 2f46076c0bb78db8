//! Data models for the import pipeline.
//!
//! The document models deserialize the raw Scopus REST payloads directly
//! (prefixed keys like `dc:title` and `@auid`), since fields such as the
//! author affiliation id and the EID only exist in that raw shape.

mod author;
mod document;
mod record;

pub use author::{Affiliation, ObservedAuthor};
pub use document::{
    AbstractsDocument, AffiliationRef, AuthorGroup, Coredata, DocumentAuthor, IdxTerm, IdxTerms,
    RetrievalResponse, SearchEntry, SearchResults, SearchResultsInner,
};
pub use record::{ImportRecord, RecordAuthor};
