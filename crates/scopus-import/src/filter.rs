//! Pure decision policy for candidate publications.
//!
//! Given the cached metadata of a publication and the run parameters, decide
//! whether it is worth fetching or keeping. No side effects beyond logging.

use chrono::NaiveDate;

use crate::cache::CacheEntry;
use crate::models::ObservedAuthor;

/// Whether any author-affiliation pair of the publication hits an observed
/// author's blacklist.
///
/// For each `(scopus_author_id, affiliation_id)` pair in the entry, the
/// matching observed author is the one whose scopus id set contains the
/// author id and whose local id appears in the entry's matched author list.
/// Any single blacklisted pair rejects the whole publication; the scan
/// short-circuits on the first hit.
#[must_use]
pub fn is_blacklisted(entry: &CacheEntry, observed_authors: &[ObservedAuthor]) -> bool {
    let matched: Vec<&ObservedAuthor> = observed_authors
        .iter()
        .filter(|author| entry.observed_author_ids.contains(&author.id))
        .collect();

    for (scopus_author_id, affiliation_id) in &entry.author_affiliations {
        for author in &matched {
            if author.has_scopus_id(scopus_author_id)
                && author.affiliation_blacklist.contains(affiliation_id)
            {
                tracing::debug!(
                    %scopus_author_id,
                    %affiliation_id,
                    observed_author = %author.full_name(),
                    "Publication blacklisted by author affiliation"
                );
                return true;
            }
        }
    }
    false
}

/// Whether the publication predates the cutoff.
///
/// Strictly greater-than: a publication dated exactly on the cutoff is kept.
/// An unparseable publish date is logged and treated as recent enough, since
/// missing metadata is not by itself a rejection reason.
#[must_use]
pub fn is_too_old(entry: &CacheEntry, cutoff_date: NaiveDate) -> bool {
    match NaiveDate::parse_from_str(&entry.publish_date, "%Y-%m-%d") {
        Ok(publish_date) => cutoff_date > publish_date,
        Err(_) => {
            tracing::debug!(
                publish_date = %entry.publish_date,
                "Unparseable publish date, keeping publication"
            );
            false
        }
    }
}

/// Combined keep/reject decision for a candidate publication.
///
/// `None` means no cached metadata exists; the publication is kept
/// unconditionally so the pipeline proceeds to the full fetch.
#[must_use]
pub fn should_keep(
    entry: Option<&CacheEntry>,
    observed_authors: &[ObservedAuthor],
    cutoff_date: NaiveDate,
    apply_blacklist: bool,
) -> bool {
    let Some(entry) = entry else {
        return true;
    };
    if apply_blacklist && is_blacklisted(entry, observed_authors) {
        return false;
    }
    !is_too_old(entry, cutoff_date)
}
