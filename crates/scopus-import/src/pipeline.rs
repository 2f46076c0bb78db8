//! The publication fetch pipeline.
//!
//! A fetcher should arguably only fetch, but full abstract retrievals are
//! slow and expensive, and most candidates can be dismissed on cached
//! metadata alone. The orchestrator therefore interleaves the cache and the
//! filter policy with the fetching itself: collect candidate ids per
//! observed author, drop the already-imported ones, and run every remaining
//! id through a cache-check, conditional fetch, cache-update, re-check
//! protocol before emitting it.

use async_stream::stream;
use futures::Stream;

use crate::adapter::PublicationAdapter;
use crate::cache::MetaCache;
use crate::client::ScopusApi;
use crate::config::FetcherParams;
use crate::error::ImportResult;
use crate::filter;
use crate::models::{ImportRecord, ObservedAuthor};

/// Orchestrator for one import run.
///
/// One instance drives one run: the observed-author snapshot is taken at
/// construction and the cache's load, mutate, save cycle is exclusive to
/// this run. Runs are sequential and single-threaded; there is no
/// cancellation mid-run.
pub struct PublicationFetcher<A: ScopusApi> {
    api: A,
    cache: MetaCache,
    observed_authors: Vec<ObservedAuthor>,
    params: FetcherParams,
}

impl<A: ScopusApi> PublicationFetcher<A> {
    /// Create a fetcher for one run.
    ///
    /// Validates the run parameters before any network activity.
    pub fn new(
        api: A,
        cache: MetaCache,
        observed_authors: Vec<ObservedAuthor>,
        params: FetcherParams,
    ) -> ImportResult<Self> {
        params.validate()?;
        tracing::info!(
            authors = observed_authors.len(),
            cached_entries = cache.len(),
            "Fetching publications for observed authors"
        );
        Ok(Self { api, cache, observed_authors, params })
    }

    /// The meta cache as mutated by the run so far. The caller is expected
    /// to save it once the emission stream is exhausted.
    #[must_use]
    pub fn cache(&self) -> &MetaCache {
        &self.cache
    }

    /// Consume the fetcher, handing the cache back for persistence.
    #[must_use]
    pub fn into_cache(self) -> MetaCache {
        self.cache
    }

    /// Run the pipeline, emitting one [`ImportRecord`] per accepted
    /// publication.
    ///
    /// The stream is lazy, finite and forward-only: nothing happens until it
    /// is polled, each record is produced only after its id cleared both
    /// filter checks, and the run is not restartable. Consumers should
    /// persist each record on receipt since there is no batching guarantee.
    ///
    /// A failed search page or full fetch is logged as a warning and only
    /// that unit of work is abandoned; one bad id never aborts the run.
    pub fn run(&mut self) -> impl Stream<Item = ImportRecord> + '_ {
        stream! {
            let candidates = self.collect_candidate_ids().await;
            let candidates = self.exclude_known_ids(candidates);

            for scopus_id in candidates {
                // Pre-check on whatever metadata an earlier run cached. The
                // contains call evicts expired entries, so a following get
                // only succeeds for live ones. No entry means no grounds for
                // rejection yet.
                let in_cache = self.cache.contains(&scopus_id);
                let is_valid_pre = filter::should_keep(
                    self.cache.get(&scopus_id).ok(),
                    &self.observed_authors,
                    self.params.more_recent_than,
                    self.params.apply_blacklist,
                );

                if in_cache && !is_valid_pre {
                    tracing::debug!(%scopus_id, "Rejected on cached metadata, skipping fetch");
                    continue;
                }

                let document = match self.api.retrieve_abstract(&scopus_id).await {
                    Ok(document) => document,
                    Err(error) => {
                        tracing::warn!(
                            %scopus_id,
                            %error,
                            "Could not fetch publication, skipping"
                        );
                        continue;
                    }
                };

                let adapter = PublicationAdapter::new(&document, &self.observed_authors);

                // The cache records all fetched metadata, rejected records
                // included, so future runs can skip the fetch.
                self.cache.update(&scopus_id, adapter.cache_meta());
                tracing::debug!(%scopus_id, "Updated meta cache");

                let is_valid_post = filter::should_keep(
                    self.cache.get(&scopus_id).ok(),
                    &self.observed_authors,
                    self.params.more_recent_than,
                    self.params.apply_blacklist,
                );
                if !is_valid_post {
                    continue;
                }

                let mut record = adapter.to_import_record();
                if let Some(max) = self.params.max_author_count {
                    record.authors.truncate(max);
                }
                yield record;
            }
        }
    }

    /// Candidate scopus ids for all observed authors, via the paginated
    /// AU-ID search.
    async fn collect_candidate_ids(&self) -> Vec<String> {
        let mut candidates = Vec::new();

        for author in &self.observed_authors {
            tracing::info!(
                observed_author = %author.full_name(),
                scopus_author_ids = ?author.scopus_author_ids,
                "Searching publications for observed author"
            );

            for author_id in &author.scopus_author_ids {
                let ids = self.search_ids_for_author(author_id).await;
                tracing::info!(
                    %author_id,
                    publications = ids.len(),
                    "Found publications for scopus author id"
                );
                candidates.extend(ids);
            }
        }

        candidates
    }

    /// All publication ids for one scopus author id.
    ///
    /// The search API has no "all publications of an author" endpoint, so
    /// this pages through a generic `AU-ID(<id>)` search until a page comes
    /// back smaller than the step size. A failed page warns and aborts
    /// pagination for this author id only.
    async fn search_ids_for_author(&self, author_id: &str) -> Vec<String> {
        let query = format!("AU-ID({author_id})");
        let step = self.params.step_size;
        let mut ids = Vec::new();
        let mut start = 0;

        loop {
            let page = match self.api.search(&query, start, step).await {
                Ok(page) => page,
                Err(error) => {
                    tracing::warn!(
                        %query,
                        start,
                        step,
                        %error,
                        "Search page failed, terminating id retrieval for this author id"
                    );
                    break;
                }
            };

            ids.extend(page.scopus_ids());

            if page.len() < step {
                break;
            }
            start += step;
        }

        ids
    }

    /// Drop already-imported ids and duplicates, preserving first-seen
    /// order.
    fn exclude_known_ids(&self, candidates: Vec<String>) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let remaining: Vec<String> = candidates
            .into_iter()
            .filter(|id| !self.params.exclude_ids.contains(id))
            .filter(|id| seen.insert(id.clone()))
            .collect();

        tracing::info!(
            remaining = remaining.len(),
            "Candidate ids after applying the exclude list"
        );
        remaining
    }
}
