//! Command line entry point for the Scopus import pipeline.
//!
//! Reads observed authors and already-known publication ids from a JSON
//! content file, runs the import and appends each accepted record to a JSON
//! lines output file as it is emitted.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use futures::{StreamExt, pin_mut};
use tracing_subscriber::EnvFilter;

use scopus_import::cache::MetaCache;
use scopus_import::client::ScopusClient;
use scopus_import::config::{Config, FetcherParams, default_cutoff_date};
use scopus_import::pipeline::PublicationFetcher;
use scopus_import::store::{ContentStore, FileCacheStore, JsonContentStore};

/// Import Scopus publications for a set of observed authors.
#[derive(Debug, Parser)]
#[command(name = "scopus-import", version, about)]
struct Cli {
    /// JSON file with the observed authors and already-known scopus ids.
    #[arg(long, value_name = "FILE")]
    authors_file: PathBuf,

    /// JSON lines file the imported records are appended to.
    #[arg(long, value_name = "FILE", default_value = "imported.jsonl")]
    output: PathBuf,

    /// File holding the persisted meta cache blob.
    #[arg(long, value_name = "FILE", default_value = "scopus-meta-cache.json")]
    cache_file: PathBuf,

    /// Scopus API key.
    #[arg(long, env = "SCOPUS_API_KEY")]
    api_key: Option<String>,

    /// Only import publications published on or after this date.
    #[arg(long, value_name = "YYYY-MM-DD")]
    more_recent_than: Option<NaiveDate>,

    /// Page size for the author search.
    #[arg(long, default_value_t = 100)]
    step_size: usize,

    /// Do not apply the per-author affiliation blacklists.
    #[arg(long)]
    no_blacklist: bool,

    /// Truncate the author list of each record to this many entries.
    #[arg(long, value_name = "N")]
    max_authors: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut content_store = JsonContentStore::open(&cli.authors_file, &cli.output)?;
    let observed_authors = content_store.list_observed_authors()?;
    let exclude_ids = content_store.list_known_scopus_ids()?;
    tracing::info!(
        authors = observed_authors.len(),
        known_publications = exclude_ids.len(),
        "Loaded content store"
    );

    let cache_store = FileCacheStore::new(&cli.cache_file);
    let cache = MetaCache::load(&cache_store)?;

    let client = ScopusClient::new(Config::new(cli.api_key))?;

    let params = FetcherParams {
        exclude_ids,
        step_size: cli.step_size,
        more_recent_than: cli.more_recent_than.unwrap_or_else(default_cutoff_date),
        apply_blacklist: !cli.no_blacklist,
        max_author_count: cli.max_authors,
    };

    let mut fetcher = PublicationFetcher::new(client, cache, observed_authors, params)?;

    let mut imported = 0_usize;
    {
        let records = fetcher.run();
        pin_mut!(records);
        // Each record is persisted the moment it is emitted; there is no
        // batching or transaction across the run.
        while let Some(record) = records.next().await {
            let local_id = content_store.insert(&record)?;
            tracing::info!(local_id, scopus_id = %record.scopus_id, title = %record.title, "Imported publication");
            imported += 1;
        }
    }

    let cache = fetcher.into_cache();
    cache.save(&cache_store)?;

    tracing::info!(imported, cached_entries = cache.len(), "Import run finished");
    Ok(())
}
