//! Scopus publication import pipeline.
//!
//! Periodically imports publication records for a set of observed authors
//! from the Scopus bibliographic database: paginated author search, a
//! time-limited metadata cache to skip expensive re-fetches, multi-stage
//! filtering (affiliation blacklist, recency cutoff) and normalized import
//! records as output.
//!
//! # Example
//!
//! ```no_run
//! use futures::{StreamExt, pin_mut};
//! use scopus_import::cache::MetaCache;
//! use scopus_import::client::ScopusClient;
//! use scopus_import::config::{Config, FetcherParams};
//! use scopus_import::pipeline::PublicationFetcher;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ScopusClient::new(Config::from_env()?)?;
//!     let mut fetcher = PublicationFetcher::new(
//!         client,
//!         MetaCache::new(),
//!         vec![], // observed authors from the content store
//!         FetcherParams::default(),
//!     )?;
//!
//!     let records = fetcher.run();
//!     pin_mut!(records);
//!     while let Some(record) = records.next().await {
//!         println!("{}", record.title);
//!     }
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod pipeline;
pub mod store;

pub use cache::{CacheEntry, CacheMeta, MetaCache};
pub use client::{ScopusApi, ScopusClient};
pub use config::{Config, FetcherParams};
pub use error::{CacheError, ClientError, ImportError};
pub use models::{ImportRecord, ObservedAuthor};
pub use pipeline::PublicationFetcher;
