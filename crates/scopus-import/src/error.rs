//! Error types for the Scopus import pipeline.
//!
//! Uses `thiserror` for structured error handling with automatic `From`
//! implementations. Each layer has its own enum: `ClientError` for the HTTP
//! client, `CacheError` for the meta cache, `ImportError` for the pipeline.

/// Errors from the HTTP client layer.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Middleware error
    #[error("Middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// Missing or rejected API key (401/403 response)
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Error message from API
        message: String,
    },

    /// Rate limited by the Scopus API (429 response)
    #[error("Rate limited by the Scopus API")]
    RateLimited,

    /// Resource not found (404 response)
    #[error("Resource not found: {resource}")]
    NotFound {
        /// Description of the missing resource
        resource: String,
    },

    /// Invalid request parameters (400 response)
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message from API
        message: String,
    },

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Server error (5xx response)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },
}

impl ClientError {
    /// Create an unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized { message: message.into() }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    /// Create a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into() }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }
}

/// Errors from the publication meta cache.
#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    /// `get` was called for a scopus id without a cache entry. Callers are
    /// expected to check `contains` first; this failing loudly indicates a
    /// caller bug, not missing data.
    #[error("No cache entry for scopus id {scopus_id}")]
    NotFound {
        /// The scopus id that was looked up
        scopus_id: String,
    },

    /// The persisted cache blob could not be read or written.
    #[error("Cache persistence error: {0}")]
    Persistence(String),

    /// The persisted cache blob could not be (de)serialized.
    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CacheError {
    /// Create a not found error for a scopus id.
    #[must_use]
    pub fn not_found(scopus_id: impl Into<String>) -> Self {
        Self::NotFound { scopus_id: scopus_id.into() }
    }

    /// Create a persistence error.
    #[must_use]
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }
}

/// Errors from the import pipeline and its collaborators.
#[derive(thiserror::Error, Debug)]
pub enum ImportError {
    /// Run parameter validation failed (before any network activity)
    #[error("Validation error for '{field}': {message}")]
    Validation {
        /// Parameter that failed validation
        field: String,
        /// Validation error message
        message: String,
    },

    /// Error from the API client
    #[error("API error: {0}")]
    Client(#[from] ClientError),

    /// Error from the meta cache
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Error from the content store collaborator
    #[error("Store error: {0}")]
    Store(String),
}

impl ImportError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    /// Create a store error.
    #[must_use]
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Result type alias for pipeline operations.
pub type ImportResult<T> = Result<T, ImportError>;
