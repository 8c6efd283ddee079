//! Failure kinds for catalog retrieval
//!
//! Every failure carries owned strings so the error is `Clone`: a single
//! failed request may be observed by several waiters sharing the same
//! in-flight fetch.

use serde::Serialize;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogError {
    /// Transport error, or a non-2xx status other than 404.
    #[error("Network failure fetching {url}: {reason}")]
    NetworkFailure { url: String, reason: String },

    /// The entity or category does not exist (HTTP 404).
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// A resource url is missing the expected numeric id segment.
    #[error("Malformed id in url: {url}")]
    MalformedId { url: String },

    /// A 2xx body that does not match the expected JSON shape.
    #[error("Failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

impl CatalogError {
    pub fn network(url: impl Into<String>, reason: impl ToString) -> Self {
        CatalogError::NetworkFailure {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        CatalogError::NotFound {
            resource: resource.into(),
        }
    }

    pub fn decode(url: impl Into<String>, reason: impl ToString) -> Self {
        CatalogError::Decode {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = CatalogError::not_found("pokemon/missingno");
        assert_eq!(err.to_string(), "Not found: pokemon/missingno");

        let err = CatalogError::MalformedId {
            url: "https://pokeapi.co/api/v2/pokemon/abc/".to_string(),
        };
        assert!(err.to_string().contains("pokemon/abc/"));
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let err = CatalogError::network("https://example.com", "HTTP 500");
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["kind"], "network_failure");
        assert_eq!(json["reason"], "HTTP 500");
    }
}
