use thiserror::Error;

use crate::describer::ResourceKey;

/// Failures surfaced by the describer tree.
#[derive(Debug, Error)]
pub enum DescribeError {
    /// Malformed tree at build time.
    #[error("invalid describer tree: {0}")]
    Config(String),

    /// A namespaced resource was described without a namespace.
    #[error("{kind} at {path} is namespaced and requires a namespace")]
    Scope { path: String, kind: String },

    /// The object store could not serve the query.
    #[error("query for {key} failed: {source}")]
    Query {
        key: ResourceKey,
        #[source]
        source: StoreError,
    },

    /// Objects came back but could not be turned into content.
    #[error("rendering {path} failed: {reason}")]
    Render { path: String, reason: String },

    #[error("not found: {0}")]
    NotFound(String),

    /// A subsystem the describer depends on is not ready.
    #[error("unavailable: {0}")]
    Unavailable(String),

    #[error("describe of {0} was cancelled")]
    Cancelled(String),
}

impl DescribeError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// HTTP-equivalent status for handler layers.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Config(_) | Self::Render { .. } => 500,
            Self::Scope { .. } => 400,
            Self::Query { .. } => 502,
            Self::NotFound(_) => 404,
            Self::Unavailable(_) => 503,
            Self::Cancelled(_) => 499,
        }
    }
}

/// Failures raised by an [`ObjectStore`](crate::store::ObjectStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("discovery failed for {kind}: {reason}")]
    Discovery { kind: String, reason: String },

    #[error("{0}")]
    Backend(String),
}

pub type Result<T, E = DescribeError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(DescribeError::config("x").status_code(), 500);
        assert_eq!(DescribeError::NotFound("/x".into()).status_code(), 404);
        assert_eq!(DescribeError::Unavailable("pf".into()).status_code(), 503);
        let scope = DescribeError::Scope {
            path: "/rbac/roles".into(),
            kind: "Role".into(),
        };
        assert_eq!(scope.status_code(), 400);
        assert_eq!(
            scope.to_string(),
            "Role at /rbac/roles is namespaced and requires a namespace"
        );
    }

    #[test]
    fn query_error_names_the_key() {
        let err = DescribeError::Query {
            key: ResourceKey::new("rbac.authorization.k8s.io/v1", "ClusterRole"),
            source: StoreError::Backend("boom".into()),
        };
        assert_eq!(
            err.to_string(),
            "query for rbac.authorization.k8s.io/v1/ClusterRole failed: boom"
        );
        assert_eq!(err.status_code(), 502);
    }
}
