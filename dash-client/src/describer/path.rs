use crate::error::{DescribeError, Result};

pub const ROOT_PATH: &str = "/";

/// A path starts with `/`; apart from the root it has no trailing slash and
/// no empty segments.
pub fn validate_path(path: &str) -> Result<()> {
    if path == ROOT_PATH {
        return Ok(());
    }
    let Some(rest) = path.strip_prefix('/') else {
        return Err(DescribeError::config(format!(
            "path {path:?} must start with '/'"
        )));
    };
    if rest.split('/').any(str::is_empty) {
        return Err(DescribeError::config(format!(
            "path {path:?} has an empty segment"
        )));
    }
    Ok(())
}

/// True when `path` equals `prefix` or lies below it on a segment boundary.
pub fn has_path_prefix(path: &str, prefix: &str) -> bool {
    if prefix == ROOT_PATH {
        return path.starts_with('/');
    }
    match path.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => rest.starts_with('/'),
        None => false,
    }
}

/// True when `child` lies strictly below `parent`.
pub fn is_nested_under(parent: &str, child: &str) -> bool {
    child != parent && has_path_prefix(child, parent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_shape() {
        assert!(validate_path("/").is_ok());
        assert!(validate_path("/rbac/cluster-roles").is_ok());
        assert!(validate_path("rbac").is_err());
        assert!(validate_path("/rbac/").is_err());
        assert!(validate_path("//rbac").is_err());
        assert!(validate_path("").is_err());
    }

    #[test]
    fn prefixes_respect_segments() {
        assert!(has_path_prefix("/rbac/cluster-roles", "/rbac"));
        assert!(has_path_prefix("/rbac", "/rbac"));
        assert!(has_path_prefix("/anything", "/"));
        assert!(!has_path_prefix("/rbacx", "/rbac"));
        assert!(!has_path_prefix("/portforward", "/rbac"));
    }

    #[test]
    fn nesting_is_strict() {
        assert!(is_nested_under("/", "/rbac"));
        assert!(is_nested_under("/rbac", "/rbac/roles"));
        assert!(!is_nested_under("/rbac", "/rbac"));
        assert!(!is_nested_under("/rbac", "/portforward"));
        assert!(!is_nested_under("/", "/"));
    }
}
