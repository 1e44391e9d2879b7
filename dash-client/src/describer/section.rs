use std::collections::HashSet;

use tracing::debug;

use super::{has_path_prefix, is_nested_under, validate_path, DescribeContext, Describer};
use crate::content::Content;
use crate::error::{DescribeError, Result};

/// Interior node: a titled path whose children are described in order.
#[derive(Debug)]
pub struct SectionDescriber {
    path: String,
    title: String,
    children: Vec<Describer>,
}

impl SectionDescriber {
    /// Fails when a child escapes this section's path, when one sibling's
    /// path lies under another's, or when a path repeats anywhere in the
    /// subtree.
    pub fn new(
        path: impl Into<String>,
        title: impl Into<String>,
        children: Vec<Describer>,
    ) -> Result<Self> {
        let path = path.into();
        validate_path(&path)?;

        let mut seen: HashSet<&str> = HashSet::from([path.as_str()]);
        for (i, child) in children.iter().enumerate() {
            if !is_nested_under(&path, child.path()) {
                return Err(DescribeError::config(format!(
                    "{} is not nested under section {}",
                    child.path(),
                    path
                )));
            }
            if let Some(sibling) = children[..i].iter().find(|sibling| {
                has_path_prefix(child.path(), sibling.path())
                    || has_path_prefix(sibling.path(), child.path())
            }) {
                return Err(DescribeError::config(format!(
                    "{} overlaps sibling {} in section {}",
                    child.path(),
                    sibling.path(),
                    path
                )));
            }
            for node in child.walk() {
                if !seen.insert(node.path()) {
                    return Err(DescribeError::config(format!(
                        "duplicate path {} in section {}",
                        node.path(),
                        path
                    )));
                }
            }
        }

        Ok(Self {
            path,
            title: title.into(),
            children,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn children(&self) -> &[Describer] {
        &self.children
    }

    /// Children run one after another; the first failure aborts the rest.
    #[tracing::instrument(skip_all, fields(path = %self.path, children = self.children.len()))]
    pub(crate) async fn describe(&self, ctx: &DescribeContext<'_>) -> Result<Content> {
        let child_ctx = ctx.for_children();
        let mut contents = Vec::with_capacity(self.children.len());

        for child in &self.children {
            if ctx.cancellation().is_cancelled() {
                return Err(DescribeError::Cancelled(self.path.clone()));
            }
            debug!(child = child.path(), "describing child");
            contents.push(child.describe(&child_ctx).await?);
        }

        Ok(Content::Section {
            path: self.path.clone(),
            title: self.title.clone(),
            children: contents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::describer::testing::{cancel_soon, cluster_role, rbac_key, FakeStore};
    use crate::describer::{PortForwardDescriber, ResourceDescriber, ResourceOptions};

    fn leaf(path: &str, kind: &str) -> Describer {
        ResourceDescriber::new(ResourceOptions {
            path: path.into(),
            key: rbac_key(kind),
            list_title: format!("{kind}s"),
            object_title: kind.into(),
            cluster_wide: true,
        })
        .unwrap()
        .into()
    }

    #[test]
    fn rejects_children_outside_the_prefix() {
        let err = SectionDescriber::new("/rbac", "RBAC", vec![leaf("/other/roles", "Role")])
            .unwrap_err();
        assert!(matches!(err, DescribeError::Config(_)));

        let err = SectionDescriber::new("/rbac", "RBAC", vec![leaf("/rbacx", "Role")]).unwrap_err();
        assert!(matches!(err, DescribeError::Config(_)));
    }

    #[test]
    fn rejects_duplicate_paths_across_levels() {
        let err = SectionDescriber::new(
            "/rbac",
            "RBAC",
            vec![leaf("/rbac/a", "Role"), leaf("/rbac/a", "RoleBinding")],
        )
        .unwrap_err();
        assert!(matches!(err, DescribeError::Config(_)));

        let nested = SectionDescriber::new("/rbac/a", "A", vec![leaf("/rbac/a/b", "Role")]).unwrap();
        let err = SectionDescriber::new(
            "/rbac",
            "RBAC",
            vec![nested.into(), leaf("/rbac/a/b", "RoleBinding")],
        )
        .unwrap_err();
        assert!(matches!(err, DescribeError::Config(_)));
    }

    #[test]
    fn rejects_siblings_nested_in_each_other() {
        let deep = SectionDescriber::new("/a", "A", vec![leaf("/a/b/c", "Role")]).unwrap();
        let err = SectionDescriber::new("/", "Root", vec![deep.into(), leaf("/a/b", "RoleBinding")])
            .unwrap_err();
        assert!(matches!(err, DescribeError::Config(_)));

        let err = SectionDescriber::new(
            "/rbac",
            "RBAC",
            vec![leaf("/rbac/roles/x", "Role"), leaf("/rbac/roles", "RoleBinding")],
        )
        .unwrap_err();
        assert!(matches!(err, DescribeError::Config(_)));

        // segment-aware: /rbac/roles and /rbac/roles-x are disjoint
        SectionDescriber::new(
            "/rbac",
            "RBAC",
            vec![leaf("/rbac/roles", "Role"), leaf("/rbac/roles-x", "RoleBinding")],
        )
        .unwrap();
    }

    #[test]
    fn every_walked_path_resolves_to_itself() {
        let deep = SectionDescriber::new("/a", "A", vec![leaf("/a/b/c", "Role")]).unwrap();
        let root: Describer =
            SectionDescriber::new("/", "Root", vec![deep.into(), leaf("/ab", "RoleBinding")])
                .unwrap()
                .into();

        for node in root.walk() {
            let found = root.resolve(node.path()).unwrap();
            assert_eq!(found.path(), node.path());
        }
    }

    #[test]
    fn rejects_child_equal_to_parent() {
        let err = SectionDescriber::new("/rbac", "RBAC", vec![leaf("/rbac", "Role")]).unwrap_err();
        assert!(matches!(err, DescribeError::Config(_)));
    }

    #[tokio::test]
    async fn empty_section_is_an_empty_composite() {
        let store = FakeStore::default();
        let section = SectionDescriber::new("/empty", "Empty", vec![]).unwrap();

        let content = section.describe(&DescribeContext::new(&store)).await.unwrap();

        assert_eq!(content.title(), "Empty");
        assert!(content.children().is_empty());
    }

    #[tokio::test]
    async fn preserves_declared_order() {
        let store = FakeStore::default()
            .with_objects("C", vec![cluster_role("c")])
            .with_objects("A", vec![cluster_role("a")]);
        let section = SectionDescriber::new(
            "/s",
            "S",
            vec![leaf("/s/c", "C"), leaf("/s/a", "A"), leaf("/s/b", "B")],
        )
        .unwrap();

        let content = section.describe(&DescribeContext::new(&store)).await.unwrap();

        let order: Vec<&str> = content.children().iter().map(Content::path).collect();
        assert_eq!(order, vec!["/s/c", "/s/a", "/s/b"]);
        let queried: Vec<String> = store.recorded().into_iter().map(|(k, _)| k.kind).collect();
        assert_eq!(queried, vec!["C", "A", "B"]);
    }

    #[tokio::test]
    async fn first_failure_aborts_remaining_children() {
        let store = FakeStore::default().failing_for("B");
        let section = SectionDescriber::new(
            "/s",
            "S",
            vec![leaf("/s/a", "A"), leaf("/s/b", "B"), leaf("/s/c", "C")],
        )
        .unwrap();

        let err = section
            .describe(&DescribeContext::new(&store))
            .await
            .unwrap_err();

        assert!(matches!(err, DescribeError::Query { .. }));
        let queried: Vec<String> = store.recorded().into_iter().map(|(k, _)| k.kind).collect();
        assert_eq!(queried, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn unavailable_child_fails_the_section() {
        let store = FakeStore::default();
        let section = SectionDescriber::new(
            "/",
            "Root",
            vec![leaf("/a", "A"), PortForwardDescriber::new().into()],
        )
        .unwrap();

        let err = section
            .describe(&DescribeContext::new(&store))
            .await
            .unwrap_err();
        assert!(matches!(err, DescribeError::Unavailable(_)));
    }

    #[tokio::test]
    async fn cancelled_before_first_child_queries_nothing() {
        let store = FakeStore::default();
        let section = SectionDescriber::new("/s", "S", vec![leaf("/s/a", "A")]).unwrap();
        let cancel = tokio_util::sync::CancellationToken::new();
        cancel.cancel();

        let err = section
            .describe(&DescribeContext::new(&store).with_cancellation(cancel))
            .await
            .unwrap_err();

        assert!(matches!(err, DescribeError::Cancelled(_)));
        assert!(store.recorded().is_empty());
    }

    #[tokio::test]
    async fn cancellation_mid_child_skips_later_siblings() {
        let store = FakeStore::default().stalling_for("A");
        let section = SectionDescriber::new(
            "/s",
            "S",
            vec![leaf("/s/a", "A"), leaf("/s/b", "B"), leaf("/s/c", "C")],
        )
        .unwrap();
        let cancel = tokio_util::sync::CancellationToken::new();
        let ctx = DescribeContext::new(&store).with_cancellation(cancel.clone());
        cancel_soon(&cancel);

        let err = section.describe(&ctx).await.unwrap_err();

        assert!(matches!(err, DescribeError::Cancelled(_)));
        let queried: Vec<String> = store.recorded().into_iter().map(|(k, _)| k.kind).collect();
        assert_eq!(queried, vec!["A"]);
    }

    #[tokio::test]
    async fn object_name_does_not_reach_children() {
        let store = FakeStore::default().with_objects("A", vec![cluster_role("a")]);
        let section = SectionDescriber::new("/s", "S", vec![leaf("/s/a", "A")]).unwrap();
        let ctx = DescribeContext::new(&store).with_object_name("a");

        let content = section.describe(&ctx).await.unwrap();

        assert!(matches!(content.children()[0], Content::Table { .. }));
    }
}
