//! The navigable registry of cluster views.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::content::Content;
use crate::describer::{
    DescribeContext, Describer, PortForwardDescriber, ResourceDescriber, ResourceKey,
    ResourceOptions, SectionDescriber, Walk, ROOT_PATH,
};
use crate::error::{DescribeError, Result};

const RBAC_API_VERSION: &str = "rbac.authorization.k8s.io/v1";

/// Immutable tree of describers rooted at `/`.
#[derive(Debug)]
pub struct DescriberRegistry {
    root: Describer,
}

impl DescriberRegistry {
    pub fn new(root: SectionDescriber) -> Result<Self> {
        if root.path() != ROOT_PATH {
            return Err(DescribeError::config(format!(
                "registry root must be {ROOT_PATH}, got {}",
                root.path()
            )));
        }
        Ok(Self { root: root.into() })
    }

    /// RBAC cluster roles and bindings plus port-forward sessions.
    pub fn cluster_overview() -> Result<Self> {
        let rbac = SectionDescriber::new(
            "/rbac",
            "RBAC",
            vec![
                rbac_leaf(
                    "/rbac/cluster-roles",
                    "ClusterRole",
                    "RBAC / Cluster Roles",
                    "Cluster Role",
                    true,
                )?,
                rbac_leaf(
                    "/rbac/cluster-role-bindings",
                    "ClusterRoleBinding",
                    "RBAC / Cluster Role Bindings",
                    "Cluster Role Binding",
                    true,
                )?,
            ],
        )?;

        Self::new(SectionDescriber::new(
            ROOT_PATH,
            "Cluster Overview",
            vec![rbac.into(), PortForwardDescriber::new().into()],
        )?)
    }

    /// Namespaced RBAC roles and bindings plus port-forward sessions.
    pub fn namespace_overview() -> Result<Self> {
        let rbac = SectionDescriber::new(
            "/rbac",
            "RBAC",
            vec![
                rbac_leaf("/rbac/roles", "Role", "RBAC / Roles", "Role", false)?,
                rbac_leaf(
                    "/rbac/role-bindings",
                    "RoleBinding",
                    "RBAC / Role Bindings",
                    "Role Binding",
                    false,
                )?,
            ],
        )?;

        Self::new(SectionDescriber::new(
            ROOT_PATH,
            "Overview",
            vec![rbac.into(), PortForwardDescriber::new().into()],
        )?)
    }

    pub fn root(&self) -> &Describer {
        &self.root
    }

    /// Exact-path resolution; no partial matches.
    pub fn lookup(&self, path: &str) -> Result<&Describer> {
        self.root
            .resolve(path)
            .ok_or_else(|| DescribeError::NotFound(path.to_string()))
    }

    /// Resolve `path` and describe it.
    #[tracing::instrument(skip(self, ctx), fields(namespace = ctx.namespace()))]
    pub async fn describe(&self, path: &str, ctx: &DescribeContext<'_>) -> Result<Content> {
        self.lookup(path)?.describe(ctx).await
    }

    /// Pre-order traversal of every registered describer. Each call starts over.
    pub fn walk(&self) -> Walk<'_> {
        self.root.walk()
    }

    pub fn paths(&self) -> Vec<&str> {
        self.walk().map(Describer::path).collect()
    }

    /// Nested menu of the whole tree, the root first.
    pub fn navigation(&self) -> Navigation {
        Navigation {
            sections: vec![NavigationEntry::from(&self.root)],
        }
    }
}

/// Menu payload for a front end: the tree's titles and paths, no data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub sections: Vec<NavigationEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationEntry {
    pub title: String,
    pub path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavigationEntry>,
}

impl From<&Describer> for NavigationEntry {
    fn from(d: &Describer) -> Self {
        Self {
            title: d.title().to_string(),
            path: d.path().to_string(),
            children: d.children().iter().map(NavigationEntry::from).collect(),
        }
    }
}

fn rbac_leaf(
    path: &str,
    kind: &str,
    list_title: &str,
    object_title: &str,
    cluster_wide: bool,
) -> Result<Describer> {
    Ok(ResourceDescriber::new(ResourceOptions {
        path: path.to_string(),
        key: ResourceKey::new(RBAC_API_VERSION, kind),
        list_title: list_title.to_string(),
        object_title: object_title.to_string(),
        cluster_wide,
    })?
    .into())
}

/// Which fixed composition to serve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overview {
    #[default]
    Cluster,
    Namespace,
}

impl Overview {
    pub fn build(self) -> Result<DescriberRegistry> {
        match self {
            Overview::Cluster => DescriberRegistry::cluster_overview(),
            Overview::Namespace => DescriberRegistry::namespace_overview(),
        }
    }
}

impl FromStr for Overview {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cluster" => Ok(Overview::Cluster),
            "namespace" => Ok(Overview::Namespace),
            other => Err(format!("unknown overview {other:?} (expected cluster|namespace)")),
        }
    }
}
