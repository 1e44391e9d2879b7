use std::fmt;

use kube::api::{DynamicObject, GroupVersionKind};
use kube::ResourceExt;
use tracing::debug;

use super::{validate_path, DescribeContext};
use crate::content::Content;
use crate::error::{DescribeError, Result};
use crate::processors::{processor_for, ProcessorKind};
use crate::store::QueryScope;

/// Identifies a Kubernetes resource type by API version and kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    pub api_version: String,
    pub kind: String,
}

impl ResourceKey {
    pub fn new(api_version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
        }
    }

    /// API group; empty for the core group (`v1`).
    pub fn group(&self) -> &str {
        self.api_version
            .rsplit_once('/')
            .map_or("", |(group, _)| group)
    }

    pub fn version(&self) -> &str {
        self.api_version
            .rsplit_once('/')
            .map_or(self.api_version.as_str(), |(_, version)| version)
    }

    pub fn gvk(&self) -> GroupVersionKind {
        GroupVersionKind::gvk(self.group(), self.version(), &self.kind)
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.api_version, self.kind)
    }
}

/// Declaration of a resource leaf.
#[derive(Debug, Clone)]
pub struct ResourceOptions {
    pub path: String,
    pub key: ResourceKey,
    pub list_title: String,
    pub object_title: String,
    pub cluster_wide: bool,
}

/// Immutable description of what a resource leaf queries and how it renders.
#[derive(Debug, Clone)]
pub struct ResourceDescriptor {
    pub path: String,
    pub key: ResourceKey,
    pub list_title: String,
    pub object_title: String,
    pub cluster_wide: bool,
    pub processor: ProcessorKind,
}

/// Leaf that lists (or shows one of) the objects of a single kind.
#[derive(Debug)]
pub struct ResourceDescriber {
    descriptor: ResourceDescriptor,
}

impl ResourceDescriber {
    pub fn new(options: ResourceOptions) -> Result<Self> {
        validate_path(&options.path)?;
        if options.key.kind.is_empty() || options.key.api_version.is_empty() {
            return Err(DescribeError::config(format!(
                "resource at {} needs an api version and a kind",
                options.path
            )));
        }

        let processor = processor_for(&options.key.kind);
        Ok(Self {
            descriptor: ResourceDescriptor {
                path: options.path,
                key: options.key,
                list_title: options.list_title,
                object_title: options.object_title,
                cluster_wide: options.cluster_wide,
                processor,
            },
        })
    }

    pub fn descriptor(&self) -> &ResourceDescriptor {
        &self.descriptor
    }

    pub fn path(&self) -> &str {
        &self.descriptor.path
    }

    pub fn title(&self) -> &str {
        &self.descriptor.list_title
    }

    pub fn key(&self) -> &ResourceKey {
        &self.descriptor.key
    }

    pub fn is_cluster_wide(&self) -> bool {
        self.descriptor.cluster_wide
    }

    /// Cluster-wide kinds never carry a namespace; namespaced kinds must.
    fn scope(&self, ctx: &DescribeContext<'_>) -> Result<QueryScope> {
        if self.descriptor.cluster_wide {
            return Ok(QueryScope::Cluster);
        }
        match ctx.namespace() {
            Some(ns) if !ns.is_empty() => Ok(QueryScope::Namespace(ns.to_string())),
            _ => Err(DescribeError::Scope {
                path: self.descriptor.path.clone(),
                kind: self.descriptor.key.kind.clone(),
            }),
        }
    }

    #[tracing::instrument(skip_all, fields(path = %self.descriptor.path, kind = %self.descriptor.key.kind))]
    pub(crate) async fn describe(&self, ctx: &DescribeContext<'_>) -> Result<Content> {
        let scope = self.scope(ctx)?;
        let key = &self.descriptor.key;

        let objects = tokio::select! {
            biased;
            _ = ctx.cancellation().cancelled() => {
                return Err(DescribeError::Cancelled(self.descriptor.path.clone()));
            }
            res = ctx.store().query(key, &scope) => res.map_err(|source| DescribeError::Query {
                key: key.clone(),
                source,
            })?,
        };
        debug!(count = objects.len(), scope = %scope, "store returned objects");

        match ctx.object_name() {
            Some(name) => self.object_view(&objects, name),
            None => self.list_view(&objects, ctx),
        }
    }

    fn list_view(&self, objects: &[DynamicObject], ctx: &DescribeContext<'_>) -> Result<Content> {
        let d = &self.descriptor;
        let rows = d
            .processor
            .process(objects, ctx.params())
            .map_err(|e| DescribeError::Render {
                path: d.path.clone(),
                reason: e.to_string(),
            })?;

        Ok(Content::Table {
            path: d.path.clone(),
            title: d.list_title.clone(),
            columns: d.processor.columns().iter().map(|c| c.to_string()).collect(),
            rows,
        })
    }

    fn object_view(&self, objects: &[DynamicObject], name: &str) -> Result<Content> {
        let d = &self.descriptor;
        let obj = objects
            .iter()
            .find(|obj| obj.name_any() == name)
            .ok_or_else(|| DescribeError::NotFound(format!("{} {} at {}", d.key.kind, name, d.path)))?;

        let yaml = serde_yaml::to_string(obj).map_err(|e| DescribeError::Render {
            path: d.path.clone(),
            reason: e.to_string(),
        })?;

        Ok(Content::Object {
            path: d.path.clone(),
            title: d.object_title.clone(),
            name: name.to_string(),
            namespace: obj.namespace(),
            yaml,
        })
    }
}
