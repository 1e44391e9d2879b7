use k8s_openapi::serde_json::Value;
use serde::Serialize;

/// Rendered result of a describe call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Content {
    /// List view of one resource kind or of port-forward sessions.
    Table {
        path: String,
        title: String,
        columns: Vec<String>,
        rows: Vec<Value>,
    },
    /// Single object view.
    Object {
        path: String,
        title: String,
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        namespace: Option<String>,
        yaml: String,
    },
    /// Composite of a section's children, in declared order.
    Section {
        path: String,
        title: String,
        children: Vec<Content>,
    },
}

impl Content {
    pub fn path(&self) -> &str {
        match self {
            Self::Table { path, .. } | Self::Object { path, .. } | Self::Section { path, .. } => {
                path
            }
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Table { title, .. }
            | Self::Object { title, .. }
            | Self::Section { title, .. } => title,
        }
    }

    /// Children of a section, empty for leaves.
    pub fn children(&self) -> &[Content] {
        match self {
            Self::Section { children, .. } => children,
            _ => &[],
        }
    }
}
