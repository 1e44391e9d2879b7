use k8s_openapi::serde_json::json;

use super::DescribeContext;
use crate::content::Content;
use crate::error::{DescribeError, Result};
use crate::filter::filter_dynamic;
use crate::portforward::Session;

pub const PORT_FORWARD_PATH: &str = "/portforward";
pub const PORT_FORWARD_TITLE: &str = "Port Forwards";

const COLUMNS: [&str; 5] = ["id", "pod", "local-port", "remote-port", "status"];

/// Leaf listing the live port-forward sessions.
#[derive(Debug)]
pub struct PortForwardDescriber {
    path: String,
    title: String,
}

impl Default for PortForwardDescriber {
    fn default() -> Self {
        Self::new()
    }
}

impl PortForwardDescriber {
    pub fn new() -> Self {
        Self {
            path: PORT_FORWARD_PATH.to_string(),
            title: PORT_FORWARD_TITLE.to_string(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    #[tracing::instrument(skip_all, fields(path = %self.path))]
    pub(crate) async fn describe(&self, ctx: &DescribeContext<'_>) -> Result<Content> {
        let state = ctx.port_forwards().ok_or_else(|| {
            DescribeError::Unavailable("port forwarding is not initialized".to_string())
        })?;

        let sessions = tokio::select! {
            biased;
            _ = ctx.cancellation().cancelled() => {
                return Err(DescribeError::Cancelled(self.path.clone()));
            }
            sessions = state.list_sessions() => sessions,
        };

        let sessions: Vec<&Session> = match ctx.params().filter.as_deref() {
            Some(query) => filter_dynamic(&sessions, query, &["pod", "status"], |s, field| {
                match field {
                    "pod" => Some(s.pod.to_string()),
                    "status" => Some(s.status.to_string()),
                    _ => None,
                }
            }),
            None => sessions.iter().collect(),
        };

        let rows = sessions
            .into_iter()
            .map(|s| {
                json!({
                    "id": s.id,
                    "pod": s.pod.to_string(),
                    "local-port": s.local_port,
                    "remote-port": s.remote_port,
                    "status": s.status,
                })
            })
            .collect();

        Ok(Content::Table {
            path: self.path.clone(),
            title: self.title.clone(),
            columns: COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows,
        })
    }
}
