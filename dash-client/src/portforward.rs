use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PodRef {
    pub namespace: String,
    pub name: String,
}

impl fmt::Display for PodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Starting,
    Running,
    Failed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionStatus::Starting => "starting",
            SessionStatus::Running => "running",
            SessionStatus::Failed => "failed",
        })
    }
}

/// One port-forward as seen by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub id: usize,
    pub pod: PodRef,
    pub local_port: u16,
    pub remote_port: u16,
    pub status: SessionStatus,
}

/// Live port-forward session state consumed by the port-forward describer.
pub trait PortForwardState: Send + Sync {
    fn list_sessions(&self) -> BoxFuture<'_, Vec<Session>>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PortForwardError {
    #[error("no port forward found for id {0}")]
    UnknownSession(usize),
}

/// In-process bookkeeping of port-forward sessions.
///
/// Tunnels themselves are owned by whoever registers them; this only records
/// what exists and its last reported status.
#[derive(Debug)]
pub struct PortForwardRegistry {
    sessions: Mutex<HashMap<usize, Session>>,
    counter: AtomicUsize,
}

impl Default for PortForwardRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PortForwardRegistry {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            counter: AtomicUsize::new(1),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn register(&self, pod: PodRef, local_port: u16, remote_port: u16) -> usize {
        let id = self.counter.fetch_add(1, Ordering::SeqCst);
        info!(id, %pod, local_port, remote_port, "registered port forward");
        self.sessions.lock().await.insert(
            id,
            Session {
                id,
                pod,
                local_port,
                remote_port,
                status: SessionStatus::Starting,
            },
        );
        id
    }

    pub async fn set_status(&self, id: usize, status: SessionStatus) -> Result<(), PortForwardError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(&id)
            .ok_or(PortForwardError::UnknownSession(id))?;
        debug!(id, from = %session.status, to = %status, "port forward status change");
        session.status = status;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, id: usize) -> Result<Session, PortForwardError> {
        self.sessions
            .lock()
            .await
            .remove(&id)
            .ok_or(PortForwardError::UnknownSession(id))
    }
}

impl PortForwardState for PortForwardRegistry {
    fn list_sessions(&self) -> BoxFuture<'_, Vec<Session>> {
        async move {
            let mut sessions: Vec<Session> = self.sessions.lock().await.values().cloned().collect();
            sessions.sort_by_key(|s| s.id);
            sessions
        }
        .boxed()
    }
}
