//! Navigable, path-addressable views of a Kubernetes cluster.
//!
//! A [`DescriberRegistry`] owns an immutable tree of describers. Leaves query
//! an [`ObjectStore`] (or the port-forward session state) and render rows;
//! sections aggregate their children in declared order.

pub mod config;
pub mod content;
pub mod describer;
pub mod error;
pub mod portforward;
pub mod processors;
pub mod registry;
pub mod store;

mod filter;
mod sort;
mod utils;

cfg_if::cfg_if! {
    if #[cfg(feature = "telemetry")] {
        pub use dash_telemetry::{setup_logger, shutdown as shutdown_logger};
    } else {
        mod log;
        pub use log::{setup_logger, shutdown as shutdown_logger};
    }
}

pub use content::Content;
pub use describer::{DescribeContext, Describer, ResourceKey};
pub use error::{DescribeError, StoreError};
pub use portforward::{PortForwardRegistry, PortForwardState, Session};
pub use registry::{DescriberRegistry, Navigation, NavigationEntry, Overview};
pub use store::{KubeStore, ObjectStore, QueryScope};
