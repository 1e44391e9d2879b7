pub mod clusterrole;
pub mod clusterrolebinding;
pub mod default;
pub mod processor;
pub mod role;
pub mod rolebinding;

mod kind;

pub use kind::{processor_for, ProcessorKind};
pub use processor::FilterParams;
