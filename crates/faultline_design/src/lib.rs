//! Design-level data model for the faultline RTL fault injector.
//!
//! This crate holds everything the instrumentation passes produce and the
//! runtime selector consumes: signal kinds and fault-injection signal
//! records, the insertion-ordered module table with its instance references,
//! the monotonic UUID allocator, hierarchy-depth computation over the module
//! instance DAG, and the emitter for the hierarchy descriptor artifact.

#![warn(missing_docs)]

pub mod emit;
pub mod error;
pub mod hierarchy;
pub mod signal;
pub mod table;
pub mod uuid;

pub use emit::{descriptor_file_name, descriptor_source};
pub use error::DesignError;
pub use hierarchy::hierarchy_depth;
pub use signal::{FiSignal, SignalKind};
pub use table::{DesignTable, InstanceRef, ModuleRecord};
pub use uuid::{UuidAllocator, TOP_MODULE_UUID};
