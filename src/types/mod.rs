//! Wire types for the control-plane API.
//!
//! Each document shape the client branches on gets an explicit record type,
//! deserialized and validated once at the boundary. Shapes that must
//! round-trip whole (release updates) or that the client only passes
//! through keep their unmodeled fields in flattened `extra` maps.

pub mod release;
pub mod task;
pub mod universe;

pub use release::{Artifact, ExtractedMetadata, Release};
pub use task::{Task, TaskOutcome, TaskStatus};
pub use universe::{
    CloudInfo, Cluster, DeviceInfo, EncryptionAtRestConfig, NodeDetails, NodeResourceSpec,
    Universe, UniverseDefinition, UserIntent,
};
