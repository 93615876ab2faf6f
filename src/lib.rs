//! Client for the YugabyteDB Anywhere control-plane API.
//!
//! This crate drives a remote YugabyteDB Anywhere instance: it submits
//! mutating operations, tracks their asynchronous completion, reconciles
//! desired release state against existing remote inventory, and clones a
//! live universe's definition into a new one.
//!
//! # Overview
//!
//! Mutating API calls return a task handle rather than a finished
//! resource; [`YbaClient::await_task`] polls the task to a terminal
//! condition or a wait budget and reports which of the two happened
//! through [`TaskOutcome`]. [`YbaClient::ensure_release`] registers a
//! release package idempotently, creating, extending, or leaving alone
//! the matching release. [`YbaClient::replicate_universe`] deep-clones a
//! universe definition through the control plane's two-phase
//! configure/create protocol. Thinner wrappers in [`provision`] render
//! embedded JSON payload templates and issue single requests.
//!
//! # Module Organization
//!
//! - [`client`] - HTTP client, builder, request execution
//! - [`types`] - Wire types (tasks, releases, universe definitions)
//! - [`poll`] - Task and metadata-extraction polling loops
//! - [`release`] - Idempotent release reconciliation
//! - [`universe`] - Universe replication and the node transform
//! - [`provision`] - Template-driven thin wrappers
//! - [`template`] - JSON payload template rendering
//! - [`error`] - Error taxonomy
//!
//! # Examples
//!
//! ```no_run
//! use yba_client::{YbaClient, ReplicateUniverse, UniverseCredentials};
//!
//! # async fn demo() -> yba_client::Result<()> {
//! let client = YbaClient::builder()
//!     .base_url("https://yba.example.com")
//!     .api_token(std::env::var("YBA_API_TOKEN").unwrap())
//!     .customer_id("11d78d93-1381-4d1d-8393-ba76f47ba7a6")
//!     .build()?;
//!
//! // Register a release package, creating or extending as needed.
//! let release = client
//!     .ensure_release("https://downloads.yugabyte.com/releases/2.20.0.1/yugabyte-2.20.0.1-b1-linux-x86_64.tar.gz")
//!     .await?;
//! println!("release {} has {} artifacts", release.version, release.artifacts.len());
//!
//! // Clone a running universe into a new one.
//! let request = ReplicateUniverse::new(
//!     "prod",
//!     "prod-clone",
//!     UniverseCredentials {
//!         ysql_password: "new-ysql-password".into(),
//!         ycql_password: "new-ycql-password".into(),
//!     },
//! );
//! client.replicate_universe(&request).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod poll;
pub mod provision;
pub mod release;
pub mod template;
pub mod types;
pub mod universe;

pub use client::{YbaClient, YbaClientBuilder};
pub use error::Error;
pub use poll::WaitConfig;
pub use types::release::{Artifact, ExtractedMetadata, Release};
pub use types::task::{Task, TaskOutcome, TaskStatus};
pub use types::universe::{NodeDetails, NodeResourceSpec, Universe, UniverseDefinition};
pub use universe::{
    MasterNodePolicy, ReplicateUniverse, ReplicationOutcome, ResourceOverrides,
    UniverseCredentials, MASTER_NODE_POLICY,
};

/// Result type alias using this crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
