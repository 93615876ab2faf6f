//! Replication of a live universe into a new one.
//!
//! Replication deep-clones a source universe's definition and rewrites it
//! into a document valid for creation: fresh identity, reset lifecycle
//! fields, caller-supplied credentials, and nodes returned to their
//! pre-provisioning state. The rewritten document then goes through the
//! control plane's two-phase protocol: a `configure` call that validates
//! and expands it without persisting anything, followed by the `create`
//! call that actually provisions and returns a task.
//!
//! The configure endpoint redacts credential fields in its response, so the
//! expanded document's passwords are overwritten with the caller's
//! plaintext values before submission. Skipping that step would create the
//! destination universe with an unusable credential.

use serde_json::{Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use crate::client::YbaClient;
use crate::error::Error;
use crate::poll::WaitConfig;
use crate::types::task::TaskOutcome;
use crate::types::universe::{
    Cluster, EncryptionAtRestConfig, NodeDetails, NodeResourceSpec, Universe, UniverseDefinition,
};
use crate::Result;

/// Lifecycle state for a node that has not been provisioned yet.
pub const NODE_STATE_TO_BE_ADDED: &str = "ToBeAdded";

/// Fixed platform conventions applied to every master-role node in a
/// creation payload, independent of the source node's prior values.
///
/// Kept as a named table rather than inline literals so the convention can
/// be audited separately from the transform that applies it.
#[derive(Debug, Clone, Copy)]
pub struct MasterNodePolicy {
    /// Master-process lifecycle state for a node awaiting provisioning.
    pub master_state: &'static str,
    /// Masters always advertise the Redis-compatible API.
    pub redis_enabled: bool,
    /// Dedication tag pinned onto master nodes.
    pub dedication: &'static str,
}

/// The platform convention for master nodes.
pub const MASTER_NODE_POLICY: MasterNodePolicy = MasterNodePolicy {
    master_state: "ToStart",
    redis_enabled: true,
    dedication: "MASTER",
};

/// Keys in a cluster intent that reference certificate storage local to the
/// source instance. Host-specific, so invalid on the destination; stripped
/// from the replica.
const HOST_LOCAL_CERT_KEYS: &[&str] = &["certPath", "certClientPath", "certsDir", "certsClientDir"];

/// Administrative credentials for the replicated universe.
///
/// Password hashes are never readable from the source, so these are always
/// an overwrite, not a merge.
#[derive(Debug, Clone)]
pub struct UniverseCredentials {
    /// Administrative password for the SQL API.
    pub ysql_password: String,
    /// Administrative password for the CQL API.
    pub ycql_password: String,
}

/// Optional sizing overrides applied to every cluster of the replica.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceOverrides {
    /// CPU/memory for master nodes. Ignored on clusters that have no
    /// master resource block at all, such as pure read replicas.
    pub master: Option<NodeResourceSpec>,
    /// CPU/memory for tablet-server nodes.
    pub tserver: Option<NodeResourceSpec>,
    /// Per-volume size in GB for tablet-server storage.
    pub volume_size_gb: Option<u32>,
}

/// A request to replicate one universe into a new one.
#[derive(Debug, Clone)]
pub struct ReplicateUniverse {
    /// Name of the existing universe to clone. Must resolve to exactly one
    /// universe.
    pub source_name: String,
    /// Name for the new universe. Must not resolve to any universe.
    pub new_name: String,
    /// Credentials for the new universe.
    pub credentials: UniverseCredentials,
    /// Sizing overrides, if any.
    pub overrides: ResourceOverrides,
    /// When set, stop after the configure phase and return the expanded
    /// document without creating anything.
    pub preview: bool,
    /// How to wait for the creation task.
    pub wait: WaitConfig,
}

impl ReplicateUniverse {
    /// Build a replication request with default waiting and no overrides.
    pub fn new(
        source_name: impl Into<String>,
        new_name: impl Into<String>,
        credentials: UniverseCredentials,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            new_name: new_name.into(),
            credentials,
            overrides: ResourceOverrides::default(),
            preview: false,
            wait: WaitConfig::default(),
        }
    }

    /// Apply sizing overrides to the replica.
    pub fn with_overrides(mut self, overrides: ResourceOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Return the expanded document instead of creating the universe.
    pub fn preview(mut self) -> Self {
        self.preview = true;
        self
    }

    /// Override how the creation task is awaited.
    pub fn with_wait(mut self, wait: WaitConfig) -> Self {
        self.wait = wait;
        self
    }
}

/// Result of a replication request.
#[derive(Debug, Clone)]
pub enum ReplicationOutcome {
    /// Preview was requested: the configure-phase document, expanded by the
    /// control plane and with credentials restored, but not submitted.
    Preview(Box<UniverseDefinition>),
    /// The creation was submitted; the outcome of awaiting its task.
    Submitted(TaskOutcome),
}

impl YbaClient {
    /// Clone a live universe's definition into a new universe.
    ///
    /// Both name lookups happen before anything else: an absent or
    /// ambiguous source and an already-taken destination name each abort
    /// with a business-rule error before any mutating call is issued. The
    /// configure phase persists nothing, so a failed replication is always
    /// safely retryable as a whole.
    pub async fn replicate_universe(
        &self,
        request: &ReplicateUniverse,
    ) -> Result<ReplicationOutcome> {
        let source_id = self.resolve_universe(&request.source_name).await?;
        self.ensure_name_available(&request.new_name).await?;

        let doc = self
            .get(&self.customer_path(&format!("universes/{source_id}")))
            .await?;
        let source: Universe = serde_json::from_value(doc.clone())
            .map_err(|_| Error::protocol("universe document is malformed", doc))?;
        info!(
            source = %request.source_name,
            destination = %request.new_name,
            nodes = source.details.node_details_set.len(),
            "replicating universe definition"
        );

        let replica = replica_definition(&source, request);
        let expanded_doc = self
            .post(
                &self.customer_path("universe_configure"),
                &serde_json::to_value(&replica)?,
            )
            .await?;
        let mut expanded: UniverseDefinition = serde_json::from_value(expanded_doc.clone())
            .map_err(|_| Error::protocol("configure response is malformed", expanded_doc))?;

        // The configure response redacts password fields; restore the
        // caller's plaintext before the document goes anywhere else.
        restore_credentials(&mut expanded, &request.credentials);

        if request.preview {
            return Ok(ReplicationOutcome::Preview(Box::new(expanded)));
        }

        let submitted = self
            .post(
                &self.customer_path("universes"),
                &serde_json::to_value(&expanded)?,
            )
            .await?;
        let outcome = self.await_task(submitted, Some(&request.wait)).await?;
        Ok(ReplicationOutcome::Submitted(outcome))
    }

    /// Resolve a universe name to exactly one identifier.
    async fn resolve_universe(&self, name: &str) -> Result<String> {
        let matches = self.universes_named(name).await?;
        if matches.len() != 1 {
            return Err(Error::business_rule(format!(
                "expected exactly one universe named `{name}`, found {}",
                matches.len()
            )));
        }
        matches[0]
            .get("universeUUID")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                Error::protocol(
                    "universe lookup result carries no universeUUID",
                    matches[0].clone(),
                )
            })
    }

    /// Fail if any universe already answers to `name`.
    async fn ensure_name_available(&self, name: &str) -> Result<()> {
        let matches = self.universes_named(name).await?;
        if matches.is_empty() {
            Ok(())
        } else {
            Err(Error::business_rule(format!(
                "a universe named `{name}` already exists"
            )))
        }
    }

    async fn universes_named(&self, name: &str) -> Result<Vec<Value>> {
        let doc = self
            .get_with_query(&self.customer_path("universes"), &[("name", name)])
            .await?;
        match doc {
            Value::Array(items) => Ok(items),
            other => Err(Error::protocol("universe lookup did not return a list", other)),
        }
    }
}

/// Build the creation document for a replica of `source`.
fn replica_definition(source: &Universe, request: &ReplicateUniverse) -> UniverseDefinition {
    let src = &source.details;
    UniverseDefinition {
        universe_uuid: Some(Uuid::new_v4().to_string()),
        node_prefix: src
            .node_prefix
            .as_deref()
            .map(|prefix| derive_node_prefix(prefix, &source.name, &request.new_name)),
        clusters: src
            .clusters
            .iter()
            .map(|cluster| replicate_cluster(cluster, request))
            .collect(),
        node_details_set: src.node_details_set.iter().map(transform_node).collect(),
        sequence_number: -1,
        ybc_installed: false,
        cluster_operation: Some("CREATE".to_string()),
        communication_ports: src.communication_ports.clone(),
        extra_dependencies: src.extra_dependencies.clone(),
        creating_user: src.creating_user.clone(),
        encryption_at_rest_config: EncryptionAtRestConfig {
            encryption_at_rest_enabled: src.encryption_at_rest_config.encryption_at_rest_enabled,
        },
        root_ca: src.root_ca.clone(),
        client_root_ca: src.client_root_ca.clone(),
        allow_geo_partitioning: false,
        regions_changed: false,
        xcluster_info: None,
        // Unmodeled root-level source fields stay behind; the configure
        // phase rebuilds whatever the create submission needs.
        extra: Map::new(),
    }
}

/// Rewrite one cluster's intent for the replica: new name, caller-supplied
/// credentials, optional sizing overrides, host-local fields stripped.
fn replicate_cluster(cluster: &Cluster, request: &ReplicateUniverse) -> Cluster {
    let mut next = cluster.clone();
    let intent = &mut next.user_intent;

    intent.universe_name = request.new_name.clone();
    intent.ysql_password = Some(request.credentials.ysql_password.clone());
    intent.ycql_password = Some(request.credentials.ycql_password.clone());

    if let Some(master) = request.overrides.master {
        // Clusters without a master role block (read replicas) keep none.
        if intent.master_resource_spec.is_some() {
            intent.master_resource_spec = Some(master);
        }
    }
    if let Some(tserver) = request.overrides.tserver {
        if intent.tserver_resource_spec.is_some() {
            intent.tserver_resource_spec = Some(tserver);
        }
    }
    if let Some(volume_size) = request.overrides.volume_size_gb {
        if let Some(device) = intent.device_info.as_mut() {
            device.volume_size = Some(volume_size);
        }
    }

    for key in HOST_LOCAL_CERT_KEYS {
        intent.extra.remove(*key);
    }
    next
}

/// Return a node to its pre-provisioning shape.
///
/// Role flags and ports are copied verbatim. The lifecycle state is forced
/// to [`NODE_STATE_TO_BE_ADDED`] regardless of history, runtime-only fields
/// are stripped, and master nodes get [`MASTER_NODE_POLICY`] applied.
pub(crate) fn transform_node(node: &NodeDetails) -> NodeDetails {
    let mut next = node.clone();
    next.state = Some(NODE_STATE_TO_BE_ADDED.to_string());
    next.cloud_info = node.cloud_info.as_ref().map(|info| {
        let mut info = info.clone();
        info.private_ip = None;
        info.kubernetes_namespace = None;
        info.kubernetes_pod_name = None;
        info
    });
    if node.is_master {
        next.master_state = Some(MASTER_NODE_POLICY.master_state.to_string());
        next.is_redis_server = MASTER_NODE_POLICY.redis_enabled;
        next.dedicated_to = Some(MASTER_NODE_POLICY.dedication.to_string());
    }
    next
}

/// Overwrite every cluster's password fields with the caller's plaintext.
fn restore_credentials(definition: &mut UniverseDefinition, credentials: &UniverseCredentials) {
    for cluster in &mut definition.clusters {
        cluster.user_intent.ysql_password = Some(credentials.ysql_password.clone());
        cluster.user_intent.ycql_password = Some(credentials.ycql_password.clone());
    }
}

/// Derive the replica's node prefix from the source's.
///
/// The platform builds node prefixes as `<base><universe name>`; the
/// replica keeps the base and swaps in the new name. A prefix that does
/// not end in the source name falls back to the platform's default shape.
fn derive_node_prefix(source_prefix: &str, source_name: &str, new_name: &str) -> String {
    match source_prefix.strip_suffix(source_name) {
        Some(base) => format!("{base}{new_name}"),
        None => format!("yb-{new_name}"),
    }
}
