//! Wire types for universe definitions.
//!
//! A universe definition is a nested document owned by the control plane.
//! Rather than shuttling it around as raw JSON, the shapes this client
//! needs to branch on are explicit record types validated once at the
//! boundary; fields the client merely passes through ride along untyped in
//! flattened maps, so a configure response round-trips whole. A replica
//! built from a source document starts those maps from the source only
//! below the definition root; unmodeled root-level source fields drop out.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A universe as returned by the by-id fetch endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Universe {
    /// Identifier of the universe.
    #[serde(rename = "universeUUID")]
    pub universe_uuid: String,
    /// Display name, unique per customer.
    pub name: String,
    /// The full definition document.
    #[serde(rename = "universeDetails")]
    pub details: UniverseDefinition,
}

/// The definition document submitted to the configure and create endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniverseDefinition {
    /// Identifier of the universe this document describes. Freshly
    /// generated for a replica, never copied from the source.
    #[serde(rename = "universeUUID", default, skip_serializing_if = "Option::is_none")]
    pub universe_uuid: Option<String>,
    /// Prefix applied to provisioned node names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_prefix: Option<String>,
    /// Role groups making up the universe, primary cluster first.
    #[serde(default)]
    pub clusters: Vec<Cluster>,
    /// One record per provisioned or to-be-provisioned instance.
    #[serde(rename = "nodeDetailsSet", default)]
    pub node_details_set: Vec<NodeDetails>,
    /// Server-side revision counter; -1 for a not-yet-created universe.
    #[serde(default)]
    pub sequence_number: i64,
    /// Whether the backup agent has been installed on the nodes.
    #[serde(rename = "ybcInstalled", default)]
    pub ybc_installed: bool,
    /// Operation the configure endpoint should validate for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_operation: Option<String>,
    /// Port assignments shared by every node. Passed through verbatim.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub communication_ports: Value,
    /// Additional component dependencies. Passed through verbatim.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub extra_dependencies: Value,
    /// Metadata about the user issuing the creation. Passed through
    /// verbatim.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub creating_user: Value,
    /// Encryption-at-rest settings. Only the enabled flag survives
    /// replication; the rest of the wrapper is rebuilt fresh.
    #[serde(default)]
    pub encryption_at_rest_config: EncryptionAtRestConfig,
    /// Root certificate authority reference, present only when the source
    /// uses CA-backed transport encryption.
    #[serde(rename = "rootCA", default, skip_serializing_if = "Option::is_none")]
    pub root_ca: Option<String>,
    /// Client certificate authority reference, present only for
    /// client-to-node encryption with a dedicated CA.
    #[serde(rename = "clientRootCA", default, skip_serializing_if = "Option::is_none")]
    pub client_root_ca: Option<String>,
    /// Whether geo-partitioning is enabled. Always false for a new
    /// universe.
    #[serde(default)]
    pub allow_geo_partitioning: bool,
    /// Whether the region set changed relative to the persisted state.
    /// Meaningless before creation, so always reset.
    #[serde(default)]
    pub regions_changed: bool,
    /// Cross-cluster replication state. Never carried onto a replica.
    #[serde(rename = "xclusterInfo", default, skip_serializing_if = "Option::is_none")]
    pub xcluster_info: Option<Value>,
    /// Remaining definition fields, preserved verbatim. The configure
    /// endpoint adds fields beyond the modeled ones and the create
    /// submission must carry them; a replica built from a source document
    /// starts from an empty map instead, so unmodeled source fields never
    /// reach a creation payload.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Encryption-at-rest settings for a universe.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptionAtRestConfig {
    /// Whether data at rest is encrypted.
    #[serde(default)]
    pub encryption_at_rest_enabled: bool,
}

/// One role group within a universe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    /// Identifier of the cluster within its universe.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// `PRIMARY` or `ASYNC` (read replica).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_type: Option<String>,
    /// Desired configuration for this role group.
    pub user_intent: UserIntent,
    /// Remaining cluster fields (placement, per-AZ topology), passed
    /// through verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Desired configuration for one cluster: naming, credentials, sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIntent {
    /// Name of the universe this intent belongs to.
    pub universe_name: String,
    /// Administrative password for the SQL API. Redacted in configure
    /// responses; never readable back from the control plane.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ysql_password: Option<String>,
    /// Administrative password for the CQL API. Redacted in configure
    /// responses; never readable back from the control plane.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ycql_password: Option<String>,
    /// Per-pod resource requests for master nodes. Absent on clusters
    /// without a master role block, such as read replicas.
    #[serde(rename = "masterK8SNodeResourceSpec", default, skip_serializing_if = "Option::is_none")]
    pub master_resource_spec: Option<NodeResourceSpec>,
    /// Per-pod resource requests for tablet-server nodes.
    #[serde(rename = "tserverK8SNodeResourceSpec", default, skip_serializing_if = "Option::is_none")]
    pub tserver_resource_spec: Option<NodeResourceSpec>,
    /// Storage configuration for tablet-server nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_info: Option<DeviceInfo>,
    /// Remaining intent fields (provider, software version, region list),
    /// passed through verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// CPU and memory requests for one node role.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeResourceSpec {
    /// CPU cores requested per node.
    pub cpu_core_count: f64,
    /// Memory requested per node, in GiB.
    pub memory_gib: f64,
}

/// Storage configuration for a node role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    /// Size of each volume, in GB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_size: Option<u32>,
    /// Number of volumes per node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_volumes: Option<u32>,
    /// Remaining device fields, passed through verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One provisioned (or to-be-provisioned) instance within a universe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDetails {
    /// Position of the node within the universe.
    #[serde(default)]
    pub node_idx: i32,
    /// Assigned node name, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
    /// Whether the node runs a master process.
    #[serde(default)]
    pub is_master: bool,
    /// Whether the node runs a tablet server.
    #[serde(default)]
    pub is_tserver: bool,
    /// Whether the node serves the Redis-compatible API.
    #[serde(default)]
    pub is_redis_server: bool,
    /// Whether the node serves the CQL API.
    #[serde(default)]
    pub is_yql_server: bool,
    /// Lifecycle state of the master process, masters only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_state: Option<String>,
    /// Fixed role dedication tag, when the platform pins one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dedicated_to: Option<String>,
    /// Lifecycle state of the node itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Placement and runtime details for the backing instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_info: Option<CloudInfo>,
    /// Remaining node fields (ports, az membership), passed through
    /// verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Placement and runtime details for a node's backing instance.
///
/// The runtime-only fields exist only once a node is actually provisioned
/// and are modeled individually so a replica can drop them while keeping
/// the placement fields that ride in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudInfo {
    /// Private address of the running instance. Runtime-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_ip: Option<String>,
    /// Namespace the pod runs in. Runtime-only.
    #[serde(rename = "kubernetesNamespace", default, skip_serializing_if = "Option::is_none")]
    pub kubernetes_namespace: Option<String>,
    /// Name of the running pod. Runtime-only.
    #[serde(rename = "kubernetesPodName", default, skip_serializing_if = "Option::is_none")]
    pub kubernetes_pod_name: Option<String>,
    /// Placement fields (cloud, region, az, instance type), passed through
    /// verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
