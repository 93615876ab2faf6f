//! Thin provisioning wrappers: render a payload template, issue one
//! request, optionally wait for the resulting task.
//!
//! None of these carry branching logic beyond template selection; the
//! decision-making lives in the release reconciler and the universe
//! replicator. Payload templates are embedded in the crate and exposed
//! through [`templates`] so callers can pick or supply their own.

use std::collections::HashMap;

use tracing::warn;

use crate::client::YbaClient;
use crate::poll::WaitConfig;
use crate::template::render_json;
use crate::types::task::TaskOutcome;
use crate::Result;

/// Embedded payload templates for the provisioning wrappers.
pub mod templates {
    /// Kubernetes provider creation payload.
    pub const PROVIDER_K8S: &str = include_str!("templates/provider_k8s.json");
    /// AWS provider creation payload using an instance IAM role.
    pub const PROVIDER_AWS_IAM: &str = include_str!("templates/provider_aws_iam.json");
    /// S3 backup storage configuration using an instance IAM role.
    pub const BACKUP_STORAGE_AWS_IAM: &str = include_str!("templates/backup_storage_aws_iam.json");
    /// S3 backup storage configuration using explicit access keys.
    pub const BACKUP_STORAGE_AWS_KEY: &str = include_str!("templates/backup_storage_aws_key.json");
    /// GCS backup storage configuration using a service-account key.
    pub const BACKUP_STORAGE_GCP_KEY: &str = include_str!("templates/backup_storage_gcp_key.json");
    /// Single-AZ Kubernetes universe creation payload.
    pub const UNIVERSE_K8S_1AZ: &str = include_str!("templates/universe_k8s_1az.json");
}

impl YbaClient {
    /// Create an infrastructure provider from a rendered template.
    pub async fn create_provider(
        &self,
        params: &HashMap<String, String>,
        template: &str,
        wait: Option<&WaitConfig>,
    ) -> Result<TaskOutcome> {
        let payload = render_json(template, params)?;
        let submitted = self.post(&self.customer_path("providers"), &payload).await?;
        self.await_task(submitted, wait).await
    }

    /// Create a provider for the Kubernetes cluster hosting the control
    /// plane itself.
    ///
    /// With `use_suggested`, the control plane's auto-detected Kubernetes
    /// settings are merged into `params` first, taking precedence over
    /// caller-supplied values for the fields they cover. The
    /// suggested-config endpoint is unavailable when the control
    /// plane does not run on Kubernetes or lacks API permissions; that is
    /// tolerated with a warning and the caller's parameters are used
    /// as-is.
    pub async fn create_kubernetes_provider(
        &self,
        params: HashMap<String, String>,
        use_suggested: bool,
        wait: Option<&WaitConfig>,
    ) -> Result<TaskOutcome> {
        let mut params = params;
        if use_suggested {
            match self
                .get(&self.customer_path("providers/suggested_kubernetes_config"))
                .await
            {
                Ok(suggested) => merge_suggested_config(&mut params, &suggested),
                Err(err) => warn!(
                    error = %err,
                    "unable to retrieve suggested Kubernetes provider configuration; \
                     continuing with caller-supplied parameters"
                ),
            }
        }
        self.create_provider(&params, templates::PROVIDER_K8S, wait)
            .await
    }

    /// Configure an S3 backup storage location.
    ///
    /// With `access_key` as `Some((id, secret))`, the explicit-key template
    /// is used; otherwise the instance IAM role is assumed.
    pub async fn create_backup_storage_aws(
        &self,
        configuration_name: &str,
        bucket_name: &str,
        access_key: Option<(&str, &str)>,
    ) -> Result<serde_json::Value> {
        let mut params = HashMap::from([
            ("configuration_name".to_string(), configuration_name.to_string()),
            ("bucket_name".to_string(), bucket_name.to_string()),
        ]);
        let template = match access_key {
            Some((id, secret)) => {
                params.insert("access_key_id".to_string(), id.to_string());
                params.insert("access_key_secret".to_string(), secret.to_string());
                templates::BACKUP_STORAGE_AWS_KEY
            },
            None => templates::BACKUP_STORAGE_AWS_IAM,
        };
        let payload = render_json(template, &params)?;
        self.post(&self.customer_path("configs"), &payload).await
    }

    /// Configure a GCS backup storage location using a service-account
    /// key in JSON format. The key must be JSON-escaped by the caller if
    /// it contains quotes.
    pub async fn create_backup_storage_gcp(
        &self,
        configuration_name: &str,
        bucket_name: &str,
        access_key_secret_json: &str,
    ) -> Result<serde_json::Value> {
        let params = HashMap::from([
            ("configuration_name".to_string(), configuration_name.to_string()),
            ("bucket_name".to_string(), bucket_name.to_string()),
            (
                "access_key_secret_json".to_string(),
                access_key_secret_json.to_string(),
            ),
        ]);
        let payload = render_json(templates::BACKUP_STORAGE_GCP_KEY, &params)?;
        self.post(&self.customer_path("configs"), &payload).await
    }

    /// Create a universe from a rendered template.
    pub async fn create_universe(
        &self,
        params: &HashMap<String, String>,
        template: &str,
        wait: Option<&WaitConfig>,
    ) -> Result<TaskOutcome> {
        let payload = render_json(template, params)?;
        let submitted = self.post(&self.customer_path("universes"), &payload).await?;
        self.await_task(submitted, wait).await
    }
}

/// Merge auto-detected Kubernetes settings into the template parameters.
///
/// Fields are read defensively: anything absent from the suggested config
/// is simply skipped, leaving the caller's value (or a missing-parameter
/// failure at render time if nobody supplied one).
fn merge_suggested_config(
    params: &mut HashMap<String, String>,
    suggested: &serde_json::Value,
) {
    let mut put = |key: &str, value: Option<&str>| {
        if let Some(value) = value {
            params.insert(key.to_string(), value.to_string());
        }
    };

    put("name", suggested.get("name").and_then(|v| v.as_str()));
    let config = &suggested["config"];
    put(
        "image_registry",
        config.get("KUBECONFIG_IMAGE_REGISTRY").and_then(|v| v.as_str()),
    );
    put(
        "cloud_provider",
        config
            .get("KUBECONFIG_PROVIDER")
            .and_then(|v| v.as_str())
            .map(|s| s.to_lowercase())
            .as_deref(),
    );
    // Quotes inside the secret data would break the surrounding JSON
    // string once substituted.
    put(
        "pull_secret",
        config
            .get("KUBECONFIG_PULL_SECRET_CONTENT")
            .and_then(|v| v.as_str())
            .map(|s| s.replace('"', "\\\""))
            .as_deref(),
    );
    put(
        "pull_secret_name",
        config
            .get("KUBECONFIG_IMAGE_PULL_SECRET_NAME")
            .and_then(|v| v.as_str()),
    );

    let region = &suggested["regionList"][0];
    put("region_code", region.get("code").and_then(|v| v.as_str()));
    put("region_name", region.get("name").and_then(|v| v.as_str()));
    let zone = &region["zoneList"][0];
    put("zone_code", zone.get("code").and_then(|v| v.as_str()));
    put("zone_name", zone.get("name").and_then(|v| v.as_str()));
}
