//! Idempotent reconciliation of database releases.
//!
//! Rather than blindly registering a package, [`YbaClient::ensure_release`]
//! decides from existing remote inventory whether to create a new release,
//! extend an existing one with a new architecture, or do nothing at all.

use serde_json::{json, Value};
use tracing::{debug, info};

use crate::client::YbaClient;
use crate::error::Error;
use crate::types::release::{Artifact, ExtractedMetadata, Release};
use crate::Result;

impl YbaClient {
    /// Ensure a release exists for the package at `package_url`, with an
    /// artifact for the package's architecture.
    ///
    /// The package's metadata (version, platform, architecture) is first
    /// extracted remotely. Then:
    ///
    /// - no release with that version exists: a new release is created and
    ///   returned;
    /// - a release exists and already has an artifact for that
    ///   architecture: the existing release is returned unchanged, with no
    ///   mutating request issued;
    /// - a release exists without that architecture: a copy of the release
    ///   with the artifact appended is sent back as a full update, and the
    ///   updated release is returned.
    ///
    /// The update is an unsynchronized read-modify-write: a concurrent
    /// reconciliation of the same version can overwrite this one's artifact
    /// list based on a stale read. The control plane offers no concurrency
    /// token on this endpoint; last write wins.
    pub async fn ensure_release(&self, package_url: &str) -> Result<Release> {
        let submitted = self
            .post(
                &self.customer_path("ybdb_release/extract_metadata"),
                &json!({ "url": package_url }),
            )
            .await?;
        let metadata = self.await_extraction(submitted).await?;
        info!(
            version = %metadata.version,
            architecture = %metadata.architecture,
            "reconciling release for package"
        );

        let listing = self.get(&self.customer_path("ybdb_release")).await?;
        let releases: Vec<Release> = serde_json::from_value(listing.clone())
            .map_err(|_| Error::protocol("release listing is malformed", listing))?;

        let Some(release) = releases
            .into_iter()
            .find(|release| release.version == metadata.version)
        else {
            return self.create_release(&metadata, package_url).await;
        };

        if release.artifact_for(&metadata.architecture).is_some() {
            debug!(
                version = %metadata.version,
                architecture = %metadata.architecture,
                "architecture already registered; nothing to do"
            );
            return Ok(release);
        }

        let updated = release.with_artifact(Artifact {
            package_url: Some(package_url.to_string()),
            platform: metadata.platform.clone(),
            architecture: metadata.architecture.clone(),
            extra: serde_json::Map::new(),
        });
        let endpoint = self.customer_path(&format!("ybdb_release/{}", updated.release_uuid));
        let response = self.put(&endpoint, &serde_json::to_value(&updated)?).await?;
        parse_release(response)
    }

    /// Register a brand-new release built from extracted metadata.
    async fn create_release(
        &self,
        metadata: &ExtractedMetadata,
        package_url: &str,
    ) -> Result<Release> {
        let payload = json!({
            "version": metadata.version,
            "yb_type": metadata.yb_type,
            "release_type": metadata.release_type,
            "release_date_msecs": metadata.release_date_msecs,
            "artifacts": [{
                "package_url": package_url,
                "platform": metadata.platform,
                "architecture": metadata.architecture,
            }],
        });
        debug!(version = %metadata.version, "creating new release");
        let response = self
            .post(&self.customer_path("ybdb_release"), &payload)
            .await?;
        parse_release(response)
    }
}

fn parse_release(doc: Value) -> Result<Release> {
    serde_json::from_value(doc.clone())
        .map_err(|_| Error::protocol("release response is malformed", doc))
}
