//! Wire types for database software releases and their build artifacts.
//!
//! A release is keyed by its version string and holds one artifact per
//! platform/architecture pair. Release updates are full-object writes: the
//! reconciler reads the release, produces a modified copy, and sends the
//! whole document back. [`Release`] and [`Artifact`] therefore flatten all
//! unmodeled fields into `extra` so nothing the control plane sent is lost
//! on the round trip.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single installable build within a release.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    /// Location of the package, when the artifact was registered by URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_url: Option<String>,
    /// Operating-system platform of the build (e.g. `linux`).
    pub platform: String,
    /// CPU architecture of the build, unique within a release.
    pub architecture: String,
    /// Remaining response fields, preserved for full-object updates.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A versioned collection of build artifacts known to the control plane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    /// Identifier assigned by the control plane at creation.
    pub release_uuid: String,
    /// Version string, unique among releases.
    pub version: String,
    /// One artifact per architecture.
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
    /// Remaining response fields, preserved for full-object updates.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Release {
    /// Returns the artifact for `architecture`, if the release has one.
    pub fn artifact_for(&self, architecture: &str) -> Option<&Artifact> {
        self.artifacts
            .iter()
            .find(|artifact| artifact.architecture == architecture)
    }

    /// Returns a copy of this release with `artifact` appended.
    ///
    /// The fetched value is left untouched; updates are sent as a new
    /// document rather than by mutating what was read from the network.
    pub fn with_artifact(&self, artifact: Artifact) -> Self {
        let mut next = self.clone();
        next.artifacts.push(artifact);
        next
    }
}

/// Metadata extracted from an externally hosted release package.
///
/// Produced by the metadata-extraction job. `version` is the one field
/// whose absence is a hard failure; the rest feed the release-creation
/// payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedMetadata {
    /// Version string of the packaged software.
    pub version: String,
    /// Database flavor of the package.
    pub yb_type: String,
    /// Operating-system platform of the build.
    pub platform: String,
    /// CPU architecture of the build.
    pub architecture: String,
    /// Release channel (e.g. `LTS`, `STS`, `PREVIEW`).
    pub release_type: String,
    /// Publication timestamp in milliseconds since the epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date_msecs: Option<i64>,
}
