//! Assets and the project-level asset registry.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

/// Kind of media an asset points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetKind {
    Image,
    Video,
}

/// An external media reference.
///
/// Assets are immutable once registered, except for `natural_duration`,
/// which is filled in at most once when the source has been probed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    /// Unique asset ID
    pub id: Uuid,
    /// Kind of media
    pub kind: AssetKind,
    /// URL or handle of the media source
    pub source: String,
    /// Name displayed in the media library
    pub name: String,
    /// Source duration in seconds; `None` until the video has been probed
    pub natural_duration: Option<f64>,
}

impl Asset {
    /// Create a new asset record.
    pub fn new(kind: AssetKind, source: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            source: source.into(),
            name: name.into(),
            natural_duration: None,
        }
    }

    /// Same asset with a known source duration.
    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.natural_duration = Some(seconds);
        self
    }
}

/// Owner of every asset in the project.
///
/// Clips reference assets by id; a dangling reference is not an error, the
/// compositor just paints nothing for such clips.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetRegistry {
    assets: Vec<Asset>,
}

impl AssetRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new asset and return its id.
    ///
    /// This is the ingestion boundary: import and generation collaborators
    /// call it once they have produced content.
    pub fn add(
        &mut self,
        kind: AssetKind,
        source: impl Into<String>,
        name: impl Into<String>,
        natural_duration: Option<f64>,
    ) -> Uuid {
        let mut asset = Asset::new(kind, source, name);
        asset.natural_duration = natural_duration;
        let id = asset.id;
        debug!(asset = %id, kind = ?asset.kind, name = %asset.name, "Registered asset");
        self.assets.push(asset);
        id
    }

    /// Look up an asset by id.
    pub fn get(&self, id: Uuid) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id == id)
    }

    /// Fill in a video asset's natural duration.
    ///
    /// Set at most once per asset: re-setting to the same value is a no-op,
    /// a conflicting re-set is ignored with a warning.
    pub fn set_natural_duration(&mut self, id: Uuid, seconds: f64) {
        let Some(asset) = self.assets.iter_mut().find(|a| a.id == id) else {
            warn!(asset = %id, "Duration probe for unknown asset");
            return;
        };
        match asset.natural_duration {
            None => {
                debug!(asset = %id, seconds, "Probed natural duration");
                asset.natural_duration = Some(seconds);
            }
            Some(existing) if existing == seconds => {}
            Some(existing) => {
                warn!(asset = %id, existing, rejected = seconds, "Ignoring conflicting duration probe");
            }
        }
    }

    /// Known natural duration for an asset, if any.
    pub fn natural_duration(&self, id: Uuid) -> Option<f64> {
        self.get(id).and_then(|a| a.natural_duration)
    }

    /// All registered assets, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Asset> {
        self.assets.iter()
    }

    /// Number of registered assets.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
