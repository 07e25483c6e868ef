//! Media probing to get metadata without a full decode.

use montage_core::{MontageError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Metadata for a media source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Source locator
    pub source: String,
    /// Duration in seconds
    pub duration: f64,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
}

/// Probe a media file for its duration and dimensions.
///
/// Placeholder implementation; a production build would shell out to
/// ffprobe here. Collaborators feed the probed duration back into the
/// session through `set_asset_duration`.
pub fn probe_media<P: AsRef<Path>>(path: P) -> Result<MediaInfo> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(MontageError::NotFound(format!(
            "file not found: {}",
            path.display()
        )));
    }
    Ok(MediaInfo {
        source: path.to_string_lossy().into_owned(),
        duration: 10.0,
        width: 1920,
        height: 1080,
    })
}
