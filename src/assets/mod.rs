//! Asset catalog - loads the sprite/sound manifest and serves bytes
//!
//! Loading is count-based: a failed asset is logged and still counted
//! toward progress, so one missing file can never stall the loading
//! screen. Missing art is served as a visible placeholder instead.

use std::collections::HashMap;
use std::path::Path;

use bytes::Bytes;
use parking_lot::RwLock;
use serde::Deserialize;
use tokio::sync::watch;
use tracing::{info, warn};

/// Served when an image failed to load
const PLACEHOLDER_SVG: &str = "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"64\" height=\"64\"><rect width=\"64\" height=\"64\" fill=\"#ff00ff\"/></svg>";

/// Manifest file name inside the asset directory
const MANIFEST_FILE: &str = "manifest.json";

/// Asset manifest: key -> relative file path
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetManifest {
    #[serde(default)]
    pub images: HashMap<String, String>,
    #[serde(default)]
    pub sounds: HashMap<String, String>,
}

/// Loading progress reported over the watch channel
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadProgress {
    pub loaded: usize,
    pub total: usize,
    pub complete: bool,
}

impl LoadProgress {
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.loaded as f32 / self.total as f32
        }
    }
}

/// In-memory asset store with load-progress reporting
pub struct AssetCatalog {
    images: RwLock<HashMap<String, Bytes>>,
    sounds: RwLock<HashMap<String, Bytes>>,
    progress_tx: watch::Sender<LoadProgress>,
    placeholder: Bytes,
}

impl AssetCatalog {
    pub fn new() -> Self {
        let (progress_tx, _) = watch::channel(LoadProgress::default());
        Self {
            images: RwLock::new(HashMap::new()),
            sounds: RwLock::new(HashMap::new()),
            progress_tx,
            placeholder: Bytes::from_static(PLACEHOLDER_SVG.as_bytes()),
        }
    }

    /// Subscribe to loading progress updates
    pub fn subscribe(&self) -> watch::Receiver<LoadProgress> {
        self.progress_tx.subscribe()
    }

    /// Current loading progress
    pub fn progress(&self) -> LoadProgress {
        *self.progress_tx.borrow()
    }

    /// Load every asset named by the manifest. Individual failures are
    /// logged and counted as loaded; an unreadable manifest completes the
    /// load with an empty catalog so the application can still proceed.
    pub async fn load_all(&self, dir: &Path) {
        let manifest = match self.read_manifest(dir).await {
            Ok(manifest) => manifest,
            Err(e) => {
                warn!(error = %e, dir = %dir.display(), "Asset manifest unavailable, continuing without assets");
                self.progress_tx.send_replace(LoadProgress {
                    loaded: 0,
                    total: 0,
                    complete: true,
                });
                return;
            }
        };

        let total = manifest.images.len() + manifest.sounds.len();
        let mut loaded = 0usize;

        for (key, rel_path) in &manifest.images {
            match tokio::fs::read(dir.join(rel_path)).await {
                Ok(data) => {
                    self.images.write().insert(key.clone(), Bytes::from(data));
                }
                Err(e) => {
                    warn!(key = %key, path = %rel_path, error = %e, "Failed to load image");
                }
            }
            loaded += 1;
            self.report(loaded, total);
        }

        for (key, rel_path) in &manifest.sounds {
            match tokio::fs::read(dir.join(rel_path)).await {
                Ok(data) => {
                    self.sounds.write().insert(key.clone(), Bytes::from(data));
                }
                Err(e) => {
                    warn!(key = %key, path = %rel_path, error = %e, "Failed to load sound");
                }
            }
            loaded += 1;
            self.report(loaded, total);
        }

        info!(
            images = self.images.read().len(),
            sounds = self.sounds.read().len(),
            total,
            "Asset loading complete"
        );
    }

    /// Get image bytes, falling back to the placeholder for missing art
    pub fn get_image(&self, key: &str) -> Bytes {
        self.images
            .read()
            .get(key)
            .cloned()
            .unwrap_or_else(|| self.placeholder.clone())
    }

    /// Get sound bytes; missing sounds have no placeholder
    pub fn get_sound(&self, key: &str) -> Option<Bytes> {
        let sound = self.sounds.read().get(key).cloned();
        if sound.is_none() {
            warn!(key = %key, "Sound not found");
        }
        sound
    }

    async fn read_manifest(&self, dir: &Path) -> Result<AssetManifest, AssetError> {
        let raw = tokio::fs::read(dir.join(MANIFEST_FILE))
            .await
            .map_err(AssetError::Read)?;
        serde_json::from_slice(&raw).map_err(AssetError::Parse)
    }

    fn report(&self, loaded: usize, total: usize) {
        self.progress_tx.send_replace(LoadProgress {
            loaded,
            total,
            complete: loaded >= total,
        });
    }
}

impl Default for AssetCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Asset loading errors
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Failed to read manifest: {0}")]
    Read(std::io::Error),

    #[error("Failed to parse manifest: {0}")]
    Parse(serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_missing_manifest_still_completes() {
        let catalog = AssetCatalog::new();

        catalog.load_all(&PathBuf::from("/nonexistent/assets")).await;

        let progress = catalog.progress();
        assert!(progress.complete);
        assert_eq!(progress.total, 0);
        assert_eq!(progress.fraction(), 1.0);
    }

    #[tokio::test]
    async fn test_missing_image_serves_placeholder() {
        let catalog = AssetCatalog::new();

        let bytes = catalog.get_image("no_such_sprite");

        assert!(!bytes.is_empty());
        assert!(bytes.starts_with(b"<svg"));
    }

    #[tokio::test]
    async fn test_missing_sound_has_no_placeholder() {
        let catalog = AssetCatalog::new();

        assert!(catalog.get_sound("no_such_sound").is_none());
    }
}
