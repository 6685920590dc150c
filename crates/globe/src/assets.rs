use std::collections::BTreeMap;
use std::future::{Future, ready};
use std::path::PathBuf;

use crate::error::GlobeError;

/// Fetches the bytes behind an image-backed texture strategy's `source`.
pub trait AssetLoader {
    fn load(&self, source: &str) -> impl Future<Output = Result<Vec<u8>, GlobeError>>;
}

/// Sources held in memory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    assets: BTreeMap<String, Vec<u8>>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, source: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.assets.insert(source.into(), bytes);
        self
    }
}

impl AssetLoader for MemoryAssets {
    fn load(&self, source: &str) -> impl Future<Output = Result<Vec<u8>, GlobeError>> {
        ready(
            self.assets
                .get(source)
                .cloned()
                .ok_or_else(|| GlobeError::asset(source, "not found")),
        )
    }
}

/// Sources read from disk, relative to `root`.
#[derive(Debug, Clone)]
pub struct FileAssets {
    root: PathBuf,
}

impl FileAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetLoader for FileAssets {
    fn load(&self, source: &str) -> impl Future<Output = Result<Vec<u8>, GlobeError>> {
        let path = self.root.join(source.trim_start_matches('/'));
        ready(std::fs::read(&path).map_err(|e| GlobeError::asset(source, e.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::{AssetLoader, FileAssets, MemoryAssets};
    use crate::error::GlobeError;
    use futures::executor::block_on;

    #[test]
    fn memory_assets_serve_known_sources() {
        let assets = MemoryAssets::new().with("land.png", vec![1, 2, 3]);
        assert_eq!(block_on(assets.load("land.png")).unwrap(), vec![1, 2, 3]);
        assert!(matches!(
            block_on(assets.load("sea.png")),
            Err(GlobeError::Asset { source_name, .. }) if source_name == "sea.png"
        ));
    }

    #[test]
    fn file_assets_report_missing_files() {
        let assets = FileAssets::new(std::env::temp_dir());
        let err = block_on(assets.load("/no-such-globe-texture.png")).unwrap_err();
        assert!(err.to_string().contains("no-such-globe-texture.png"));
    }
}
