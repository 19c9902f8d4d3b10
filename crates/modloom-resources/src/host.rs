//! Host application collaborators

use crate::image::Image;
use crate::{asset_key, BoxError};
use async_trait::async_trait;
use std::path::PathBuf;

/// Fetches concrete paths on behalf of the pipeline
///
/// Paths are the `/`-separated concrete paths produced by
/// [`crate::Resources::resolve`].
#[async_trait]
pub trait Host: Send + Sync {
    async fn read_text(&self, path: &str) -> Result<String, BoxError>;

    async fn fetch_binary(&self, path: &str) -> Result<Vec<u8>, BoxError>;

    /// Fetch an image in its source encoding
    async fn fetch_image(&self, path: &str) -> Result<Image, BoxError> {
        Ok(Image::Encoded(self.fetch_binary(path).await?))
    }
}

/// Host reading from a directory on disk
#[derive(Debug, Clone)]
pub struct FsHost {
    root: PathBuf,
}

impl FsHost {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root-relative location of `path`; `..` and leading `/` never leave the root
    fn fs_path(&self, path: &str) -> PathBuf {
        self.root.join(asset_key(path))
    }
}

#[async_trait]
impl Host for FsHost {
    async fn read_text(&self, path: &str) -> Result<String, BoxError> {
        Ok(tokio::fs::read_to_string(self.fs_path(path)).await?)
    }

    async fn fetch_binary(&self, path: &str) -> Result<Vec<u8>, BoxError> {
        Ok(tokio::fs::read(self.fs_path(path)).await?)
    }
}
