use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use rand::{distributions::Alphanumeric, Rng};
use time::OffsetDateTime;
use tracing::debug;

/// Destination for uploaded images. Injected through `AppState` so tests
/// can swap in a no-op store.
#[async_trait]
pub trait UploadStore: Send + Sync {
    async fn put(&self, filename: &str, body: Bytes) -> anyhow::Result<()>;
}

/// Writes uploads under a public directory served by the HTTP layer.
#[derive(Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl UploadStore for LocalStore {
    async fn put(&self, filename: &str, body: Bytes) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.root.join(filename);
        tokio::fs::write(&path, &body).await?;
        debug!(path = %path.display(), bytes = body.len(), "upload written");
        Ok(())
    }
}

/// Millisecond timestamp plus a random suffix; collision resistance is
/// probabilistic, not guaranteed. The client extension survives only when it
/// is plain alphanumeric, otherwise `.jpg`.
pub fn generate_filename(original: Option<&str>) -> String {
    let ext = original
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_else(|| ".jpg".to_string());

    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();

    format!("{}-{}{}", millis, suffix, ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_preserves_extension_lowercased() {
        let name = generate_filename(Some("Photo.PNG"));
        assert!(name.ends_with(".png"));
    }

    #[test]
    fn filename_defaults_to_jpg() {
        assert!(generate_filename(None).ends_with(".jpg"));
        assert!(generate_filename(Some("noext")).ends_with(".jpg"));
        assert!(generate_filename(Some("weird.p%g")).ends_with(".jpg"));
    }

    #[test]
    fn filenames_do_not_collide_back_to_back() {
        let a = generate_filename(Some("a.jpg"));
        let b = generate_filename(Some("a.jpg"));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn local_store_writes_bytes() {
        let root = std::env::temp_dir().join(format!("wardrobe-store-{}", uuid::Uuid::new_v4()));
        let store = LocalStore::new(&root);
        store
            .put("test.png", Bytes::from_static(b"\x89PNG"))
            .await
            .expect("put should succeed");

        let written = tokio::fs::read(root.join("test.png")).await.unwrap();
        assert_eq!(written, b"\x89PNG");
        tokio::fs::remove_dir_all(root).await.ok();
    }
}
