//! Image URL cache.
//!
//! The file-backed cache keeps one text file per entry at
//! `<cache_dir>/<provider>/image/<id>.txt` containing the URL.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::debug;

use crate::MetadataError;

#[async_trait::async_trait]
pub trait ImageCache: Send + Sync {
    async fn store(&self, key: &str, url: &str) -> Result<(), MetadataError>;

    async fn load(&self, key: &str) -> Result<Option<String>, MetadataError>;
}

#[derive(Debug, Clone)]
pub struct FileImageCache {
    dir: PathBuf,
}

impl FileImageCache {
    pub fn new(cache_root: &Path, provider: &str) -> Self {
        Self {
            dir: cache_root
                .join(sanitize_key(&provider.to_lowercase()))
                .join("image"),
        }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.txt", sanitize_key(key)))
    }
}

#[async_trait::async_trait]
impl ImageCache for FileImageCache {
    async fn store(&self, key: &str, url: &str) -> Result<(), MetadataError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(key);
        tokio::fs::write(&path, url).await?;
        debug!(path = %path.display(), "cached image url");
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<String>, MetadataError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(url) => {
                let url = url.trim();
                Ok(if url.is_empty() {
                    None
                } else {
                    Some(url.to_string())
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keeps entries in memory for the life of the process.
#[derive(Debug, Default)]
pub struct MemoryImageCache {
    entries: Mutex<HashMap<String, String>>,
}

#[async_trait::async_trait]
impl ImageCache for MemoryImageCache {
    async fn store(&self, key: &str, url: &str) -> Result<(), MetadataError> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), url.to_string());
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<String>, MetadataError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }
}

/// Identifiers come from remote catalogs; keep them from escaping the
/// cache directory.
fn sanitize_key(key: &str) -> String {
    let cleaned: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_url_in_provider_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = FileImageCache::new(tmp.path(), "Kitsu");

        cache.store("7442", "https://media.example/7442.jpg").await.unwrap();

        let path = tmp.path().join("kitsu").join("image").join("7442.txt");
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "https://media.example/7442.jpg"
        );
        assert_eq!(
            cache.load("7442").await.unwrap().as_deref(),
            Some("https://media.example/7442.jpg")
        );
    }

    #[tokio::test]
    async fn missing_entry_loads_as_none() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = FileImageCache::new(tmp.path(), "anisearch");
        assert_eq!(cache.load("1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn overwrites_previous_url() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = FileImageCache::new(tmp.path(), "anisearch");
        cache.store("1", "https://a.example/old.jpg").await.unwrap();
        cache.store("1", "https://a.example/new.jpg").await.unwrap();
        assert_eq!(
            cache.load("1").await.unwrap().as_deref(),
            Some("https://a.example/new.jpg")
        );
    }

    #[test]
    fn keys_cannot_escape_cache_dir() {
        let cache = FileImageCache::new(Path::new("/cache"), "kitsu");
        assert_eq!(
            cache.path_for("../../etc/passwd"),
            PathBuf::from("/cache/kitsu/image/______etc_passwd.txt")
        );
    }

    #[tokio::test]
    async fn memory_cache_round_trip() {
        let cache = MemoryImageCache::default();
        assert_eq!(cache.load("a").await.unwrap(), None);
        cache.store("a", "https://x.example/a.png").await.unwrap();
        assert_eq!(
            cache.load("a").await.unwrap().as_deref(),
            Some("https://x.example/a.png")
        );
    }
}
