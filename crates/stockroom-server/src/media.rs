//! Local image storage for product pictures.
//!
//! Images live under `<dir>/products/images/` and are served at
//! `<base_url>/products/images/<name>`.

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

/// Key prefix for product images.
pub const IMAGE_PREFIX: &str = "products/images/";

/// An image already in the store.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StoredImage {
    pub key: String,
    pub url: String,
    pub size: u64,
}

#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
    base_url: String,
}

impl ImageStore {
    pub fn new(dir: impl AsRef<Path>, base_url: &str) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Public URL for a key.
    pub fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    /// Store an upload under its (sanitized) file name and return its URL.
    /// An existing image with the same name is replaced.
    pub async fn save(&self, file_name: &str, bytes: &[u8]) -> io::Result<String> {
        let name = sanitize_file_name(file_name).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "image has no usable file name")
        })?;
        let key = format!("{}{}", IMAGE_PREFIX, name);
        let path = self.dir.join(&key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        debug!(key = %key, size = bytes.len(), "image stored");
        Ok(self.url_for(&key))
    }

    /// Every stored image, by key. A missing directory means no images.
    pub async fn list(&self) -> io::Result<Vec<StoredImage>> {
        let dir = self.dir.join(IMAGE_PREFIX);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut images = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() || metadata.len() == 0 {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            let key = format!("{}{}", IMAGE_PREFIX, name);
            images.push(StoredImage {
                url: self.url_for(&key),
                key,
                size: metadata.len(),
            });
        }
        images.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(images)
    }

    /// Bytes and content type for a key, if it exists.
    pub async fn read(&self, key: &str) -> io::Result<Option<(Vec<u8>, &'static str)>> {
        if !is_valid_key(key) {
            return Ok(None);
        }
        match tokio::fs::read(self.dir.join(key)).await {
            Ok(bytes) => Ok(Some((bytes, content_type_for(key)))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Remove the image behind one of our URLs. Foreign URLs are left alone.
    pub async fn delete_by_url(&self, url: &str) -> io::Result<bool> {
        let Some(key) = url
            .strip_prefix(&self.base_url)
            .and_then(|rest| rest.strip_prefix('/'))
        else {
            return Ok(false);
        };
        if !is_valid_key(key) {
            return Ok(false);
        }
        match tokio::fs::remove_file(self.dir.join(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(key, "image already gone");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

/// Keys must be a plain file directly under the image prefix.
fn is_valid_key(key: &str) -> bool {
    key.strip_prefix(IMAGE_PREFIX)
        .map(|name| sanitize_file_name(name).as_deref() == Some(name))
        .unwrap_or(false)
}

/// Last path segment with unusual characters replaced.
fn sanitize_file_name(raw: &str) -> Option<String> {
    let base = raw.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default().trim();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    (!cleaned.is_empty()).then_some(cleaned)
}

fn content_type_for(key: &str) -> &'static str {
    let ext = key
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
