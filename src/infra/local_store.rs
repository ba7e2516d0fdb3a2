// ============================================================
// Layer 6 — Local Object Store
// ============================================================
// Filesystem-backed ObjectStore. A bucket is a directory under
// the store's root and a key is a '/'-separated path inside it:
//
//   <root>/
//     reviews-raw/
//       amazon_reviews_us_Digital_Software_v1_00.tsv.gz
//     reviews-prepared/
//       prepared/labeled/labeled.csv
//       prepared/train/train.csv
//       ...
//
// Uploads go to a temporary sibling file which is then renamed
// over the target, so a reader never sees half an object.
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (I/O and File Handling)

use anyhow::{bail, Context, Result};
use std::{
    fs,
    path::{Component, Path, PathBuf},
};

pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn bucket_dir(&self, bucket: &str) -> Result<PathBuf> {
        if bucket.is_empty() || !is_plain_relative(Path::new(bucket)) || bucket.contains('/') {
            bail!("Invalid bucket name '{}'", bucket);
        }
        Ok(self.root.join(bucket))
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        let key = key.trim_start_matches('/');
        if key.is_empty() || !is_plain_relative(Path::new(key)) {
            bail!("Invalid object key '{}'", key);
        }
        Ok(self.bucket_dir(bucket)?.join(key))
    }

    fn existing_bucket(&self, bucket: &str) -> Result<PathBuf> {
        let dir = self.bucket_dir(bucket)?;
        if !dir.is_dir() {
            bail!("Bucket '{}' does not exist under '{}'", bucket, self.root.display());
        }
        Ok(dir)
    }
}

/// Only normal path segments: no `..`, no root, no drive prefix.
fn is_plain_relative(path: &Path) -> bool {
    path.components().all(|c| matches!(c, Component::Normal(_)))
}

impl crate::domain::traits::ObjectStore for LocalObjectStore {
    fn create_bucket(&self, bucket: &str) -> Result<bool> {
        let dir = self.bucket_dir(bucket)?;
        if dir.is_dir() {
            tracing::debug!("Bucket '{}' already exists", bucket);
            return Ok(false);
        }
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create bucket directory '{}'", dir.display()))?;
        tracing::info!("Created bucket '{}'", bucket);
        Ok(true)
    }

    fn download(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        self.existing_bucket(bucket)?;
        let path = self.object_path(bucket, key)?;
        fs::read(&path).with_context(|| format!("Cannot read object '{}/{}'", bucket, key))
    }

    fn upload(&self, bucket: &str, key: &str, bytes: &[u8]) -> Result<()> {
        self.existing_bucket(bucket)?;
        let path = self.object_path(bucket, key)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create '{}'", parent.display()))?;
        }

        let mut tmp = path.clone().into_os_string();
        tmp.push(".partial");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, bytes)
            .with_context(|| format!("Cannot write '{}'", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("Cannot move '{}' into place", tmp.display()))?;

        tracing::debug!("Stored {} bytes at '{}'", bytes.len(), path.display());
        Ok(())
    }

    fn list(&self, bucket: &str) -> Result<Vec<String>> {
        let dir = self.existing_bucket(bucket)?;
        let mut keys = Vec::new();
        collect_keys(&dir, &dir, &mut keys)?;
        keys.sort();
        Ok(keys)
    }

    fn delete(&self, bucket: &str, key: &str) -> Result<()> {
        let path = self.object_path(bucket, key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Cannot delete '{}/{}'", bucket, key)),
        }
    }
}

/// Walk `dir` recursively, pushing '/'-joined keys relative to `base`.
fn collect_keys(base: &Path, dir: &Path, keys: &mut Vec<String>) -> Result<()> {
    for entry in fs::read_dir(dir)
        .with_context(|| format!("Cannot read directory '{}'", dir.display()))?
    {
        let path = entry?.path();
        if path.is_dir() {
            collect_keys(base, &path, keys)?;
            continue;
        }
        // In-flight uploads are not objects yet
        if path.extension().and_then(|e| e.to_str()) == Some("partial") {
            continue;
        }
        if let Ok(rel) = path.strip_prefix(base) {
            let key: Vec<String> = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            keys.push(key.join("/"));
        }
    }
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::traits::ObjectStore;

    #[test]
    fn test_create_bucket_is_idempotent() {
        let dir   = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path());
        assert!(store.create_bucket("raw").unwrap());
        assert!(!store.create_bucket("raw").unwrap());
    }

    #[test]
    fn test_upload_download_and_list() {
        let dir   = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path());
        store.create_bucket("out").unwrap();

        store.upload("out", "prepared/train/train.csv", b"a,5,1\n").unwrap();
        store.upload("out", "prepared/test/test.csv", b"b,1,0\n").unwrap();

        assert_eq!(store.download("out", "prepared/train/train.csv").unwrap(), b"a,5,1\n");
        assert_eq!(
            store.list("out").unwrap(),
            vec!["prepared/test/test.csv", "prepared/train/train.csv"]
        );
    }

    #[test]
    fn test_upload_to_missing_bucket_fails() {
        let dir   = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path());
        assert!(store.upload("nope", "k.csv", b"x").is_err());
    }

    #[test]
    fn test_delete_missing_key_is_ok() {
        let dir   = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path());
        store.create_bucket("b").unwrap();
        store.upload("b", "k.csv", b"x").unwrap();
        store.delete("b", "k.csv").unwrap();
        store.delete("b", "k.csv").unwrap();
        assert!(store.list("b").unwrap().is_empty());
    }

    #[test]
    fn test_rejects_escaping_keys() {
        let dir   = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path());
        store.create_bucket("b").unwrap();
        assert!(store.upload("b", "../escape.csv", b"x").is_err());
        assert!(store.create_bucket("..").is_err());
    }
}
