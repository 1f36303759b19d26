//! Directory-backed bucket.
//!
//! Layout:
//! - `<root>/<name>`            object bytes
//! - `<root>/<name>.meta.json`  custom metadata (JSON object of strings)
//!
//! Metadata writes go through a uniquely named temp file + rename so readers
//! never observe a half-written sidecar. Writers to one object are serialized
//! by a per-object lock, so concurrent patches merge instead of racing.
//! Names containing `.meta.json` are reserved for sidecars and temp files.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::fs;
use tokio::sync::Mutex;

use objacl_core::error::{AclError, Result};

use super::{ObjectBucket, ObjectMetadata};

const META_SUFFIX: &str = ".meta.json";

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

pub struct FsBucket {
    name: String,
    root: PathBuf,
    /// object path -> writer lock; entries are dropped once nobody holds them.
    locks: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl FsBucket {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            locks: DashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map an object name onto the root, refusing anything that could escape it.
    fn object_path(&self, object: &str) -> Result<PathBuf> {
        if object.is_empty() {
            return Err(AclError::InvalidPath("object name must not be empty".into()));
        }
        if object.ends_with(META_SUFFIX) || object.contains(&format!("{META_SUFFIX}.")) {
            return Err(AclError::InvalidPath(format!(
                "object name must not contain {META_SUFFIX}: {object}"
            )));
        }
        let rel = Path::new(object);
        for c in rel.components() {
            match c {
                Component::Normal(_) => {}
                _ => {
                    return Err(AclError::InvalidPath(format!(
                        "object name must be a relative path without '.' or '..': {object}"
                    )))
                }
            }
        }
        Ok(self.root.join(rel))
    }

    fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        self.locks
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Caller must have dropped its own handle first.
    fn release(&self, path: &Path) {
        self.locks.remove_if(path, |_, l| Arc::strong_count(l) == 1);
    }

    fn meta_path(path: &Path) -> PathBuf {
        let mut s = path.as_os_str().to_owned();
        s.push(META_SUFFIX);
        PathBuf::from(s)
    }

    async fn is_file(path: &Path) -> Result<bool> {
        match fs::metadata(path).await {
            Ok(m) => Ok(m.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(storage_err("stat", path, e)),
        }
    }

    async fn read_sidecar(path: &Path) -> Result<ObjectMetadata> {
        let meta = Self::meta_path(path);
        let raw = match fs::read_to_string(&meta).await {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ObjectMetadata::new()),
            Err(e) => return Err(storage_err("read", &meta, e)),
        };
        serde_json::from_str(&raw).map_err(|e| {
            AclError::Storage(format!("metadata sidecar {} is corrupt: {e}", meta.display()))
        })
    }

    async fn write_sidecar(path: &Path, md: &ObjectMetadata) -> Result<()> {
        let meta = Self::meta_path(path);
        let body = serde_json::to_vec_pretty(md)
            .map_err(|e| AclError::Internal(format!("metadata encode failed: {e}")))?;

        let mut tmp = meta.as_os_str().to_owned();
        tmp.push(format!(
            ".{}.{}.tmp",
            std::process::id(),
            TMP_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, body).await.map_err(|e| storage_err("write", &tmp, e))?;
        if let Err(e) = fs::rename(&tmp, &meta).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(storage_err("rename", &meta, e));
        }
        Ok(())
    }
}

fn storage_err(op: &str, path: &Path, e: std::io::Error) -> AclError {
    AclError::Storage(format!("{op} {} failed: {e}", path.display()))
}

async fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(storage_err("remove", path, e)),
    }
}

#[async_trait]
impl ObjectBucket for FsBucket {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self, object: &str) -> Result<bool> {
        let path = self.object_path(object)?;
        Self::is_file(&path).await
    }

    async fn metadata(&self, object: &str) -> Result<ObjectMetadata> {
        let path = self.object_path(object)?;
        if !Self::is_file(&path).await? {
            return Err(AclError::ObjectNotFound(object.to_string()));
        }
        Self::read_sidecar(&path).await
    }

    async fn patch_metadata(&self, object: &str, patch: ObjectMetadata) -> Result<()> {
        let path = self.object_path(object)?;
        let lock = self.lock_for(&path);
        let res = async {
            let _guard = lock.lock().await;
            if !Self::is_file(&path).await? {
                return Err(AclError::ObjectNotFound(object.to_string()));
            }
            let mut md = Self::read_sidecar(&path).await?;
            md.extend(patch);
            Self::write_sidecar(&path, &md).await
        }
        .await;
        drop(lock);
        self.release(&path);
        res
    }

    async fn put(&self, object: &str, data: Vec<u8>) -> Result<()> {
        let path = self.object_path(object)?;
        let lock = self.lock_for(&path);
        let res = async {
            let _guard = lock.lock().await;
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| storage_err("mkdir", parent, e))?;
            }
            fs::write(&path, data).await.map_err(|e| storage_err("write", &path, e))?;
            remove_if_present(&Self::meta_path(&path)).await
        }
        .await;
        drop(lock);
        self.release(&path);
        res
    }

    async fn delete(&self, object: &str) -> Result<()> {
        let path = self.object_path(object)?;
        let lock = self.lock_for(&path);
        let res = async {
            let _guard = lock.lock().await;
            remove_if_present(&path).await?;
            remove_if_present(&Self::meta_path(&path)).await
        }
        .await;
        drop(lock);
        self.release(&path);
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_patch_read() {
        let dir = tempfile::tempdir().unwrap();
        let b = FsBucket::new("local", dir.path());

        b.put("private/uploads/abc", b"pdf".to_vec()).await.unwrap();
        assert!(b.exists("private/uploads/abc").await.unwrap());
        assert!(b.metadata("private/uploads/abc").await.unwrap().is_empty());

        let mut p = ObjectMetadata::new();
        p.insert("custom:aclPolicy".into(), "{}".into());
        b.patch_metadata("private/uploads/abc", p).await.unwrap();

        let md = b.metadata("private/uploads/abc").await.unwrap();
        assert_eq!(md.get("custom:aclPolicy").map(String::as_str), Some("{}"));
    }

    #[tokio::test]
    async fn delete_removes_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let b = FsBucket::new("local", dir.path());

        b.put("a", vec![1]).await.unwrap();
        let mut p = ObjectMetadata::new();
        p.insert("k".into(), "v".into());
        b.patch_metadata("a", p).await.unwrap();
        assert!(dir.path().join("a.meta.json").exists());

        b.delete("a").await.unwrap();
        assert!(!b.exists("a").await.unwrap());
        assert!(!dir.path().join("a.meta.json").exists());
        b.delete("a").await.unwrap();
    }

    #[tokio::test]
    async fn rejects_escaping_names() {
        let dir = tempfile::tempdir().unwrap();
        let b = FsBucket::new("local", dir.path());

        for bad in ["", "../etc/passwd", "/abs", "./a", "x.meta.json", "x.meta.json.1.7.tmp"] {
            let err = b.exists(bad).await.unwrap_err();
            assert_eq!(err.code().as_str(), "INVALID_PATH", "name={bad}");
        }
    }

    #[tokio::test]
    async fn corrupt_sidecar_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let b = FsBucket::new("local", dir.path());
        b.put("a", vec![]).await.unwrap();
        std::fs::write(dir.path().join("a.meta.json"), "not json").unwrap();

        let err = b.metadata("a").await.unwrap_err();
        assert_eq!(err.code().as_str(), "STORAGE");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_patches_all_land() {
        let dir = tempfile::tempdir().unwrap();
        let b = Arc::new(FsBucket::new("local", dir.path()));
        b.put("obj", vec![]).await.unwrap();

        for round in 0..20 {
            let mut tasks = Vec::new();
            for i in 0..16 {
                let b = b.clone();
                tasks.push(tokio::spawn(async move {
                    let mut policy = ObjectMetadata::new();
                    policy.insert("custom:aclPolicy".into(), format!("writer-{i}"));
                    b.patch_metadata("obj", policy).await?;
                    let mut own = ObjectMetadata::new();
                    own.insert(format!("k{i}"), round.to_string());
                    b.patch_metadata("obj", own).await
                }));
            }
            for t in tasks {
                t.await.unwrap().unwrap();
            }

            let md = b.metadata("obj").await.unwrap();
            for i in 0..16 {
                assert_eq!(md.get(&format!("k{i}")), Some(&round.to_string()), "round={round} k{i}");
            }
            assert!(md["custom:aclPolicy"].starts_with("writer-"));
        }

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "{leftovers:?}");
        assert!(b.locks.is_empty());
    }
}
