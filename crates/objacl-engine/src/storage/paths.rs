//! Object path resolution.
//!
//! Clients address private entities as `/objects/<entity_id>`; inside the
//! bucket they live under the private object directory. Public assets are
//! looked up across an ordered list of search paths.

use url::Url;

use objacl_core::error::{AclError, Result};

use super::ObjectBucket;

/// Client-facing prefix of private entity paths.
pub const OBJECTS_PREFIX: &str = "/objects/";

const STORAGE_HOST: &str = "storage.googleapis.com";
const DEFAULT_PRIVATE_DIR: &str = "private";
const DEFAULT_PUBLIC_PATH: &str = "public";

#[derive(Debug, Clone)]
pub struct ObjectPaths {
    bucket: String,
    private_dir: String,
    public_search_paths: Vec<String>,
}

impl ObjectPaths {
    pub fn new(bucket: impl Into<String>, private_dir: &str, public_search_paths: &[String]) -> Self {
        let private_dir = private_dir.trim().trim_end_matches('/');
        let private_dir = if private_dir.is_empty() {
            tracing::warn!("private object dir not configured, using default '{DEFAULT_PRIVATE_DIR}'");
            DEFAULT_PRIVATE_DIR.to_string()
        } else {
            private_dir.to_string()
        };

        let mut paths: Vec<String> = Vec::with_capacity(public_search_paths.len());
        for p in public_search_paths {
            let p = p.trim().trim_end_matches('/');
            if !p.is_empty() && !paths.iter().any(|x| x == p) {
                paths.push(p.to_string());
            }
        }
        if paths.is_empty() {
            tracing::warn!("public object search paths not set, using default '{DEFAULT_PUBLIC_PATH}'");
            paths.push(DEFAULT_PUBLIC_PATH.to_string());
        }

        Self {
            bucket: bucket.into(),
            private_dir,
            public_search_paths: paths,
        }
    }

    pub fn private_dir(&self) -> &str {
        &self.private_dir
    }

    pub fn public_search_paths(&self) -> &[String] {
        &self.public_search_paths
    }

    /// `/objects/<entity_id>` -> `<private_dir>/<entity_id>`.
    ///
    /// Anything else does not name an entity and is reported as not found.
    pub fn entity_name(&self, object_path: &str) -> Result<String> {
        let entity_id = object_path
            .strip_prefix(OBJECTS_PREFIX)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AclError::ObjectNotFound(object_path.to_string()))?;
        Ok(format!("{}/{}", self.private_dir, entity_id))
    }

    /// Turn a storage URL for a private entity back into `/objects/<entity_id>`.
    ///
    /// Inputs that are not storage URLs come back unchanged. A storage URL
    /// outside the private dir comes back as its bucket-relative path.
    pub fn normalize_entity_path(&self, raw: &str) -> String {
        if !raw.contains(STORAGE_HOST) {
            return raw.to_string();
        }

        let url = match Url::parse(raw) {
            Ok(u) => u,
            Err(e) => {
                tracing::warn!(raw = %raw, error = %e, "cannot parse storage url");
                return raw.to_string();
            }
        };

        let mut path = url.path();
        let bucket_prefix = format!("/{}", self.bucket);
        if path.starts_with(&format!("{bucket_prefix}/")) {
            path = &path[bucket_prefix.len()..];
        }

        let dir = format!("{}/", self.private_dir);
        match path.find(&dir) {
            Some(idx) => format!("{OBJECTS_PREFIX}{}", &path[idx + dir.len()..]),
            None => path.to_string(),
        }
    }

    /// First `<search_path>/<file_path>` that exists in `bucket`.
    ///
    /// A failing lookup on one search path is logged and the next one tried.
    pub async fn search_public(&self, bucket: &dyn ObjectBucket, file_path: &str) -> Option<String> {
        for search_path in &self.public_search_paths {
            let full = format!("{search_path}/{file_path}");
            match bucket.exists(&full).await {
                Ok(true) => return Some(full),
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(object = %full, error = %e, "public object lookup failed");
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBucket;

    fn paths() -> ObjectPaths {
        ObjectPaths::new("lokal-bucket", "private/", &["public".into(), " assets ".into(), "public".into()])
    }

    #[test]
    fn defaults_and_dedup() {
        let p = ObjectPaths::new("b", "", &[" ".into()]);
        assert_eq!(p.private_dir(), "private");
        assert_eq!(p.public_search_paths(), &["public".to_string()]);

        let p = paths();
        assert_eq!(p.private_dir(), "private");
        assert_eq!(p.public_search_paths(), &["public".to_string(), "assets".to_string()]);
    }

    #[test]
    fn entity_name_mapping() {
        let p = paths();
        assert_eq!(p.entity_name("/objects/uploads/abc").unwrap(), "private/uploads/abc");
        assert_eq!(p.entity_name("/objects/x").unwrap(), "private/x");

        for bad in ["/objects/", "/objects", "objects/x", "/files/x", ""] {
            let err = p.entity_name(bad).unwrap_err();
            assert_eq!(err.code().as_str(), "OBJECT_NOT_FOUND", "path={bad}");
        }
    }

    #[test]
    fn normalize_storage_url() {
        let p = paths();
        assert_eq!(
            p.normalize_entity_path("https://storage.googleapis.com/lokal-bucket/private/uploads/abc?X-Goog-Signature=1"),
            "/objects/uploads/abc"
        );
        assert_eq!(
            p.normalize_entity_path("https://storage.googleapis.com/lokal-bucket/resumes/u1/r.pdf"),
            "/resumes/u1/r.pdf"
        );
        assert_eq!(p.normalize_entity_path("/objects/abc"), "/objects/abc");
    }

    #[tokio::test]
    async fn search_public_in_order() {
        let p = paths();
        let b = MemoryBucket::new("lokal-bucket");
        b.put("assets/logo.png", vec![1]).await.unwrap();
        assert_eq!(p.search_public(&b, "logo.png").await.as_deref(), Some("assets/logo.png"));

        b.put("public/logo.png", vec![2]).await.unwrap();
        assert_eq!(p.search_public(&b, "logo.png").await.as_deref(), Some("public/logo.png"));

        assert!(p.search_public(&b, "missing.png").await.is_none());
    }
}
