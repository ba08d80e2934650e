//! Content asset serving with a placeholder for anything unresolvable.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use mime_guess::Mime;
use tracing::debug;

const SOURCE: &str = "folio::assets";

static PLACEHOLDER_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="640" height="360" viewBox="0 0 640 360" role="img" aria-label="Image unavailable"><rect width="640" height="360" fill="#e5e7eb"/><path d="M250 230l50-60 40 45 30-30 60 45z" fill="#9ca3af"/><circle cx="265" cy="140" r="22" fill="#9ca3af"/><text x="320" y="300" font-family="sans-serif" font-size="20" text-anchor="middle" fill="#6b7280">Image unavailable</text></svg>"##;

/// Bytes plus content type, ready to be written to a response.
#[derive(Debug, Clone)]
pub struct Asset {
    pub bytes: Bytes,
    pub mime: Mime,
    pub placeholder: bool,
}

impl Asset {
    pub fn placeholder() -> Self {
        Self {
            bytes: Bytes::from_static(PLACEHOLDER_SVG.as_bytes()),
            mime: mime_guess::mime::IMAGE_SVG,
            placeholder: true,
        }
    }
}

/// Resolves asset references; never fails, falling back to the placeholder.
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn load(&self, reference: &str) -> Asset;
}

/// Serves files beneath a single root directory.
#[derive(Debug, Clone)]
pub struct FsAssetStore {
    root: PathBuf,
}

impl FsAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, reference: &str) -> Option<PathBuf> {
        let candidate = reference.trim_start_matches('/');
        if candidate.is_empty() || candidate.ends_with('/') {
            return None;
        }

        let relative = Path::new(candidate);
        // Only plain segments; no parent hops, roots or drive prefixes.
        if !relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
        {
            return None;
        }

        Some(self.root.join(relative))
    }
}

#[async_trait]
impl AssetStore for FsAssetStore {
    async fn load(&self, reference: &str) -> Asset {
        let Some(path) = self.resolve(reference) else {
            debug!(target: SOURCE, reference, "rejected asset reference");
            return Asset::placeholder();
        };

        match tokio::fs::read(&path).await {
            Ok(contents) => Asset {
                bytes: Bytes::from(contents),
                mime: mime_guess::from_path(&path).first_or_octet_stream(),
                placeholder: false,
            },
            Err(err) => {
                debug!(
                    target: SOURCE,
                    reference,
                    error = %err,
                    "asset unavailable, serving placeholder"
                );
                Asset::placeholder()
            }
        }
    }
}

impl IntoResponse for Asset {
    fn into_response(self) -> Response {
        let cache_control = if self.placeholder {
            HeaderValue::from_static("no-store")
        } else {
            HeaderValue::from_static("public, max-age=3600")
        };
        build_response(self.bytes, &self.mime, cache_control)
    }
}

fn build_response(bytes: Bytes, mime: &Mime, cache_control: HeaderValue) -> Response {
    let len = bytes.len();
    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = StatusCode::OK;

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(mime.as_ref()) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    if let Ok(value) = HeaderValue::from_str(&len.to_string()) {
        headers.insert(header::CONTENT_LENGTH, value);
    }
    headers.insert(header::CACHE_CONTROL, cache_control);

    response
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn store_with(files: &[(&str, &[u8])]) -> (tempfile::TempDir, FsAssetStore) {
        let dir = tempfile::tempdir().expect("temp dir");
        for (name, contents) in files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("create parent");
            }
            fs::write(path, contents).expect("write asset");
        }
        let store = FsAssetStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn serves_existing_files_with_guessed_type() {
        let (_dir, store) = store_with(&[("img/churn.png", b"\x89PNG")]);
        let asset = store.load("img/churn.png").await;
        assert!(!asset.placeholder);
        assert_eq!(asset.mime.as_ref(), "image/png");
        assert_eq!(asset.bytes.as_ref(), b"\x89PNG");
    }

    #[tokio::test]
    async fn missing_files_fall_back_to_placeholder() {
        let (_dir, store) = store_with(&[]);
        let asset = store.load("img/nope.png").await;
        assert!(asset.placeholder);
        assert_eq!(asset.mime.as_ref(), "image/svg+xml");
    }

    #[tokio::test]
    async fn traversal_is_rejected() {
        let (_dir, store) = store_with(&[("site.css", b"body{}")]);
        assert!(store.load("../secret.txt").await.placeholder);
        assert!(store.load("img/../../secret.txt").await.placeholder);
        assert!(store.load("").await.placeholder);
        assert!(!store.load("/site.css").await.placeholder);
    }

    #[test]
    fn placeholder_responses_are_not_cached() {
        let response = Asset::placeholder().into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL),
            Some(&HeaderValue::from_static("no-store"))
        );
    }
}
