//! Purchase storage.
//!
//! Every purchase owns one directory, `generated/purchases/<purchase_id>`,
//! under the public-serving root. Generated files and the `meta.json`
//! manifest live there and are served back through `/generated`.

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::purchase::models::PurchaseMeta;

pub const PURCHASES_DIR: &str = "generated/purchases";
pub const META_FILE: &str = "meta.json";

lazy_static! {
    static ref PURCHASE_ID_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]{1,96}$").expect("valid regex");
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid purchase id '{0}'")]
    InvalidPurchaseId(String),
    #[error("invalid file name '{0}'")]
    InvalidFileName(String),
    #[error("purchase '{0}' not found")]
    NotFound(String),
    #[error("storage I/O failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("purchase manifest is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn validate_purchase_id(purchase_id: &str) -> Result<(), StorageError> {
    if PURCHASE_ID_RE.is_match(purchase_id) {
        Ok(())
    } else {
        Err(StorageError::InvalidPurchaseId(purchase_id.to_string()))
    }
}

pub fn validate_file_name(file_name: &str) -> Result<(), StorageError> {
    let sanitized = sanitize_filename::sanitize(file_name);
    if file_name.is_empty() || sanitized != file_name || file_name.starts_with('.') {
        return Err(StorageError::InvalidFileName(file_name.to_string()));
    }
    Ok(())
}

/// Web path for a file of a purchase.
pub fn served_path(purchase_id: &str, file_name: &str) -> String {
    format!("/{PURCHASES_DIR}/{purchase_id}/{file_name}")
}

/// Storage seam for generated purchases.
#[async_trait]
pub trait PurchaseStore: Send + Sync {
    /// Write `content` as `file_name` for the purchase and return its
    /// web-servable path. Overwrites an existing file with the same name.
    async fn write_purchase_file(
        &self,
        purchase_id: &str,
        file_name: &str,
        content: &[u8],
    ) -> Result<String, StorageError>;

    /// Persist the manifest as pretty-printed `meta.json`.
    async fn write_purchase_meta(&self, meta: &PurchaseMeta) -> Result<String, StorageError> {
        let json = serde_json::to_vec_pretty(meta)?;
        self.write_purchase_file(&meta.input.purchase_id, META_FILE, &json)
            .await
    }

    async fn read_purchase_meta(&self, purchase_id: &str) -> Result<PurchaseMeta, StorageError>;
}

/// Filesystem-backed store rooted at the public directory.
#[derive(Debug, Clone)]
pub struct LocalPurchaseStore {
    public_dir: PathBuf,
}

impl LocalPurchaseStore {
    pub fn new(public_dir: impl Into<PathBuf>) -> Self {
        Self {
            public_dir: public_dir.into(),
        }
    }

    pub fn public_dir(&self) -> &Path {
        &self.public_dir
    }

    pub fn purchase_dir(&self, purchase_id: &str) -> PathBuf {
        self.public_dir.join(PURCHASES_DIR).join(purchase_id)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[async_trait]
impl PurchaseStore for LocalPurchaseStore {
    async fn write_purchase_file(
        &self,
        purchase_id: &str,
        file_name: &str,
        content: &[u8],
    ) -> Result<String, StorageError> {
        validate_purchase_id(purchase_id)?;
        validate_file_name(file_name)?;

        let dir = self.purchase_dir(purchase_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| io_error(&dir, e))?;

        let path = dir.join(file_name);
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| io_error(&path, e))?;

        log::debug!("Wrote {} ({} bytes)", path.display(), content.len());
        Ok(served_path(purchase_id, file_name))
    }

    async fn read_purchase_meta(&self, purchase_id: &str) -> Result<PurchaseMeta, StorageError> {
        validate_purchase_id(purchase_id)?;

        let path = self.purchase_dir(purchase_id).join(META_FILE);
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(purchase_id.to_string()))
            }
            Err(e) => return Err(io_error(&path, e)),
        };
        Ok(serde_json::from_slice(&raw)?)
    }
}
