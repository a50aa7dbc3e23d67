//! Resume file persistence.
//!
//! The store only keeps a path string; this module owns validation, naming
//! and the bytes on disk behind that path.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;

pub const ALLOWED_EXTENSIONS: &[&str] = &[".pdf", ".doc", ".docx"];

#[async_trait]
pub trait ResumeStorage: Send + Sync {
    /// Validates and persists an uploaded resume, returning its path.
    async fn save(
        &self,
        candidate_name: &str,
        original_filename: &str,
        content: Bytes,
    ) -> Result<String, AppError>;

    /// Removes a stored resume. `Ok(false)` if nothing was there.
    async fn delete(&self, path: &str) -> Result<bool, AppError>;
}

/// Stores resumes as files under a local directory.
pub struct LocalResumeStorage {
    root: PathBuf,
    max_bytes: usize,
}

impl LocalResumeStorage {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }
}

#[async_trait]
impl ResumeStorage for LocalResumeStorage {
    async fn save(
        &self,
        candidate_name: &str,
        original_filename: &str,
        content: Bytes,
    ) -> Result<String, AppError> {
        let ext = validate_upload(original_filename, content.len(), self.max_bytes)?;
        let path = self.root.join(resume_file_name(candidate_name, &ext));

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| AppError::Storage(format!("create {}: {e}", self.root.display())))?;
        tokio::fs::write(&path, &content)
            .await
            .map_err(|e| AppError::Storage(format!("write {}: {e}", path.display())))?;

        info!("Saved resume {} ({} bytes)", path.display(), content.len());
        Ok(path.to_string_lossy().into_owned())
    }

    async fn delete(&self, path: &str) -> Result<bool, AppError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                debug!("Deleted resume {path}");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::Storage(format!("delete {path}: {e}"))),
        }
    }
}

/// Checks extension and size, returning the lowercased extension with its dot.
pub fn validate_upload(filename: &str, size: usize, max_bytes: usize) -> Result<String, AppError> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default();

    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(AppError::UnsupportedFileType(if ext.is_empty() {
            filename.to_string()
        } else {
            ext
        }));
    }
    if size > max_bytes {
        return Err(AppError::FileTooLarge { max_bytes });
    }
    Ok(ext)
}

/// Keeps alphanumerics and whitespace, then turns spaces into underscores.
pub fn safe_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .replace(' ', "_")
}

/// `{safe_name}_{YYYYmmdd_HHMMSS}_{8 hex chars}{ext}`
fn resume_file_name(candidate_name: &str, ext: &str) -> String {
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let unique = Uuid::new_v4().simple().to_string();
    format!("{}_{timestamp}_{}{ext}", safe_name(candidate_name), &unique[..8])
}
