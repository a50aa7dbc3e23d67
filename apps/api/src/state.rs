use std::sync::Arc;

use crate::candidates::store::CandidateStore;
use crate::config::Config;
use crate::uploads::{LocalResumeStorage, ResumeStorage};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CandidateStore>,
    /// Resume file storage. Default: LocalResumeStorage rooted at `config.upload_dir`.
    pub resumes: Arc<dyn ResumeStorage>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let resumes = LocalResumeStorage::new(config.upload_dir.clone(), config.max_upload_bytes);
        AppState {
            store: Arc::new(CandidateStore::new(config.store_lock_timeout)),
            resumes: Arc::new(resumes),
            config,
        }
    }
}
