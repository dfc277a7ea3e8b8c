//! Uploaded photo storage
//!
//! The service only needs "store these bytes, give me a URL back".

mod local;

pub use local::LocalMediaStorage;

use crate::error::ServiceResult;

#[async_trait::async_trait]
pub trait MediaStorage: Send + Sync {
    /// Persist `bytes` under a name derived from `file_name` and return the
    /// URL the stored file can be retrieved from
    async fn store(&self, file_name: &str, bytes: &[u8]) -> ServiceResult<String>;

    /// Delete a file previously returned by `store`. Removing a file that is
    /// already gone succeeds.
    async fn remove(&self, reference: &str) -> ServiceResult<()>;
}

/// Keep only characters that are safe in a single path segment
pub(crate) fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
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
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}
