use super::{sanitize_file_name, MediaStorage};
use crate::error::{ServiceError, ServiceResult};
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

/// Writes uploads to a local directory served under `base_url`
#[derive(Debug, Clone)]
pub struct LocalMediaStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalMediaStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            root: root.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait::async_trait]
impl MediaStorage for LocalMediaStorage {
    async fn store(&self, file_name: &str, bytes: &[u8]) -> ServiceResult<String> {
        if bytes.is_empty() {
            return Err(ServiceError::Validation("uploaded file is empty".to_string()));
        }

        let stored_name = format!("{}-{}", Uuid::new_v4().simple(), sanitize_file_name(file_name));
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(&stored_name), bytes).await?;

        info!(
            file = %stored_name,
            size = bytes.len(),
            "Stored uploaded photo"
        );
        Ok(format!("{}/{}", self.base_url, stored_name))
    }

    async fn remove(&self, reference: &str) -> ServiceResult<()> {
        let stored_name = reference
            .strip_prefix(&self.base_url)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|name| !name.is_empty() && sanitize_file_name(name) == *name)
            .ok_or_else(|| {
                ServiceError::Validation(format!("'{}' is not a stored media file", reference))
            })?;

        match tokio::fs::remove_file(self.root.join(stored_name)).await {
            Ok(()) => {
                info!(file = %stored_name, "Removed stored photo");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
