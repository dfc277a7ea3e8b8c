use crate::domain::models::{Comment, Like};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::SocialRepository;
use crate::services::{require_post, require_profile};
use std::sync::Arc;
use tracing::info;

/// Likes and comments on posts
#[derive(Clone)]
pub struct EngagementService {
    repo: Arc<dyn SocialRepository>,
}

impl EngagementService {
    pub fn new(repo: Arc<dyn SocialRepository>) -> Self {
        Self { repo }
    }

    async fn require_pair(&self, post_id: i64, profile_id: i64) -> ServiceResult<()> {
        require_post(self.repo.as_ref(), post_id).await?;
        require_profile(self.repo.as_ref(), profile_id).await?;
        Ok(())
    }

    /// Idempotent like; returns true if a new like was recorded
    pub async fn like(&self, post_id: i64, profile_id: i64) -> ServiceResult<bool> {
        self.require_pair(post_id, profile_id).await?;
        let created = self.repo.insert_like(post_id, profile_id).await?;
        if created {
            info!(post_id, profile_id, "Post liked");
        }
        Ok(created)
    }

    /// Idempotent unlike; returns true if a like was removed
    pub async fn unlike(&self, post_id: i64, profile_id: i64) -> ServiceResult<bool> {
        self.require_pair(post_id, profile_id).await?;
        self.repo.delete_like(post_id, profile_id).await
    }

    /// Append a comment; duplicates are allowed
    pub async fn comment(
        &self,
        post_id: i64,
        profile_id: i64,
        text: &str,
    ) -> ServiceResult<Comment> {
        if text.trim().is_empty() {
            return Err(ServiceError::Validation("comment text is required".to_string()));
        }
        self.require_pair(post_id, profile_id).await?;
        let comment = self.repo.insert_comment(post_id, profile_id, text).await?;
        info!(post_id, profile_id, comment_id = comment.id, "Comment added");
        Ok(comment)
    }

    pub async fn likes_for(&self, post_id: i64) -> ServiceResult<Vec<Like>> {
        require_post(self.repo.as_ref(), post_id).await?;
        self.repo.likes_for_post(post_id).await
    }

    /// Newest first
    pub async fn comments_for(&self, post_id: i64) -> ServiceResult<Vec<Comment>> {
        require_post(self.repo.as_ref(), post_id).await?;
        self.repo.comments_for_post(post_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::NewProfile;
    use crate::repository::MemorySocialRepository;

    async fn setup() -> (EngagementService, i64, i64) {
        let repo: Arc<dyn SocialRepository> = Arc::new(MemorySocialRepository::new());
        let profile = repo
            .create_profile(NewProfile {
                username: "carol".to_string(),
                display_name: "Carol".to_string(),
                bio_text: String::new(),
                profile_image_url: String::new(),
            })
            .await
            .unwrap();
        let post = repo.create_post(profile.id, "lunch", Vec::new()).await.unwrap();
        (EngagementService::new(repo), post.id, profile.id)
    }

    #[tokio::test]
    async fn test_like_twice_then_unlike() {
        let (service, post, profile) = setup().await;

        assert!(service.like(post, profile).await.unwrap());
        assert!(!service.like(post, profile).await.unwrap());
        assert_eq!(service.likes_for(post).await.unwrap().len(), 1);

        assert!(service.unlike(post, profile).await.unwrap());
        assert!(service.likes_for(post).await.unwrap().is_empty());
        assert!(!service.unlike(post, profile).await.unwrap());
    }

    #[tokio::test]
    async fn test_comments_append_duplicates_newest_first() {
        let (service, post, profile) = setup().await;

        let first = service.comment(post, profile, "nice").await.unwrap();
        let second = service.comment(post, profile, "nice").await.unwrap();

        let comments = service.comments_for(post).await.unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].id, second.id);
        assert_eq!(comments[1].id, first.id);
    }

    #[tokio::test]
    async fn test_like_missing_post_is_not_found() {
        let (service, _, profile) = setup().await;
        let err = service.like(12345, profile).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
