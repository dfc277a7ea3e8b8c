use crate::domain::models::Profile;
use crate::error::{ServiceError, ServiceResult};
use crate::repository::SocialRepository;
use crate::services::require_profile;
use std::sync::Arc;
use tracing::info;

/// Directed follow graph between profiles
#[derive(Clone)]
pub struct FollowService {
    repo: Arc<dyn SocialRepository>,
}

impl FollowService {
    pub fn new(repo: Arc<dyn SocialRepository>) -> Self {
        Self { repo }
    }

    /// Idempotent follow; returns true if a new edge was created.
    /// Following yourself is rejected.
    pub async fn follow(&self, follower_id: i64, followee_id: i64) -> ServiceResult<bool> {
        require_profile(self.repo.as_ref(), follower_id).await?;
        require_profile(self.repo.as_ref(), followee_id).await?;
        if follower_id == followee_id {
            return Err(ServiceError::Validation(
                "a profile cannot follow itself".to_string(),
            ));
        }

        let created = self.repo.insert_follow(follower_id, followee_id).await?;
        if created {
            info!(follower_id, followee_id, "Follow created");
        }
        Ok(created)
    }

    /// Idempotent unfollow; returns true if an edge was removed
    pub async fn unfollow(&self, follower_id: i64, followee_id: i64) -> ServiceResult<bool> {
        require_profile(self.repo.as_ref(), follower_id).await?;
        require_profile(self.repo.as_ref(), followee_id).await?;

        let removed = self.repo.delete_follow(follower_id, followee_id).await?;
        if removed {
            info!(follower_id, followee_id, "Follow removed");
        }
        Ok(removed)
    }

    pub async fn is_following(&self, follower_id: i64, followee_id: i64) -> ServiceResult<bool> {
        self.repo.is_following(follower_id, followee_id).await
    }

    /// Profiles following `profile_id`
    pub async fn followers_of(&self, profile_id: i64) -> ServiceResult<Vec<Profile>> {
        require_profile(self.repo.as_ref(), profile_id).await?;
        self.repo.find_followers_of(profile_id).await
    }

    /// Profiles `profile_id` follows
    pub async fn following_of(&self, profile_id: i64) -> ServiceResult<Vec<Profile>> {
        require_profile(self.repo.as_ref(), profile_id).await?;
        self.repo.find_following_of(profile_id).await
    }
}
