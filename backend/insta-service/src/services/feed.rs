use crate::domain::models::Post;
use crate::error::ServiceResult;
use crate::repository::SocialRepository;
use crate::services::require_profile;
use std::sync::Arc;
use tracing::debug;

/// Composes a profile's feed from the posts of everyone it follows
#[derive(Clone)]
pub struct FeedService {
    repo: Arc<dyn SocialRepository>,
}

impl FeedService {
    pub fn new(repo: Arc<dyn SocialRepository>) -> Self {
        Self { repo }
    }

    /// Posts authored by the profiles `profile_id` follows, newest first
    /// (created_at desc, then id desc). Recomputed on every call.
    pub async fn feed_for(&self, profile_id: i64) -> ServiceResult<Vec<Post>> {
        require_profile(self.repo.as_ref(), profile_id).await?;

        let authors: Vec<i64> = self
            .repo
            .find_following_of(profile_id)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();

        let posts = self.repo.find_posts_by_authors(&authors).await?;
        debug!(
            profile_id,
            followees = authors.len(),
            posts = posts.len(),
            "Composed feed"
        );
        Ok(posts)
    }
}
