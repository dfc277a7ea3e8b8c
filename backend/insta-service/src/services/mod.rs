pub mod engagement;
pub mod feed;
pub mod follow;
pub mod posts;
pub mod profiles;
pub mod random;
pub mod search;

pub use engagement::EngagementService;
pub use feed::FeedService;
pub use follow::FollowService;
pub use posts::{AddPhotoInput, CreatePostInput, PostService, UpdatePostInput, UploadedFile};
pub use profiles::{CreateProfileInput, ProfileService, UpdateProfileInput};
pub use random::choose_random;
pub use search::SearchService;

use crate::domain::models::{Post, Profile};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::SocialRepository;

/// Load a profile or fail with NotFound
pub(crate) async fn require_profile(
    repo: &dyn SocialRepository,
    profile_id: i64,
) -> ServiceResult<Profile> {
    repo.get_profile(profile_id)
        .await?
        .ok_or_else(|| ServiceError::profile_not_found(profile_id))
}

/// Load a post or fail with NotFound
pub(crate) async fn require_post(repo: &dyn SocialRepository, post_id: i64) -> ServiceResult<Post> {
    repo.get_post(post_id)
        .await?
        .ok_or_else(|| ServiceError::post_not_found(post_id))
}
