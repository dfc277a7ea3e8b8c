use crate::domain::models::{
    Comment, Like, NewPhoto, NewProfile, Photo, Post, Profile, ProfileChanges,
};
use crate::error::ServiceResult;

/// Store interface for the social graph.
///
/// Every method materializes its result. Writes are atomic: follow and like
/// rely on a unique key with insert-or-ignore, and deletes enumerate their
/// dependents explicitly inside one transaction.
/// Both PostgresSocialRepository and MemorySocialRepository implement this.
#[async_trait::async_trait]
pub trait SocialRepository: Send + Sync {
    // ---- profiles -------------------------------------------------------

    /// Insert a profile. A taken username is a `Validation` error.
    async fn create_profile(&self, new: NewProfile) -> ServiceResult<Profile>;

    async fn get_profile(&self, id: i64) -> ServiceResult<Option<Profile>>;

    /// All profiles ordered by username
    async fn list_profiles(&self) -> ServiceResult<Vec<Profile>>;

    async fn update_profile(
        &self,
        id: i64,
        changes: ProfileChanges,
    ) -> ServiceResult<Option<Profile>>;

    /// Delete a profile with its posts (and their photos, comments, likes),
    /// its follow edges in both directions and the comments and likes it
    /// authored. Returns false when the profile did not exist.
    async fn delete_profile(&self, id: i64) -> ServiceResult<bool>;

    /// Profiles whose username, display name or bio contains `query`,
    /// case-insensitively, ordered by username
    async fn find_profiles_by_text(&self, query: &str) -> ServiceResult<Vec<Profile>>;

    // ---- posts ----------------------------------------------------------

    /// Insert a post together with its photos, in order
    async fn create_post(
        &self,
        profile_id: i64,
        caption: &str,
        photos: Vec<NewPhoto>,
    ) -> ServiceResult<Post>;

    async fn get_post(&self, id: i64) -> ServiceResult<Option<Post>>;

    /// Every post, newest first
    async fn list_posts(&self) -> ServiceResult<Vec<Post>>;

    /// Replace the caption and bump `updated_at`
    async fn update_post_caption(&self, id: i64, caption: &str) -> ServiceResult<Option<Post>>;

    /// Delete a post with its photos, comments and likes
    async fn delete_post(&self, id: i64) -> ServiceResult<bool>;

    /// Posts authored by any of `profile_ids`, newest first
    /// (created_at desc, id desc)
    async fn find_posts_by_authors(&self, profile_ids: &[i64]) -> ServiceResult<Vec<Post>>;

    /// Posts whose caption contains `query`, case-insensitively, newest first
    async fn find_posts_by_caption(&self, query: &str) -> ServiceResult<Vec<Post>>;

    async fn add_photo(&self, post_id: i64, photo: NewPhoto) -> ServiceResult<Photo>;

    /// Photos of a post in insertion order
    async fn photos_for_post(&self, post_id: i64) -> ServiceResult<Vec<Photo>>;

    // ---- follow graph ---------------------------------------------------

    /// Insert-or-ignore the edge follower -> followee.
    /// Returns true if a new edge was created.
    async fn insert_follow(&self, follower_id: i64, followee_id: i64) -> ServiceResult<bool>;

    /// Returns true if an edge was removed
    async fn delete_follow(&self, follower_id: i64, followee_id: i64) -> ServiceResult<bool>;

    async fn is_following(&self, follower_id: i64, followee_id: i64) -> ServiceResult<bool>;

    /// Profiles with an edge into `profile_id`
    async fn find_followers_of(&self, profile_id: i64) -> ServiceResult<Vec<Profile>>;

    /// Profiles `profile_id` has an edge into
    async fn find_following_of(&self, profile_id: i64) -> ServiceResult<Vec<Profile>>;

    // ---- engagement -----------------------------------------------------

    /// Insert-or-ignore a like. Returns true if a new like was created.
    async fn insert_like(&self, post_id: i64, profile_id: i64) -> ServiceResult<bool>;

    async fn delete_like(&self, post_id: i64, profile_id: i64) -> ServiceResult<bool>;

    /// Likes on a post, newest first
    async fn likes_for_post(&self, post_id: i64) -> ServiceResult<Vec<Like>>;

    async fn insert_comment(
        &self,
        post_id: i64,
        profile_id: i64,
        text: &str,
    ) -> ServiceResult<Comment>;

    /// Comments on a post, newest first
    async fn comments_for_post(&self, post_id: i64) -> ServiceResult<Vec<Comment>>;

    /// Health check (optional)
    async fn health_check(&self) -> ServiceResult<()> {
        Ok(())
    }
}
