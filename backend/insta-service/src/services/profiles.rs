use crate::domain::models::{NewProfile, Profile, ProfileChanges, ProfileSummary};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::SocialRepository;
use crate::services::require_profile;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProfileInput {
    #[validate(length(min = 1, max = 30))]
    pub username: String,
    #[validate(length(min = 1, max = 50))]
    pub display_name: String,
    #[serde(default)]
    pub bio_text: String,
    #[validate(url)]
    pub profile_image_url: Option<String>,
}

/// Editable profile fields; the username is fixed at creation
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 50))]
    pub display_name: Option<String>,
    pub bio_text: Option<String>,
    #[validate(url)]
    pub profile_image_url: Option<String>,
}

#[derive(Clone)]
pub struct ProfileService {
    repo: Arc<dyn SocialRepository>,
}

impl ProfileService {
    pub fn new(repo: Arc<dyn SocialRepository>) -> Self {
        Self { repo }
    }

    pub async fn create_profile(&self, input: CreateProfileInput) -> ServiceResult<Profile> {
        let input = CreateProfileInput {
            username: input.username.trim().to_string(),
            display_name: input.display_name.trim().to_string(),
            ..input
        };
        input.validate()?;

        let profile = self
            .repo
            .create_profile(NewProfile {
                username: input.username,
                display_name: input.display_name,
                bio_text: input.bio_text,
                profile_image_url: input.profile_image_url.unwrap_or_default(),
            })
            .await?;

        info!(profile_id = profile.id, username = %profile.username, "Profile created");
        Ok(profile)
    }

    pub async fn get_profile(&self, profile_id: i64) -> ServiceResult<Profile> {
        require_profile(self.repo.as_ref(), profile_id).await
    }

    pub async fn list_profiles(&self) -> ServiceResult<Vec<Profile>> {
        self.repo.list_profiles().await
    }

    pub async fn update_profile(
        &self,
        profile_id: i64,
        input: UpdateProfileInput,
    ) -> ServiceResult<Profile> {
        let input = UpdateProfileInput {
            display_name: input.display_name.map(|d| d.trim().to_string()),
            ..input
        };
        input.validate()?;
        self.repo
            .update_profile(
                profile_id,
                ProfileChanges {
                    display_name: input.display_name,
                    bio_text: input.bio_text,
                    profile_image_url: input.profile_image_url,
                },
            )
            .await?
            .ok_or_else(|| ServiceError::profile_not_found(profile_id))
    }

    /// Delete a profile and everything that depends on it
    pub async fn delete_profile(&self, profile_id: i64) -> ServiceResult<()> {
        if !self.repo.delete_profile(profile_id).await? {
            return Err(ServiceError::profile_not_found(profile_id));
        }
        info!(profile_id, "Profile deleted");
        Ok(())
    }

    /// Profile page: the profile, its posts newest first and graph counts
    pub async fn profile_summary(&self, profile_id: i64) -> ServiceResult<ProfileSummary> {
        let profile = require_profile(self.repo.as_ref(), profile_id).await?;
        let posts = self.repo.find_posts_by_authors(&[profile_id]).await?;
        let follower_count = self.repo.find_followers_of(profile_id).await?.len();
        let following_count = self.repo.find_following_of(profile_id).await?.len();

        Ok(ProfileSummary {
            profile,
            posts,
            follower_count,
            following_count,
        })
    }
}
