use crate::domain::models::{NewPhoto, Photo, Post, PostDetail};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::SocialRepository;
use crate::services::{choose_random, require_post, require_profile};
use crate::storage::MediaStorage;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePostInput {
    #[serde(default)]
    pub caption: String,
    /// Remote image URLs, attached in order
    #[serde(default)]
    pub photo_urls: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePostInput {
    pub caption: String,
}

/// A file received with a request, not yet stored
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddPhotoInput {
    #[validate(url)]
    pub url: String,
}

fn check_photo_url(url: &str) -> ServiceResult<()> {
    AddPhotoInput {
        url: url.to_string(),
    }
    .validate()
    .map_err(|_| ServiceError::Validation(format!("invalid photo url '{}'", url)))
}

/// Posts and their photos
#[derive(Clone)]
pub struct PostService {
    repo: Arc<dyn SocialRepository>,
    media: Arc<dyn MediaStorage>,
}

impl PostService {
    pub fn new(repo: Arc<dyn SocialRepository>, media: Arc<dyn MediaStorage>) -> Self {
        Self { repo, media }
    }

    /// Create a post for `profile_id` with its photos in one write.
    /// An empty caption with no photos is accepted.
    pub async fn create_post(&self, profile_id: i64, input: CreatePostInput) -> ServiceResult<Post> {
        for url in &input.photo_urls {
            check_photo_url(url)?;
        }
        require_profile(self.repo.as_ref(), profile_id).await?;

        let photos = input.photo_urls.into_iter().map(NewPhoto::Url).collect();
        let post = self.repo.create_post(profile_id, &input.caption, photos).await?;
        info!(post_id = post.id, profile_id, "Post created");
        Ok(post)
    }

    /// Store every file, then create the post with all of them attached in
    /// one write. Nothing is left behind in media storage on failure.
    pub async fn create_post_with_uploads(
        &self,
        profile_id: i64,
        caption: &str,
        files: Vec<UploadedFile>,
    ) -> ServiceResult<Post> {
        require_profile(self.repo.as_ref(), profile_id).await?;

        let mut references = Vec::with_capacity(files.len());
        for file in &files {
            match self.media.store(&file.file_name, &file.bytes).await {
                Ok(reference) => references.push(reference),
                Err(e) => {
                    self.discard_stored(&references).await;
                    return Err(e);
                }
            }
        }

        let photos = references.iter().cloned().map(NewPhoto::File).collect();
        match self.repo.create_post(profile_id, caption, photos).await {
            Ok(post) => {
                info!(
                    post_id = post.id,
                    profile_id,
                    photos = references.len(),
                    "Post created with uploads"
                );
                Ok(post)
            }
            Err(e) => {
                self.discard_stored(&references).await;
                Err(e)
            }
        }
    }

    async fn discard_stored(&self, references: &[String]) {
        for reference in references {
            if let Err(e) = self.media.remove(reference).await {
                warn!(reference = %reference, error = %e, "Failed to remove orphaned upload");
            }
        }
    }

    pub async fn get_post(&self, post_id: i64) -> ServiceResult<Post> {
        require_post(self.repo.as_ref(), post_id).await
    }

    /// The post with its author, photos, comments and likes
    pub async fn post_detail(&self, post_id: i64) -> ServiceResult<PostDetail> {
        let post = require_post(self.repo.as_ref(), post_id).await?;
        let author = require_profile(self.repo.as_ref(), post.profile_id).await?;
        let photos = self.repo.photos_for_post(post_id).await?;
        let comments = self.repo.comments_for_post(post_id).await?;
        let likes = self.repo.likes_for_post(post_id).await?;

        Ok(PostDetail {
            post,
            author,
            photos,
            comments,
            likes,
        })
    }

    /// Posts by one profile, newest first
    pub async fn posts_by(&self, profile_id: i64) -> ServiceResult<Vec<Post>> {
        require_profile(self.repo.as_ref(), profile_id).await?;
        self.repo.find_posts_by_authors(&[profile_id]).await
    }

    /// Only the caption is editable
    pub async fn update_post(&self, post_id: i64, input: UpdatePostInput) -> ServiceResult<Post> {
        self.repo
            .update_post_caption(post_id, &input.caption)
            .await?
            .ok_or_else(|| ServiceError::post_not_found(post_id))
    }

    /// Delete a post with its photos, comments and likes
    pub async fn delete_post(&self, post_id: i64) -> ServiceResult<()> {
        if !self.repo.delete_post(post_id).await? {
            return Err(ServiceError::post_not_found(post_id));
        }
        info!(post_id, "Post deleted");
        Ok(())
    }

    pub async fn add_photo_url(&self, post_id: i64, url: &str) -> ServiceResult<Photo> {
        check_photo_url(url)?;
        require_post(self.repo.as_ref(), post_id).await?;
        self.repo.add_photo(post_id, NewPhoto::Url(url.to_string())).await
    }

    /// Store uploaded bytes and attach the stored file to the post
    pub async fn upload_photo(
        &self,
        post_id: i64,
        file_name: &str,
        bytes: &[u8],
    ) -> ServiceResult<Photo> {
        require_post(self.repo.as_ref(), post_id).await?;
        let reference = self.media.store(file_name, bytes).await?;
        match self.repo.add_photo(post_id, NewPhoto::File(reference.clone())).await {
            Ok(photo) => {
                info!(post_id, photo_id = photo.id, "Photo uploaded");
                Ok(photo)
            }
            Err(e) => {
                self.discard_stored(std::slice::from_ref(&reference)).await;
                Err(e)
            }
        }
    }

    pub async fn photos_for(&self, post_id: i64) -> ServiceResult<Vec<Photo>> {
        require_post(self.repo.as_ref(), post_id).await?;
        self.repo.photos_for_post(post_id).await
    }

    /// A uniformly random post, or None when there are no posts
    pub async fn random_post(&self) -> ServiceResult<Option<Post>> {
        let posts = self.repo.list_posts().await?;
        let picked = {
            let mut rng = rand::thread_rng();
            choose_random(&posts, &mut rng).cloned()
        };
        Ok(picked)
    }
}
