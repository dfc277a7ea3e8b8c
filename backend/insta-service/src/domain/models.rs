use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Profile entity - a user identity record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    pub bio_text: String,
    pub profile_image_url: String,
    pub join_date: DateTime<Utc>,
}

/// Fields required to create a profile
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub username: String,
    pub display_name: String,
    pub bio_text: String,
    pub profile_image_url: String,
}

/// Partial profile update; the username is not editable
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub display_name: Option<String>,
    pub bio_text: Option<String>,
    pub profile_image_url: Option<String>,
}

impl ProfileChanges {
    pub fn apply(&self, profile: &mut Profile) {
        if let Some(display_name) = &self.display_name {
            profile.display_name = display_name.clone();
        }
        if let Some(bio_text) = &self.bio_text {
            profile.bio_text = bio_text.clone();
        }
        if let Some(url) = &self.profile_image_url {
            profile.profile_image_url = url.clone();
        }
    }
}

/// Post entity - content owned by exactly one profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub profile_id: i64,
    pub caption: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Photo entity - an image attached to a post
///
/// A photo carries a remote URL, a stored file reference, or both. When both
/// are present the stored file wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Photo {
    pub id: i64,
    pub post_id: i64,
    pub image_url: Option<String>,
    pub image_file: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Photo {
    /// URL to display for this photo
    pub fn display_url(&self) -> Option<&str> {
        self.image_file
            .as_deref()
            .filter(|f| !f.is_empty())
            .or_else(|| self.image_url.as_deref().filter(|u| !u.is_empty()))
    }
}

/// Source of a photo being attached to a post
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewPhoto {
    /// Remote image referenced by URL
    Url(String),
    /// Reference returned by media storage for uploaded bytes
    File(String),
}

impl NewPhoto {
    pub fn image_url(&self) -> Option<&str> {
        match self {
            NewPhoto::Url(url) => Some(url),
            NewPhoto::File(_) => None,
        }
    }

    pub fn image_file(&self) -> Option<&str> {
        match self {
            NewPhoto::Url(_) => None,
            NewPhoto::File(reference) => Some(reference),
        }
    }
}

/// Directed follow edge: follower receives followee's posts in their feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Follow {
    pub follower_id: i64,
    pub followee_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Comment entity - append-only text attached to a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub profile_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Like entity - at most one per (post, profile)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Like {
    pub id: i64,
    pub post_id: i64,
    pub profile_id: i64,
    pub created_at: DateTime<Utc>,
}

/// A post with everything attached to it
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: Post,
    pub author: Profile,
    pub photos: Vec<Photo>,
    pub comments: Vec<Comment>,
    pub likes: Vec<Like>,
}

/// A profile page: the profile, its posts and graph counts
#[derive(Debug, Clone, Serialize)]
pub struct ProfileSummary {
    pub profile: Profile,
    pub posts: Vec<Post>,
    pub follower_count: usize,
    pub following_count: usize,
}

/// Search results across posts and profiles
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub posts: Vec<Post>,
    pub profiles: Vec<Profile>,
}

/// Newest first: creation time descending, ties broken by id descending
pub fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}
