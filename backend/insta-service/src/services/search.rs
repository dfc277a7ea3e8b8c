use crate::domain::models::{Post, Profile, SearchResults};
use crate::error::ServiceResult;
use crate::repository::SocialRepository;
use std::sync::Arc;

/// Case-insensitive substring search over captions and profile text.
/// A blank query matches nothing.
#[derive(Clone)]
pub struct SearchService {
    repo: Arc<dyn SocialRepository>,
}

impl SearchService {
    pub fn new(repo: Arc<dyn SocialRepository>) -> Self {
        Self { repo }
    }

    pub async fn search_posts(&self, query: &str) -> ServiceResult<Vec<Post>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.repo.find_posts_by_caption(query).await
    }

    /// Matches username OR display name OR bio
    pub async fn search_profiles(&self, query: &str) -> ServiceResult<Vec<Profile>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.repo.find_profiles_by_text(query).await
    }

    pub async fn search(&self, query: &str) -> ServiceResult<SearchResults> {
        Ok(SearchResults {
            query: query.trim().to_string(),
            posts: self.search_posts(query).await?,
            profiles: self.search_profiles(query).await?,
        })
    }
}
