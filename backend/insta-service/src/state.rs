use crate::repository::SocialRepository;
use crate::services::{
    EngagementService, FeedService, FollowService, PostService, ProfileService, SearchService,
};
use crate::storage::MediaStorage;
use std::sync::Arc;

/// Shared handler state; every service wraps the same repository
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn SocialRepository>,
    pub profiles: ProfileService,
    pub posts: PostService,
    pub follows: FollowService,
    pub feed: FeedService,
    pub search: SearchService,
    pub engagement: EngagementService,
}

impl AppState {
    pub fn new(repo: Arc<dyn SocialRepository>, media: Arc<dyn MediaStorage>) -> Self {
        Self {
            profiles: ProfileService::new(repo.clone()),
            posts: PostService::new(repo.clone(), media),
            follows: FollowService::new(repo.clone()),
            feed: FeedService::new(repo.clone()),
            search: SearchService::new(repo.clone()),
            engagement: EngagementService::new(repo.clone()),
            repo,
        }
    }
}
