use crate::domain::models::{
    sort_newest_first, Comment, Follow, Like, NewPhoto, NewProfile, Photo, Post, Profile,
    ProfileChanges,
};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::SocialRepository;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tokio::sync::RwLock;

#[derive(Default)]
struct MemoryState {
    next_id: i64,
    profiles: BTreeMap<i64, Profile>,
    posts: BTreeMap<i64, Post>,
    photos: BTreeMap<i64, Photo>,
    comments: BTreeMap<i64, Comment>,
    likes: BTreeMap<i64, Like>,
    /// Keyed by (follower_id, followee_id)
    follows: BTreeMap<(i64, i64), Follow>,
    /// Unique key for likes: (post_id, profile_id)
    like_keys: BTreeSet<(i64, i64)>,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn remove_post_dependents(&mut self, post_ids: &HashSet<i64>) {
        self.photos.retain(|_, p| !post_ids.contains(&p.post_id));
        self.comments.retain(|_, c| !post_ids.contains(&c.post_id));
        self.likes.retain(|_, l| !post_ids.contains(&l.post_id));
        self.like_keys.retain(|(post_id, _)| !post_ids.contains(post_id));
    }

    fn require_profile(&self, id: i64) -> ServiceResult<()> {
        if self.profiles.contains_key(&id) {
            Ok(())
        } else {
            Err(ServiceError::profile_not_found(id))
        }
    }

    fn require_post(&self, id: i64) -> ServiceResult<()> {
        if self.posts.contains_key(&id) {
            Ok(())
        } else {
            Err(ServiceError::post_not_found(id))
        }
    }

    fn profiles_by_id(&self, ids: impl Iterator<Item = i64>) -> Vec<Profile> {
        ids.filter_map(|id| self.profiles.get(&id).cloned()).collect()
    }

    fn edges_in_creation_order(&self, matches: impl Fn(&Follow) -> bool) -> Vec<&Follow> {
        let mut edges: Vec<&Follow> = self.follows.values().filter(|f| matches(*f)).collect();
        edges.sort_by_key(|f| f.created_at);
        edges
    }
}

fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// In-memory repository.
///
/// One lock guards the whole state, so each write is atomic. Ids come from a
/// single increasing counter shared by every entity.
#[derive(Default)]
pub struct MemorySocialRepository {
    state: RwLock<MemoryState>,
}

impl MemorySocialRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SocialRepository for MemorySocialRepository {
    async fn create_profile(&self, new: NewProfile) -> ServiceResult<Profile> {
        let mut state = self.state.write().await;
        if state.profiles.values().any(|p| p.username == new.username) {
            return Err(ServiceError::Validation(format!(
                "username '{}' is already taken",
                new.username
            )));
        }

        let profile = Profile {
            id: state.next_id(),
            username: new.username,
            display_name: new.display_name,
            bio_text: new.bio_text,
            profile_image_url: new.profile_image_url,
            join_date: Utc::now(),
        };
        state.profiles.insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn get_profile(&self, id: i64) -> ServiceResult<Option<Profile>> {
        Ok(self.state.read().await.profiles.get(&id).cloned())
    }

    async fn list_profiles(&self) -> ServiceResult<Vec<Profile>> {
        let state = self.state.read().await;
        let mut profiles: Vec<Profile> = state.profiles.values().cloned().collect();
        profiles.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(profiles)
    }

    async fn update_profile(
        &self,
        id: i64,
        changes: ProfileChanges,
    ) -> ServiceResult<Option<Profile>> {
        let mut state = self.state.write().await;
        Ok(state.profiles.get_mut(&id).map(|profile| {
            changes.apply(profile);
            profile.clone()
        }))
    }

    async fn delete_profile(&self, id: i64) -> ServiceResult<bool> {
        let mut state = self.state.write().await;
        if state.profiles.remove(&id).is_none() {
            return Ok(false);
        }

        let owned: HashSet<i64> = state
            .posts
            .values()
            .filter(|p| p.profile_id == id)
            .map(|p| p.id)
            .collect();
        state.remove_post_dependents(&owned);
        state.posts.retain(|post_id, _| !owned.contains(post_id));

        state.comments.retain(|_, c| c.profile_id != id);
        state.likes.retain(|_, l| l.profile_id != id);
        state.like_keys.retain(|(_, profile_id)| *profile_id != id);
        state
            .follows
            .retain(|(follower, followee), _| *follower != id && *followee != id);
        Ok(true)
    }

    async fn find_profiles_by_text(&self, query: &str) -> ServiceResult<Vec<Profile>> {
        let needle = query.to_lowercase();
        let state = self.state.read().await;
        let mut profiles: Vec<Profile> = state
            .profiles
            .values()
            .filter(|p| {
                contains_ignore_case(&p.username, &needle)
                    || contains_ignore_case(&p.display_name, &needle)
                    || contains_ignore_case(&p.bio_text, &needle)
            })
            .cloned()
            .collect();
        profiles.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(profiles)
    }

    async fn create_post(
        &self,
        profile_id: i64,
        caption: &str,
        photos: Vec<NewPhoto>,
    ) -> ServiceResult<Post> {
        let mut state = self.state.write().await;
        state.require_profile(profile_id)?;
        let now = Utc::now();
        let post = Post {
            id: state.next_id(),
            profile_id,
            caption: caption.to_string(),
            created_at: now,
            updated_at: now,
        };
        state.posts.insert(post.id, post.clone());

        for photo in photos {
            let photo = Photo {
                id: state.next_id(),
                post_id: post.id,
                image_url: photo.image_url().map(str::to_string),
                image_file: photo.image_file().map(str::to_string),
                created_at: now,
            };
            state.photos.insert(photo.id, photo);
        }
        Ok(post)
    }

    async fn get_post(&self, id: i64) -> ServiceResult<Option<Post>> {
        Ok(self.state.read().await.posts.get(&id).cloned())
    }

    async fn list_posts(&self) -> ServiceResult<Vec<Post>> {
        let mut posts: Vec<Post> = self.state.read().await.posts.values().cloned().collect();
        sort_newest_first(&mut posts);
        Ok(posts)
    }

    async fn update_post_caption(&self, id: i64, caption: &str) -> ServiceResult<Option<Post>> {
        let mut state = self.state.write().await;
        Ok(state.posts.get_mut(&id).map(|post| {
            post.caption = caption.to_string();
            post.updated_at = Utc::now();
            post.clone()
        }))
    }

    async fn delete_post(&self, id: i64) -> ServiceResult<bool> {
        let mut state = self.state.write().await;
        if state.posts.remove(&id).is_none() {
            return Ok(false);
        }
        state.remove_post_dependents(&HashSet::from([id]));
        Ok(true)
    }

    async fn find_posts_by_authors(&self, profile_ids: &[i64]) -> ServiceResult<Vec<Post>> {
        let authors: HashSet<i64> = profile_ids.iter().copied().collect();
        let state = self.state.read().await;
        let mut posts: Vec<Post> = state
            .posts
            .values()
            .filter(|p| authors.contains(&p.profile_id))
            .cloned()
            .collect();
        sort_newest_first(&mut posts);
        Ok(posts)
    }

    async fn find_posts_by_caption(&self, query: &str) -> ServiceResult<Vec<Post>> {
        let needle = query.to_lowercase();
        let state = self.state.read().await;
        let mut posts: Vec<Post> = state
            .posts
            .values()
            .filter(|p| contains_ignore_case(&p.caption, &needle))
            .cloned()
            .collect();
        sort_newest_first(&mut posts);
        Ok(posts)
    }

    async fn add_photo(&self, post_id: i64, photo: NewPhoto) -> ServiceResult<Photo> {
        let mut state = self.state.write().await;
        state.require_post(post_id)?;
        let photo = Photo {
            id: state.next_id(),
            post_id,
            image_url: photo.image_url().map(str::to_string),
            image_file: photo.image_file().map(str::to_string),
            created_at: Utc::now(),
        };
        state.photos.insert(photo.id, photo.clone());
        Ok(photo)
    }

    async fn photos_for_post(&self, post_id: i64) -> ServiceResult<Vec<Photo>> {
        let state = self.state.read().await;
        Ok(state
            .photos
            .values()
            .filter(|p| p.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn insert_follow(&self, follower_id: i64, followee_id: i64) -> ServiceResult<bool> {
        let mut state = self.state.write().await;
        state.require_profile(follower_id)?;
        state.require_profile(followee_id)?;
        if state.follows.contains_key(&(follower_id, followee_id)) {
            return Ok(false);
        }
        state.follows.insert(
            (follower_id, followee_id),
            Follow {
                follower_id,
                followee_id,
                created_at: Utc::now(),
            },
        );
        Ok(true)
    }

    async fn delete_follow(&self, follower_id: i64, followee_id: i64) -> ServiceResult<bool> {
        let mut state = self.state.write().await;
        Ok(state.follows.remove(&(follower_id, followee_id)).is_some())
    }

    async fn is_following(&self, follower_id: i64, followee_id: i64) -> ServiceResult<bool> {
        let state = self.state.read().await;
        Ok(state.follows.contains_key(&(follower_id, followee_id)))
    }

    async fn find_followers_of(&self, profile_id: i64) -> ServiceResult<Vec<Profile>> {
        let state = self.state.read().await;
        let edges = state.edges_in_creation_order(|f| f.followee_id == profile_id);
        Ok(state.profiles_by_id(edges.into_iter().map(|f| f.follower_id)))
    }

    async fn find_following_of(&self, profile_id: i64) -> ServiceResult<Vec<Profile>> {
        let state = self.state.read().await;
        let edges = state.edges_in_creation_order(|f| f.follower_id == profile_id);
        Ok(state.profiles_by_id(edges.into_iter().map(|f| f.followee_id)))
    }

    async fn insert_like(&self, post_id: i64, profile_id: i64) -> ServiceResult<bool> {
        let mut state = self.state.write().await;
        state.require_post(post_id)?;
        state.require_profile(profile_id)?;
        if !state.like_keys.insert((post_id, profile_id)) {
            return Ok(false);
        }
        let like = Like {
            id: state.next_id(),
            post_id,
            profile_id,
            created_at: Utc::now(),
        };
        state.likes.insert(like.id, like);
        Ok(true)
    }

    async fn delete_like(&self, post_id: i64, profile_id: i64) -> ServiceResult<bool> {
        let mut state = self.state.write().await;
        if !state.like_keys.remove(&(post_id, profile_id)) {
            return Ok(false);
        }
        state
            .likes
            .retain(|_, l| !(l.post_id == post_id && l.profile_id == profile_id));
        Ok(true)
    }

    async fn likes_for_post(&self, post_id: i64) -> ServiceResult<Vec<Like>> {
        let state = self.state.read().await;
        // BTreeMap iterates ids ascending; reverse for newest first
        Ok(state
            .likes
            .values()
            .rev()
            .filter(|l| l.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn insert_comment(
        &self,
        post_id: i64,
        profile_id: i64,
        text: &str,
    ) -> ServiceResult<Comment> {
        let mut state = self.state.write().await;
        state.require_post(post_id)?;
        state.require_profile(profile_id)?;
        let comment = Comment {
            id: state.next_id(),
            post_id,
            profile_id,
            text: text.to_string(),
            created_at: Utc::now(),
        };
        state.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn comments_for_post(&self, post_id: i64) -> ServiceResult<Vec<Comment>> {
        let state = self.state.read().await;
        Ok(state
            .comments
            .values()
            .rev()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }
}
