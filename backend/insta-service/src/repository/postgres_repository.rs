use crate::domain::models::{
    Comment, Like, NewPhoto, NewProfile, Photo, Post, Profile, ProfileChanges,
};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::SocialRepository;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

const PROFILE_COLUMNS: &str =
    "id, username, display_name, bio_text, profile_image_url, join_date";
const POST_COLUMNS: &str = "id, profile_id, caption, created_at, updated_at";
const PHOTO_COLUMNS: &str = "id, post_id, image_url, image_file, created_at";

/// Escape LIKE metacharacters and wrap the query for a substring match
pub(crate) fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// A foreign key violation means a referenced row vanished; report it as
/// `missing` instead of a database failure
fn missing_reference(err: sqlx::Error, missing: impl FnOnce() -> ServiceError) -> ServiceError {
    match err {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => missing(),
        other => other.into(),
    }
}

fn engagement_target_missing(post_id: i64, profile_id: i64) -> ServiceError {
    ServiceError::NotFound(format!("post {} or profile {}", post_id, profile_id))
}

/// PostgreSQL repository for profiles, posts and the follow graph
#[derive(Clone)]
pub struct PostgresSocialRepository {
    pool: PgPool,
}

impl PostgresSocialRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the schema migrations bundled with the service
    pub async fn migrate(&self) -> ServiceResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn insert_photo(
        tx: &mut Transaction<'_, Postgres>,
        post_id: i64,
        photo: &NewPhoto,
    ) -> ServiceResult<Photo> {
        let photo = sqlx::query_as::<_, Photo>(&format!(
            r#"
            INSERT INTO photos (post_id, image_url, image_file)
            VALUES ($1, $2, $3)
            RETURNING {PHOTO_COLUMNS}
            "#
        ))
        .bind(post_id)
        .bind(photo.image_url())
        .bind(photo.image_file())
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| missing_reference(e, || ServiceError::post_not_found(post_id)))?;
        Ok(photo)
    }

    /// Remove the photos, comments and likes of every post matched by
    /// `post_filter` (a predicate over `posts` taking `$1`)
    async fn delete_post_dependents(
        tx: &mut Transaction<'_, Postgres>,
        post_filter: &str,
        id: i64,
    ) -> ServiceResult<()> {
        for table in ["photos", "comments", "likes"] {
            let sql = format!(
                "DELETE FROM {table} WHERE post_id IN (SELECT id FROM posts WHERE {post_filter})"
            );
            sqlx::query(&sql).bind(id).execute(&mut **tx).await?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl SocialRepository for PostgresSocialRepository {
    async fn create_profile(&self, new: NewProfile) -> ServiceResult<Profile> {
        let result = sqlx::query_as::<_, Profile>(&format!(
            r#"
            INSERT INTO profiles (username, display_name, bio_text, profile_image_url)
            VALUES ($1, $2, $3, $4)
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(&new.username)
        .bind(&new.display_name)
        .bind(&new.bio_text)
        .bind(&new.profile_image_url)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(profile) => {
                debug!(profile_id = profile.id, username = %profile.username, "Created profile");
                Ok(profile)
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(
                ServiceError::Validation(format!("username '{}' is already taken", new.username)),
            ),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_profile(&self, id: i64) -> ServiceResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn list_profiles(&self) -> ServiceResult<Vec<Profile>> {
        let profiles = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY username ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(profiles)
    }

    async fn update_profile(
        &self,
        id: i64,
        changes: ProfileChanges,
    ) -> ServiceResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            r#"
            UPDATE profiles
            SET display_name = COALESCE($2, display_name),
                bio_text = COALESCE($3, bio_text),
                profile_image_url = COALESCE($4, profile_image_url)
            WHERE id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.display_name)
        .bind(changes.bio_text)
        .bind(changes.profile_image_url)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn delete_profile(&self, id: i64) -> ServiceResult<bool> {
        let mut tx = self.pool.begin().await?;

        Self::delete_post_dependents(&mut tx, "profile_id = $1", id).await?;
        sqlx::query("DELETE FROM posts WHERE profile_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM comments WHERE profile_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM likes WHERE profile_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM follows WHERE follower_id = $1 OR followee_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let affected = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        debug!(profile_id = id, deleted = affected > 0, "Deleted profile");
        Ok(affected > 0)
    }

    async fn find_profiles_by_text(&self, query: &str) -> ServiceResult<Vec<Profile>> {
        let profiles = sqlx::query_as::<_, Profile>(&format!(
            r#"
            SELECT {PROFILE_COLUMNS}
            FROM profiles
            WHERE username ILIKE $1 ESCAPE '\'
               OR display_name ILIKE $1 ESCAPE '\'
               OR bio_text ILIKE $1 ESCAPE '\'
            ORDER BY username ASC
            "#
        ))
        .bind(like_pattern(query))
        .fetch_all(&self.pool)
        .await?;
        Ok(profiles)
    }

    async fn create_post(
        &self,
        profile_id: i64,
        caption: &str,
        photos: Vec<NewPhoto>,
    ) -> ServiceResult<Post> {
        let mut tx = self.pool.begin().await?;

        let post = sqlx::query_as::<_, Post>(&format!(
            r#"
            INSERT INTO posts (profile_id, caption)
            VALUES ($1, $2)
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(profile_id)
        .bind(caption)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| missing_reference(e, || ServiceError::profile_not_found(profile_id)))?;

        for photo in &photos {
            Self::insert_photo(&mut tx, post.id, photo).await?;
        }

        tx.commit().await?;
        debug!(post_id = post.id, profile_id, photos = photos.len(), "Created post");
        Ok(post)
    }

    async fn get_post(&self, id: i64) -> ServiceResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(post)
    }

    async fn list_posts(&self) -> ServiceResult<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }

    async fn update_post_caption(&self, id: i64, caption: &str) -> ServiceResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            r#"
            UPDATE posts
            SET caption = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(caption)
        .fetch_optional(&self.pool)
        .await?;
        Ok(post)
    }

    async fn delete_post(&self, id: i64) -> ServiceResult<bool> {
        let mut tx = self.pool.begin().await?;

        Self::delete_post_dependents(&mut tx, "id = $1", id).await?;
        let affected = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        debug!(post_id = id, deleted = affected > 0, "Deleted post");
        Ok(affected > 0)
    }

    async fn find_posts_by_authors(&self, profile_ids: &[i64]) -> ServiceResult<Vec<Post>> {
        if profile_ids.is_empty() {
            return Ok(Vec::new());
        }

        let posts = sqlx::query_as::<_, Post>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE profile_id = ANY($1)
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(profile_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }

    async fn find_posts_by_caption(&self, query: &str) -> ServiceResult<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE caption ILIKE $1 ESCAPE '\'
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(like_pattern(query))
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }

    async fn add_photo(&self, post_id: i64, photo: NewPhoto) -> ServiceResult<Photo> {
        let mut tx = self.pool.begin().await?;
        let photo = Self::insert_photo(&mut tx, post_id, &photo).await?;
        tx.commit().await?;
        Ok(photo)
    }

    async fn photos_for_post(&self, post_id: i64) -> ServiceResult<Vec<Photo>> {
        let photos = sqlx::query_as::<_, Photo>(&format!(
            "SELECT {PHOTO_COLUMNS} FROM photos WHERE post_id = $1 ORDER BY id ASC"
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(photos)
    }

    async fn insert_follow(&self, follower_id: i64, followee_id: i64) -> ServiceResult<bool> {
        let inserted = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO follows (follower_id, followee_id, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (follower_id, followee_id) DO NOTHING
            RETURNING follower_id
            "#,
        )
        .bind(follower_id)
        .bind(followee_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            missing_reference(e, || {
                ServiceError::NotFound(format!("profile {} or {}", follower_id, followee_id))
            })
        })?;

        debug!(follower_id, followee_id, created = inserted.is_some(), "Follow upsert");
        Ok(inserted.is_some())
    }

    async fn delete_follow(&self, follower_id: i64, followee_id: i64) -> ServiceResult<bool> {
        let affected = sqlx::query(
            r#"
            DELETE FROM follows
            WHERE follower_id = $1 AND followee_id = $2
            "#,
        )
        .bind(follower_id)
        .bind(followee_id)
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(affected > 0)
    }

    async fn is_following(&self, follower_id: i64, followee_id: i64) -> ServiceResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM follows
                WHERE follower_id = $1 AND followee_id = $2
            )
            "#,
        )
        .bind(follower_id)
        .bind(followee_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn find_followers_of(&self, profile_id: i64) -> ServiceResult<Vec<Profile>> {
        let profiles = sqlx::query_as::<_, Profile>(
            r#"
            SELECT p.id, p.username, p.display_name, p.bio_text, p.profile_image_url, p.join_date
            FROM follows f
            JOIN profiles p ON p.id = f.follower_id
            WHERE f.followee_id = $1
            ORDER BY f.created_at ASC, p.id ASC
            "#,
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(profiles)
    }

    async fn find_following_of(&self, profile_id: i64) -> ServiceResult<Vec<Profile>> {
        let profiles = sqlx::query_as::<_, Profile>(
            r#"
            SELECT p.id, p.username, p.display_name, p.bio_text, p.profile_image_url, p.join_date
            FROM follows f
            JOIN profiles p ON p.id = f.followee_id
            WHERE f.follower_id = $1
            ORDER BY f.created_at ASC, p.id ASC
            "#,
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(profiles)
    }

    async fn insert_like(&self, post_id: i64, profile_id: i64) -> ServiceResult<bool> {
        let inserted = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO likes (post_id, profile_id)
            VALUES ($1, $2)
            ON CONFLICT (post_id, profile_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(post_id)
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| missing_reference(e, || engagement_target_missing(post_id, profile_id)))?;
        Ok(inserted.is_some())
    }

    async fn delete_like(&self, post_id: i64, profile_id: i64) -> ServiceResult<bool> {
        let affected = sqlx::query("DELETE FROM likes WHERE post_id = $1 AND profile_id = $2")
            .bind(post_id)
            .bind(profile_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }

    async fn likes_for_post(&self, post_id: i64) -> ServiceResult<Vec<Like>> {
        let likes = sqlx::query_as::<_, Like>(
            r#"
            SELECT id, post_id, profile_id, created_at
            FROM likes
            WHERE post_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(likes)
    }

    async fn insert_comment(
        &self,
        post_id: i64,
        profile_id: i64,
        text: &str,
    ) -> ServiceResult<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (post_id, profile_id, text)
            VALUES ($1, $2, $3)
            RETURNING id, post_id, profile_id, text, created_at
            "#,
        )
        .bind(post_id)
        .bind(profile_id)
        .bind(text)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| missing_reference(e, || engagement_target_missing(post_id, profile_id)))?;
        Ok(comment)
    }

    async fn comments_for_post(&self, post_id: i64) -> ServiceResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, profile_id, text, created_at
            FROM comments
            WHERE post_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    async fn health_check(&self) -> ServiceResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_wraps_query() {
        assert_eq!(like_pattern("hello"), "%hello%");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
