/// Post handlers - posts, photos, comments and likes
use crate::error::ServiceError;
use crate::services::{AddPhotoInput, UpdatePostInput};
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub file_name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub profile_id: i64,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub post_id: i64,
    pub profile_id: i64,
    pub liked: bool,
    pub changed: bool,
    pub like_count: usize,
}

/// A random post, 404 when there are none
pub async fn random_post(state: web::Data<AppState>) -> Result<HttpResponse, ServiceError> {
    match state.posts.random_post().await? {
        Some(post) => Ok(HttpResponse::Ok().json(post)),
        None => Err(ServiceError::NotFound("no posts yet".to_string())),
    }
}

/// Post with author, photos, comments and likes
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServiceError> {
    let detail = state.posts.post_detail(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

pub async fn update_post(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    req: web::Json<UpdatePostInput>,
) -> Result<HttpResponse, ServiceError> {
    let post = state
        .posts
        .update_post(path.into_inner(), req.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(post))
}

pub async fn delete_post(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServiceError> {
    state.posts.delete_post(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Attach a remote image by URL
pub async fn add_photo(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    req: web::Json<AddPhotoInput>,
) -> Result<HttpResponse, ServiceError> {
    let photo = state.posts.add_photo_url(path.into_inner(), &req.url).await?;
    Ok(HttpResponse::Created().json(photo))
}

/// Raw request body is the image; `file_name` names it
pub async fn upload_photo(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> Result<HttpResponse, ServiceError> {
    let photo = state
        .posts
        .upload_photo(path.into_inner(), &query.file_name, &body)
        .await?;
    Ok(HttpResponse::Created().json(photo))
}

pub async fn list_comments(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServiceError> {
    let comments = state.engagement.comments_for(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(comments))
}

pub async fn create_comment(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse, ServiceError> {
    let comment = state
        .engagement
        .comment(path.into_inner(), req.profile_id, &req.text)
        .await?;
    Ok(HttpResponse::Created().json(comment))
}

pub async fn like_post(
    state: web::Data<AppState>,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse, ServiceError> {
    let (post_id, profile_id) = path.into_inner();
    let changed = state.engagement.like(post_id, profile_id).await?;
    let like_count = state.engagement.likes_for(post_id).await?.len();

    let body = LikeResponse {
        post_id,
        profile_id,
        liked: true,
        changed,
        like_count,
    };
    if changed {
        Ok(HttpResponse::Created().json(body))
    } else {
        Ok(HttpResponse::Ok().json(body))
    }
}

pub async fn unlike_post(
    state: web::Data<AppState>,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse, ServiceError> {
    let (post_id, profile_id) = path.into_inner();
    let changed = state.engagement.unlike(post_id, profile_id).await?;
    let like_count = state.engagement.likes_for(post_id).await?.len();

    Ok(HttpResponse::Ok().json(LikeResponse {
        post_id,
        profile_id,
        liked: false,
        changed,
        like_count,
    }))
}
