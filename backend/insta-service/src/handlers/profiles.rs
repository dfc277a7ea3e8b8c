/// Profile handlers - profile CRUD and per-profile posts
use crate::error::ServiceError;
use crate::services::{CreatePostInput, CreateProfileInput, UpdateProfileInput, UploadedFile};
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreatePostWithUploadsRequest {
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub files: Vec<UploadRequestFile>,
}

/// One file of a post upload, content base64-encoded
#[derive(Debug, Deserialize)]
pub struct UploadRequestFile {
    pub file_name: String,
    pub content_base64: String,
}

pub async fn list_profiles(state: web::Data<AppState>) -> Result<HttpResponse, ServiceError> {
    let profiles = state.profiles.list_profiles().await?;
    Ok(HttpResponse::Ok().json(profiles))
}

pub async fn create_profile(
    state: web::Data<AppState>,
    req: web::Json<CreateProfileInput>,
) -> Result<HttpResponse, ServiceError> {
    let profile = state.profiles.create_profile(req.into_inner()).await?;
    Ok(HttpResponse::Created().json(profile))
}

/// Profile page: profile, posts and follower/following counts
pub async fn get_profile(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServiceError> {
    let summary = state.profiles.profile_summary(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(summary))
}

pub async fn update_profile(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    req: web::Json<UpdateProfileInput>,
) -> Result<HttpResponse, ServiceError> {
    let profile = state
        .profiles
        .update_profile(path.into_inner(), req.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(profile))
}

pub async fn delete_profile(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServiceError> {
    state.profiles.delete_profile(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn list_profile_posts(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServiceError> {
    let posts = state.posts.posts_by(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(posts))
}

pub async fn create_profile_post(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    req: web::Json<CreatePostInput>,
) -> Result<HttpResponse, ServiceError> {
    let post = state
        .posts
        .create_post(path.into_inner(), req.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(post))
}

/// Create a post whose photos are uploaded in the same request
pub async fn create_profile_post_with_uploads(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    req: web::Json<CreatePostWithUploadsRequest>,
) -> Result<HttpResponse, ServiceError> {
    let req = req.into_inner();
    let files = req
        .files
        .into_iter()
        .map(|file| {
            let bytes = STANDARD.decode(file.content_base64.as_bytes()).map_err(|e| {
                ServiceError::Validation(format!("{}: invalid base64 content: {}", file.file_name, e))
            })?;
            Ok(UploadedFile {
                file_name: file.file_name,
                bytes,
            })
        })
        .collect::<Result<Vec<_>, ServiceError>>()?;

    let post = state
        .posts
        .create_post_with_uploads(path.into_inner(), &req.caption, files)
        .await?;
    Ok(HttpResponse::Created().json(post))
}
