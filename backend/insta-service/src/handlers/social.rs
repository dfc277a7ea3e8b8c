/// Follow graph and feed handlers
use crate::error::ServiceError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct FollowResponse {
    pub follower_id: i64,
    pub followee_id: i64,
    pub following: bool,
    /// Whether this request changed the graph
    pub changed: bool,
}

pub async fn list_followers(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServiceError> {
    let followers = state.follows.followers_of(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(followers))
}

pub async fn list_following(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServiceError> {
    let following = state.follows.following_of(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(following))
}

/// Follow `target_id`; repeating the request is a no-op
pub async fn follow(
    state: web::Data<AppState>,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse, ServiceError> {
    let (follower_id, followee_id) = path.into_inner();
    let changed = state.follows.follow(follower_id, followee_id).await?;

    let body = FollowResponse {
        follower_id,
        followee_id,
        following: true,
        changed,
    };
    if changed {
        Ok(HttpResponse::Created().json(body))
    } else {
        Ok(HttpResponse::Ok().json(body))
    }
}

pub async fn unfollow(
    state: web::Data<AppState>,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse, ServiceError> {
    let (follower_id, followee_id) = path.into_inner();
    let changed = state.follows.unfollow(follower_id, followee_id).await?;

    Ok(HttpResponse::Ok().json(FollowResponse {
        follower_id,
        followee_id,
        following: false,
        changed,
    }))
}

/// Posts from followed profiles, newest first
pub async fn get_feed(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServiceError> {
    let posts = state.feed.feed_for(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(posts))
}
