/// HTTP handlers for the insta API
///
/// - profiles: profile CRUD, profile pages and per-profile posts
/// - posts: post CRUD, photos, comments and likes
/// - social: follow graph and feed
/// - search: caption and profile search
pub mod posts;
pub mod profiles;
pub mod search;
pub mod social;

use crate::config::DEFAULT_MAX_UPLOAD_BYTES;
use crate::state::AppState;
use actix_web::{web, HttpResponse};

/// Register every `/api/v1` route on `cfg` with the default upload limit
pub fn configure(cfg: &mut web::ServiceConfig) {
    api_routes(DEFAULT_MAX_UPLOAD_BYTES)(cfg)
}

/// Route table with upload bodies capped at `max_upload_bytes`
pub fn api_routes(max_upload_bytes: usize) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| register_routes(cfg, max_upload_bytes)
}

fn register_routes(cfg: &mut web::ServiceConfig, max_upload_bytes: usize) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health))
            .route("/search", web::get().to(search::search))
            .service(
                web::scope("/profiles")
                    .service(
                        web::resource("")
                            .route(web::get().to(profiles::list_profiles))
                            .route(web::post().to(profiles::create_profile)),
                    )
                    .service(
                        web::resource("/{profile_id}")
                            .route(web::get().to(profiles::get_profile))
                            .route(web::patch().to(profiles::update_profile))
                            .route(web::delete().to(profiles::delete_profile)),
                    )
                    .service(
                        web::resource("/{profile_id}/posts")
                            .route(web::get().to(profiles::list_profile_posts))
                            .route(web::post().to(profiles::create_profile_post)),
                    )
                    .service(
                        web::resource("/{profile_id}/posts/upload")
                            .app_data(web::JsonConfig::default().limit(max_upload_bytes))
                            .route(web::post().to(profiles::create_profile_post_with_uploads)),
                    )
                    .route(
                        "/{profile_id}/followers",
                        web::get().to(social::list_followers),
                    )
                    .route(
                        "/{profile_id}/following",
                        web::get().to(social::list_following),
                    )
                    .service(
                        web::resource("/{profile_id}/following/{target_id}")
                            .route(web::post().to(social::follow))
                            .route(web::delete().to(social::unfollow)),
                    )
                    .route("/{profile_id}/feed", web::get().to(social::get_feed)),
            )
            .service(
                web::scope("/posts")
                    // must precede /{post_id}
                    .route("/random", web::get().to(posts::random_post))
                    .service(
                        web::resource("/{post_id}")
                            .route(web::get().to(posts::get_post))
                            .route(web::patch().to(posts::update_post))
                            .route(web::delete().to(posts::delete_post)),
                    )
                    .route("/{post_id}/photos", web::post().to(posts::add_photo))
                    .service(
                        web::resource("/{post_id}/photos/upload")
                            .app_data(web::PayloadConfig::new(max_upload_bytes))
                            .route(web::post().to(posts::upload_photo)),
                    )
                    .service(
                        web::resource("/{post_id}/comments")
                            .route(web::get().to(posts::list_comments))
                            .route(web::post().to(posts::create_comment)),
                    )
                    .service(
                        web::resource("/{post_id}/likes/{profile_id}")
                            .route(web::post().to(posts::like_post))
                            .route(web::delete().to(posts::unlike_post)),
                    ),
            ),
    );
}

/// Liveness plus a store round trip
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    match state.repo.health_check().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "status": "ok" })),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "unhealthy",
                "error": e.to_string(),
            }))
        }
    }
}

/// Prometheus text exposition
pub async fn metrics() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(db_pool::gather_metrics())
}
