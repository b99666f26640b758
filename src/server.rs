use axum::{
    routing::{delete, get, post, put},
    Json, Router,
};
use std::path::Path;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::api::comments::{self, CommentScope, OnMovie, OnPost, OnReview};
use crate::api::types::HealthResponse;
use crate::api::{auth, bookmarks, movies, posts, reviews, users, ApiError};
use crate::config::Config;
use crate::db::Repository;
use crate::security::TokenIssuer;
use crate::tmdb::TmdbClient;
use crate::ServerError;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Arc<dyn Repository>,
    pub tokens: Arc<TokenIssuer>,
    pub tmdb: Arc<TmdbClient>,
}

impl AppState {
    pub fn new(config: Config, db: Arc<dyn Repository>) -> Result<Self, ServerError> {
        let tokens = TokenIssuer::new(
            config.token_secret()?.as_bytes(),
            config.auth.token_ttl_secs,
        );
        let tmdb = TmdbClient::new(&config.tmdb)?;

        Ok(Self {
            config: Arc::new(config),
            db,
            tokens: Arc::new(tokens),
            tmdb: Arc::new(tmdb),
        })
    }
}

/// `/comments` routes below `prefix`, which must end in the `:id` segment.
fn comment_routes<S: CommentScope>(prefix: &str) -> Router<AppState> {
    Router::new()
        .route(
            &format!("{}/comments", prefix),
            get(comments::list::<S>).post(comments::add::<S>),
        )
        .route(
            &format!("{}/comments/:comment_id", prefix),
            put(comments::update::<S>).delete(comments::delete::<S>),
        )
        .route(
            &format!("{}/comments/:comment_id/react", prefix),
            post(comments::react::<S>),
        )
        .route(
            &format!("{}/comments/:comment_id/reaction", prefix),
            get(comments::reaction::<S>),
        )
}

pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/auth/check-id", post(auth::check_id))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/protected", get(auth::protected))
        .route("/auth/update", put(auth::update))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/delete", delete(auth::delete_account))
        .route("/users/check-id", post(auth::check_id))
        .route("/users/signup", post(users::signup))
        .route("/users/login", post(users::login))
        .route("/users/protected", get(users::protected))
        .route("/users/update", put(users::update));

    let review_routes = Router::new()
        .route("/reviews", post(reviews::create_review))
        .route("/reviews/movie/:movie_id", get(reviews::list_by_movie))
        .route("/reviews/movie/:movie_id/stats", get(reviews::movie_stats))
        .route("/reviews/user/me", get(reviews::my_reviews))
        .route(
            "/reviews/:id",
            get(reviews::get_review_by_id)
                .put(reviews::update_review)
                .delete(reviews::delete_review),
        )
        .route("/reviews/:id/like", post(reviews::like_review))
        .route("/reviews/:id/dislike", post(reviews::dislike_review))
        .route("/reviews/:id/reaction", get(reviews::reaction_status))
        .merge(comment_routes::<OnReview>("/reviews/:id"));

    let movie_routes = Router::new()
        .route("/movies", get(movies::list_movies))
        .route("/movies/search", get(movies::search_movies))
        .route("/movies/:id", get(movies::movie_details))
        .route("/movies/:id/videos", get(movies::movie_videos))
        .merge(comment_routes::<OnMovie>("/movies/:id"));

    let post_routes = Router::new()
        .route("/posts", get(posts::list_posts).post(posts::create_post))
        .route(
            "/posts/:id",
            get(posts::get_post_by_id)
                .put(posts::update_post)
                .delete(posts::delete_post),
        )
        .route("/posts/:id/like", post(posts::like_post))
        .merge(comment_routes::<OnPost>("/posts/:id"));

    let bookmark_routes = Router::new()
        .route(
            "/bookmarks",
            get(bookmarks::list_bookmarks).post(bookmarks::create_bookmark),
        )
        .route("/bookmarks/watched", get(bookmarks::list_watched))
        .route("/bookmarks/tags", get(bookmarks::list_tags))
        .route("/bookmarks/status", get(bookmarks::bulk_status))
        .route("/bookmarks/status/:movie_id", get(bookmarks::status))
        .route(
            "/bookmarks/:id",
            get(bookmarks::get_bookmark)
                .put(bookmarks::update_bookmark)
                .delete(bookmarks::delete_bookmark),
        );

    let mut router = Router::new()
        .route("/health", get(health_handler))
        .route("/robots.txt", get(robots_txt_handler))
        .merge(auth_routes)
        .merge(review_routes)
        .merge(movie_routes)
        .merge(post_routes)
        .merge(bookmark_routes)
        .fallback(fallback_handler);

    if let Some(ref appdir) = state.config.appdir {
        // Single-page app: unknown paths get index.html.
        let index = Path::new(appdir).join("index.html");
        router = router.fallback_service(ServeDir::new(appdir).not_found_service(ServeFile::new(index)));
    }

    router
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::api::auth_middleware,
        ))
        .layer(axum::middleware::from_fn(crate::middleware::log_request))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn robots_txt_handler() -> &'static str {
    "User-agent: *\nDisallow: /\n"
}

async fn fallback_handler() -> ApiError {
    ApiError::not_found("Route")
}
