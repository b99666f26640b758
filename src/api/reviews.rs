use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::info;

use super::auth::AuthUser;
use super::error::{ApiError, ApiJson};
use super::movie_id_param;
use super::types::*;
use crate::db::{clamp_rating, new_id, DbError, Review};
use crate::server::AppState;
use crate::social::{assert_owner, paginate, PageRequest, ReactionKind, Reactions, REVIEW_PAGE_CAP};
use crate::util::QueryParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewSort {
    Recent,
    Rating,
    Helpful,
}

impl ReviewSort {
    /// Unknown values sort by recency.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("rating") => ReviewSort::Rating,
            Some("helpful") => ReviewSort::Helpful,
            _ => ReviewSort::Recent,
        }
    }
}

/// Every key falls back to newest first.
pub fn sort_reviews(reviews: &mut [Review], sort: ReviewSort) {
    match sort {
        ReviewSort::Recent => reviews.sort_by(|a, b| b.created.cmp(&a.created)),
        ReviewSort::Rating => reviews.sort_by(|a, b| {
            b.rating
                .total_cmp(&a.rating)
                .then_with(|| b.created.cmp(&a.created))
        }),
        ReviewSort::Helpful => reviews.sort_by(|a, b| {
            b.reactions
                .helpfulness()
                .cmp(&a.reactions.helpfulness())
                .then_with(|| b.created.cmp(&a.created))
        }),
    }
}

/// Mean rating rounded to two decimals, 0 without reviews.
pub fn average_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let sum: f64 = reviews.iter().map(|r| r.rating).sum();
    (sum / reviews.len() as f64 * 100.0).round() / 100.0
}

async fn owned_review(state: &AppState, id: &str, user_id: &str) -> Result<Review, ApiError> {
    let review = get_review(state, id).await?;
    assert_owner(&review, user_id)?;
    Ok(review)
}

async fn get_review(state: &AppState, id: &str) -> Result<Review, ApiError> {
    match state.db.get_review(id).await {
        Ok(review) => Ok(review),
        Err(DbError::NotFound(_)) => Err(ApiError::not_found("Review")),
        Err(e) => Err(e.into()),
    }
}

pub async fn create_review(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(req): ApiJson<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewDto>), ApiError> {
    let movie_id = movie_id(req.movie_id);
    let rating = req.rating.filter(|r| *r != 0.0);
    let content = req.content.filter(|c| !c.is_empty());
    let (Some(movie_id), Some(rating), Some(content)) = (movie_id, rating, content) else {
        return Err(ApiError::validation("movieId, rating and content are required"));
    };

    let now = Utc::now();
    let review = Review {
        id: new_id(),
        user_id,
        movie_id,
        rating: clamp_rating(rating),
        content,
        tags: req.tags.unwrap_or_default(),
        is_spoiler: req.is_spoiler.unwrap_or(false),
        reactions: Reactions::default(),
        created: now,
        updated: now,
    };

    state.db.insert_review(review.clone()).await.map_err(|e| match e {
        DbError::AlreadyExists { existing_id, .. } => ApiError::Conflict {
            message: "You already reviewed this movie".to_string(),
            id: existing_id,
        },
        e => e.into(),
    })?;

    info!(review = %review.id, movie = movie_id, user = %review.user_id, "Review created");
    Ok((StatusCode::CREATED, Json(review.into())))
}

pub async fn list_by_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<String>,
    Query(params): Query<QueryParams>,
) -> Result<Json<ReviewListResponse>, ApiError> {
    let movie_id = movie_id_param(&movie_id)?;
    let req = PageRequest::from_params(&params, REVIEW_PAGE_CAP);
    let sort = ReviewSort::parse(params.get("sort"));
    let rating_filter = params
        .get_number("ratingFilter")
        .filter(|r| (1.0..=5.0).contains(r));
    let spoiler_filter = params.get_bool("hasSpoiler");

    let mut reviews = state
        .db
        .find_reviews(&|r: &Review| {
            r.movie_id == movie_id
                && rating_filter.map_or(true, |f| r.rating == f)
                && spoiler_filter.map_or(true, |s| r.is_spoiler == s)
        })
        .await?;
    sort_reviews(&mut reviews, sort);

    let page = paginate(reviews, req);
    let total_pages = page.total_pages();
    Ok(Json(ReviewListResponse {
        total: page.total,
        page: page.page,
        total_pages,
        reviews: page.items.into_iter().map(ReviewDto::from).collect(),
    }))
}

pub async fn movie_stats(
    State(state): State<AppState>,
    Path(movie_id): Path<String>,
) -> Result<Json<ReviewStatsResponse>, ApiError> {
    let movie_id = movie_id_param(&movie_id)?;
    let reviews = state
        .db
        .find_reviews(&|r: &Review| r.movie_id == movie_id)
        .await?;

    Ok(Json(ReviewStatsResponse {
        average_rating: average_rating(&reviews),
        total_reviews: reviews.len(),
    }))
}

pub async fn my_reviews(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<ReviewDto>>, ApiError> {
    let mut reviews = state
        .db
        .find_reviews(&|r: &Review| r.user_id == user_id)
        .await?;
    sort_reviews(&mut reviews, ReviewSort::Recent);
    Ok(Json(reviews.into_iter().map(ReviewDto::from).collect()))
}

pub async fn get_review_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReviewDto>, ApiError> {
    Ok(Json(get_review(&state, &id).await?.into()))
}

pub async fn update_review(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateReviewRequest>,
) -> Result<Json<ReviewDto>, ApiError> {
    owned_review(&state, &id, &user_id).await?;

    let review = state
        .db
        .update_review(
            &id,
            Box::new(move |r| {
                if let Some(rating) = req.rating {
                    r.rating = clamp_rating(rating);
                }
                if let Some(content) = req.content {
                    r.content = content;
                }
                if let Some(tags) = req.tags {
                    r.tags = tags;
                }
                if let Some(is_spoiler) = req.is_spoiler {
                    r.is_spoiler = is_spoiler;
                }
                r.updated = Utc::now();
            }),
        )
        .await?;
    Ok(Json(review.into()))
}

pub async fn delete_review(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    owned_review(&state, &id, &user_id).await?;

    let (review, removed) = state.db.delete_review_with_comments(&id).await?;

    info!(review = %review.id, comments = removed, "Review deleted");
    Ok(Json(DeletedResponse {
        message: "Review deleted".to_string(),
        id: review.id,
    }))
}

async fn react(state: &AppState, user_id: String, id: &str, kind: ReactionKind) -> Result<ReviewDto, ApiError> {
    get_review(state, id).await?;
    let review = state
        .db
        .update_review(id, Box::new(move |r| r.reactions.apply(&user_id, kind)))
        .await?;
    Ok(review.into())
}

pub async fn like_review(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ReviewDto>, ApiError> {
    Ok(Json(react(&state, user_id, &id, ReactionKind::Like).await?))
}

pub async fn dislike_review(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ReviewDto>, ApiError> {
    Ok(Json(react(&state, user_id, &id, ReactionKind::Dislike).await?))
}

pub async fn reaction_status(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ReviewReactionResponse>, ApiError> {
    let review = get_review(&state, &id).await?;
    Ok(Json(ReviewReactionResponse {
        is_liked: review.reactions.has(&user_id, ReactionKind::Like),
        is_disliked: review.reactions.has(&user_id, ReactionKind::Dislike),
    }))
}
