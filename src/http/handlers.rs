use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::app::feed::FeedService;
use crate::app::profiles::ProfileService;
use crate::app::revalidate::Revalidator;
use crate::app::tweets::TweetService;
use crate::domain::tweet::{FeedTweet, Tweet};
use crate::domain::user::Profile;
use crate::http::{AppError, AuthUser};
use crate::AppState;

const DEFAULT_FEED_LIMIT: i64 = 10;
const MAX_TWEET_CHARS: usize = 280;

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
}

#[derive(Deserialize)]
pub struct FeedQuery {
    pub limit: Option<i64>,
    pub cursor: Option<String>,
    #[serde(default)]
    pub scope: FeedScope,
}

#[derive(Deserialize, Default, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum FeedScope {
    #[default]
    Recent,
    Following,
}

#[derive(Deserialize)]
pub struct PaginationQuery {
    pub limit: Option<i64>,
    pub cursor: Option<String>,
}

#[derive(Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

fn parse_cursor(cursor: Option<String>) -> Result<Option<(OffsetDateTime, Uuid)>, AppError> {
    let Some(cursor) = cursor else {
        return Ok(None);
    };

    let mut parts = cursor.splitn(2, '/');
    let timestamp = parts
        .next()
        .ok_or_else(|| AppError::bad_request("invalid cursor"))?;
    let id = parts
        .next()
        .ok_or_else(|| AppError::bad_request("invalid cursor"))?;

    let timestamp = OffsetDateTime::parse(timestamp, &Rfc3339)
        .map_err(|_| AppError::bad_request("invalid cursor"))?;
    let id = Uuid::parse_str(id).map_err(|_| AppError::bad_request("invalid cursor"))?;

    Ok(Some((timestamp, id)))
}

/// `None` means the feed is exhausted, so a formatting failure must surface
/// as an error rather than a missing cursor.
fn encode_cursor(cursor: Option<(OffsetDateTime, Uuid)>) -> Result<Option<String>, AppError> {
    let Some((timestamp, id)) = cursor else {
        return Ok(None);
    };
    let timestamp = timestamp.format(&Rfc3339).map_err(|err| {
        tracing::error!(error = %err, "failed to encode cursor");
        AppError::internal("failed to encode cursor")
    })?;
    Ok(Some(format!("{}/{}", timestamp, id)))
}

fn check_limit(limit: i64) -> Result<(), AppError> {
    if !(1..=100).contains(&limit) {
        return Err(AppError::bad_request("limit must be between 1 and 100"));
    }
    Ok(())
}

/// Rows referenced by a mutation can vanish between the client reading them
/// and the toggle landing; the FK violation is the only signal.
fn is_foreign_key_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|err| err.as_database_error())
        .and_then(|db_err| db_err.code())
        .map(|code| code == "23503")
        .unwrap_or(false)
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let db = state.db.ping().await.is_ok();
    let redis = state.cache.ping().await.is_ok();
    let status = if db && redis { "ok" } else { "degraded" };

    Json(HealthResponse { status })
}

pub async fn feed_page(
    auth: Option<AuthUser>,
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<ListResponse<FeedTweet>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_FEED_LIMIT);
    check_limit(limit)?;
    let cursor = parse_cursor(query.cursor)?;
    let viewer_id = auth.map(|user| user.user_id);

    let service = FeedService::new(state.db.clone());
    let (tweets, next_cursor) = match query.scope {
        FeedScope::Recent => service
            .recent(viewer_id, cursor, limit)
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, "failed to fetch feed");
                AppError::internal("failed to fetch feed")
            })?,
        FeedScope::Following => {
            let viewer_id = viewer_id
                .ok_or_else(|| AppError::unauthorized("following feed requires a session"))?;
            service
                .following(viewer_id, cursor, limit)
                .await
                .map_err(|err| {
                    tracing::error!(error = ?err, viewer_id = %viewer_id, "failed to fetch following feed");
                    AppError::internal("failed to fetch feed")
                })?
        }
    };

    let next_cursor = encode_cursor(next_cursor)?;
    Ok(Json(ListResponse {
        items: tweets,
        next_cursor,
    }))
}

#[derive(Deserialize)]
pub struct CreateTweetRequest {
    pub content: String,
}

pub async fn create_tweet(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateTweetRequest>,
) -> Result<Json<Tweet>, AppError> {
    if payload.content.trim().is_empty() {
        return Err(AppError::bad_request("content cannot be empty"));
    }
    if payload.content.chars().count() > MAX_TWEET_CHARS {
        return Err(AppError::bad_request("content must be at most 280 characters"));
    }

    let service = TweetService::new(state.db.clone());
    let tweet = service
        .create(auth.user_id, payload.content)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, user_id = %auth.user_id, "failed to create tweet");
            AppError::internal("failed to create tweet")
        })?;

    Ok(Json(tweet))
}

#[derive(Serialize)]
pub struct ToggleLikeResponse {
    pub added_like: bool,
}

pub async fn toggle_like(
    Path(id): Path<Uuid>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ToggleLikeResponse>, AppError> {
    let service = TweetService::new(state.db.clone());
    let added_like = service.toggle_like(auth.user_id, id).await.map_err(|err| {
        if is_foreign_key_violation(&err) {
            return AppError::not_found("tweet not found");
        }
        tracing::error!(error = ?err, tweet_id = %id, user_id = %auth.user_id, "failed to toggle like");
        AppError::internal("failed to toggle like")
    })?;

    Ok(Json(ToggleLikeResponse { added_like }))
}

pub async fn get_profile(
    Path(id): Path<Uuid>,
    auth: Option<AuthUser>,
    State(state): State<AppState>,
) -> Result<Json<Profile>, AppError> {
    let viewer_id = auth.map(|user| user.user_id);

    let service = ProfileService::new(state.db.clone());
    let profile = service.get_profile(id, viewer_id).await.map_err(|err| {
        tracing::error!(error = ?err, user_id = %id, "failed to fetch profile");
        AppError::internal("failed to fetch profile")
    })?;

    match profile {
        Some(profile) => Ok(Json(profile)),
        None => Err(AppError::not_found("profile not found")),
    }
}

pub async fn list_profile_tweets(
    Path(id): Path<Uuid>,
    auth: Option<AuthUser>,
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<ListResponse<FeedTweet>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_FEED_LIMIT);
    check_limit(limit)?;
    let cursor = parse_cursor(query.cursor)?;
    let viewer_id = auth.map(|user| user.user_id);

    let service = FeedService::new(state.db.clone());
    let (tweets, next_cursor) = service
        .by_author(id, viewer_id, cursor, limit)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, author_id = %id, "failed to list profile tweets");
            AppError::internal("failed to list profile tweets")
        })?;

    let next_cursor = encode_cursor(next_cursor)?;
    Ok(Json(ListResponse {
        items: tweets,
        next_cursor,
    }))
}

#[derive(Serialize)]
pub struct ToggleFollowResponse {
    pub added_follow: bool,
}

pub async fn toggle_follow(
    Path(id): Path<Uuid>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ToggleFollowResponse>, AppError> {
    if auth.user_id == id {
        return Err(AppError::bad_request("cannot follow yourself"));
    }

    let service = ProfileService::new(state.db.clone());
    let added_follow = service
        .toggle_follow(auth.user_id, id)
        .await
        .map_err(|err| {
            if is_foreign_key_violation(&err) {
                return AppError::not_found("user not found");
            }
            tracing::error!(error = ?err, follower_id = %auth.user_id, followee_id = %id, "failed to toggle follow");
            AppError::internal("failed to toggle follow")
        })?;

    // Both rendered profile pages are stale now; regeneration is the hosting
    // layer's job and must not fail the mutation.
    let revalidator = Revalidator::new(state.cache.clone());
    if let Err(err) = revalidator.profile_changed(&[id, auth.user_id]).await {
        tracing::warn!(error = ?err, "failed to queue profile revalidation");
    }

    Ok(Json(ToggleFollowResponse { added_follow }))
}
