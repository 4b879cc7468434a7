//! Route handlers, one per operation.
//!
//! Handlers stay thin: lock the store, run the resolver, translate the
//! outcome. Absence becomes 404, a rejected author reference 422, storage
//! failures 500. Missing required fields never reach the resolver; the
//! Json extractor rejects them first.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::record::{Post, User};
use crate::resolver::{NewPost, NewUser, PostPatch, Resolver, UserPatch};
use crate::server::AppState;
use crate::storage::StoreStats;

#[derive(Deserialize)]
pub struct IncludeParams {
    /// Relation to materialize alongside the record ("posts" on users,
    /// "author" on posts). Anything else is ignored.
    pub include: Option<String>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A user plus its posts, when the query shape asked for them
#[derive(Serialize)]
pub struct UserPayload {
    #[serde(flatten)]
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posts: Option<Vec<Post>>,
}

/// A post plus its author, when the query shape asked for it
#[derive(Serialize)]
pub struct PostPayload {
    #[serde(flatten)]
    pub post: Post,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<User>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn resolver_error(err: crate::Error) -> ApiError {
    let status = match err {
        crate::Error::UnknownAuthor(_) => StatusCode::UNPROCESSABLE_ENTITY,
        crate::Error::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse { error: err.to_string() }))
}

fn not_found(what: &str, id: i64) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("no {} with id {}", what, id),
        }),
    )
}

// ========== User routes ==========

pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<User>>, ApiError> {
    let mut store = state.store.lock().await;
    let users = Resolver::new(&mut store).users().map_err(resolver_error)?;
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(params): Query<IncludeParams>,
) -> Result<Json<UserPayload>, ApiError> {
    let mut store = state.store.lock().await;
    let resolver = Resolver::new(&mut store);

    let user = resolver
        .user(id)
        .map_err(resolver_error)?
        .ok_or_else(|| not_found("user", id))?;

    // the posts relation is fetched only when the query shape asks for it
    let posts = if params.include.as_deref() == Some("posts") {
        Some(resolver.user_posts(id).map_err(resolver_error)?)
    } else {
        None
    };

    Ok(Json(UserPayload { user, posts }))
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewUser>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let mut store = state.store.lock().await;
    let user = Resolver::new(&mut store)
        .create_user(input)
        .map_err(resolver_error)?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(patch): Json<UserPatch>,
) -> Result<Json<User>, ApiError> {
    let mut store = state.store.lock().await;
    let user = Resolver::new(&mut store)
        .update_user(id, patch)
        .map_err(resolver_error)?
        .ok_or_else(|| not_found("user", id))?;
    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    let mut store = state.store.lock().await;
    let snapshot = Resolver::new(&mut store)
        .delete_user(id)
        .map_err(resolver_error)?
        .ok_or_else(|| not_found("user", id))?;
    Ok(Json(snapshot))
}

pub async fn user_posts(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Post>>, ApiError> {
    let mut store = state.store.lock().await;
    let posts = Resolver::new(&mut store)
        .user_posts(id)
        .map_err(resolver_error)?;
    Ok(Json(posts))
}

// ========== Post routes ==========

pub async fn list_posts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Post>>, ApiError> {
    let mut store = state.store.lock().await;
    let posts = Resolver::new(&mut store).posts().map_err(resolver_error)?;
    Ok(Json(posts))
}

pub async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(params): Query<IncludeParams>,
) -> Result<Json<PostPayload>, ApiError> {
    let mut store = state.store.lock().await;
    let resolver = Resolver::new(&mut store);

    let post = resolver
        .post(id)
        .map_err(resolver_error)?
        .ok_or_else(|| not_found("post", id))?;

    let author = if params.include.as_deref() == Some("author") {
        resolver
            .post_author(post.author_id)
            .map_err(resolver_error)?
    } else {
        None
    };

    Ok(Json(PostPayload { post, author }))
}

pub async fn create_post(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewPost>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let mut store = state.store.lock().await;
    let post = Resolver::new(&mut store)
        .create_post(input)
        .map_err(resolver_error)?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn update_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(patch): Json<PostPatch>,
) -> Result<Json<Post>, ApiError> {
    let mut store = state.store.lock().await;
    let post = Resolver::new(&mut store)
        .update_post(id, patch)
        .map_err(resolver_error)?
        .ok_or_else(|| not_found("post", id))?;
    Ok(Json(post))
}

pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Post>, ApiError> {
    let mut store = state.store.lock().await;
    let snapshot = Resolver::new(&mut store)
        .delete_post(id)
        .map_err(resolver_error)?
        .ok_or_else(|| not_found("post", id))?;
    Ok(Json(snapshot))
}

pub async fn post_author(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    let mut store = state.store.lock().await;
    let resolver = Resolver::new(&mut store);

    let post = resolver
        .post(id)
        .map_err(resolver_error)?
        .ok_or_else(|| not_found("post", id))?;
    let author = resolver
        .post_author(post.author_id)
        .map_err(resolver_error)?
        .ok_or_else(|| not_found("user", post.author_id))?;

    Ok(Json(author))
}

// ========== Misc ==========

pub async fn stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StoreStats>, ApiError> {
    let store = state.store.lock().await;
    let stats = store.stats().map_err(resolver_error)?;
    Ok(Json(stats))
}
