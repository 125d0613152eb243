//! Post handlers.

use actix_web::{HttpResponse, web};

use quill_core::domain::{CreatePostParam, Post, UpdatePostParam};
use quill_shared::dto::{CreatePostRequest, PageQuery, PostResponse, UpdatePostRequest, UserSummary};

use crate::config::PaginationConfig;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/posts?limit=&offset=
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let (limit, offset) = page_window(&state.pagination, query.into_inner())?;

    let posts = state.posts.list(limit, offset).await?;

    Ok(HttpResponse::Ok().json(posts.into_iter().map(post_response).collect::<Vec<_>>()))
}

/// GET /api/posts/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let post = state.posts.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let param = CreatePostParam {
        title: req.title,
        body: req.body,
    };

    let post = state.posts.create(identity.user_id, param).await?;
    tracing::info!(post_id = post.id, user_id = identity.user_id, "Post created");

    Ok(HttpResponse::Created().json(post_response(post)))
}

/// PUT /api/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let param = UpdatePostParam {
        title: req.title,
        body: req.body,
    };

    let post = state
        .posts
        .update(identity.user_id, path.into_inner(), param)
        .await?;

    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// DELETE /api/posts/{id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    state.posts.delete(identity.user_id, id).await?;
    tracing::info!(post_id = id, user_id = identity.user_id, "Post deleted");

    Ok(HttpResponse::NoContent().finish())
}

fn page_window(config: &PaginationConfig, query: PageQuery) -> AppResult<(u64, u64)> {
    let limit = query.limit.unwrap_or(config.default_limit);
    if limit > config.max_limit {
        return Err(AppError::BadRequest(format!(
            "limit must not exceed {}",
            config.max_limit
        )));
    }
    // Offsets are bound as a signed BIGINT
    let offset = query.offset.unwrap_or(0);
    if i64::try_from(offset).is_err() {
        return Err(AppError::BadRequest(format!(
            "offset must not exceed {}",
            i64::MAX
        )));
    }
    Ok((limit, offset))
}

fn post_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id,
        title: post.title,
        body: post.body,
        created_at: post.created_at,
        updated_at: post.updated_at,
        user: UserSummary {
            id: post.user.id,
            name: post.user.name,
        },
    }
}
