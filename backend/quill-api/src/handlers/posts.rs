//! Post listing and creation handlers.

use actix_web::{web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::models::{CreatePostRequest, NewPost};
use crate::AppState;

#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "Posts",
    responses(
        (status = 200, description = "All posts, newest first", body = [Post])
    )
)]
pub async fn list_posts(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let posts = state.posts.list().await?;

    Ok(HttpResponse::Ok().json(posts))
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    tag = "Posts",
    params(
        ("id" = Uuid, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post found", body = Post),
        (status = 404, description = "No such post", body = ErrorResponse)
    )
)]
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    match state.posts.find_by_id(id).await? {
        Some(post) => Ok(HttpResponse::Ok().json(post)),
        None => Err(AppError::NotFound),
    }
}

#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "Posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created", body = Post),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    )
)]
pub async fn create_post(
    state: web::Data<AppState>,
    payload: web::Json<CreatePostRequest>,
) -> Result<HttpResponse, AppError> {
    let req = payload.into_inner();
    req.validate()?;

    let post = state
        .posts
        .insert(NewPost {
            author_id: req.author_id,
            title: req.title,
            content: req.content,
        })
        .await?;

    Ok(HttpResponse::Created().json(post))
}
