//! OpenAPI documentation for the Quill API.

use utoipa::OpenApi;

use crate::handlers::auth::{ErrorResponse, LoginResponse, MeResponse};
use crate::models::{CreatePostRequest, LoginRequest, Post, RegisterRequest, UserResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Quill API",
        version = "0.1.0",
        description = "Accounts, posts, and token-based authentication",
        contact(
            name = "Quill Team",
            email = "team@quill.dev"
        ),
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development server"),
    ),
    paths(
        crate::handlers::auth::login,
        crate::handlers::auth::me,
        crate::handlers::users::register,
        crate::handlers::users::list_users,
        crate::handlers::users::get_user,
        crate::handlers::posts::list_posts,
        crate::handlers::posts::get_post,
        crate::handlers::posts::create_post,
    ),
    components(schemas(
        LoginRequest,
        RegisterRequest,
        CreatePostRequest,
        LoginResponse,
        MeResponse,
        UserResponse,
        Post,
        ErrorResponse
    )),
    tags(
        (name = "Auth", description = "Login and identity introspection"),
        (name = "Users", description = "Account registration and lookup"),
        (name = "Posts", description = "Post creation and listing"),
    )
)]
pub struct ApiDoc;
