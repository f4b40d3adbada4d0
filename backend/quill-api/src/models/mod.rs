pub mod post;
pub mod user;

pub use post::{CreatePostRequest, NewPost, Post};
pub use user::{LoginRequest, NewUser, RegisterRequest, User, UserResponse};
