pub mod auth;
pub mod user;

pub use auth::{LoginRequest, LoginResponse, LogoutResponse, RegisterRequest};
pub use user::{User, UserResponse};
