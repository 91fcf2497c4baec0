/// Domain entities and the wire types exchanged with the HTTP layer.

mod dto;
mod refresh_token;
mod user;

pub use dto::{
    AuthResult, LoginRequest, RefreshRequest, RegisterRequest, UpdateUserRequest, UserResponse,
};
pub use refresh_token::RefreshToken;
pub use user::{Role, User};
