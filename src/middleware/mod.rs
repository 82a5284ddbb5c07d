pub mod auth;
pub mod json;
pub mod response;

pub use auth::{require_bearer, AuthUser};
pub use json::ApiJson;
pub use response::{ApiResponse, ApiResult};
