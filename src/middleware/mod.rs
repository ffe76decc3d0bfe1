pub mod auth;
pub mod response;

pub use auth::{
    authenticate_jwt, check_admin, check_admin_or_self, check_authenticated, require_admin,
    require_admin_or_self, require_authenticated, Identity,
};
pub use response::{ApiResponse, ApiResult};
