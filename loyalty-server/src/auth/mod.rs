//! Trusted Identity
//!
//! The gateway in front of this service authenticates callers; the loyalty
//! core trusts the identity it forwards as headers. [`require_identity`]
//! validates the headers on every `/api/` route and injects [`CurrentUser`]
//! into the request extensions; [`require_admin`] guards the management
//! route groups.
//!
//! | Header | Value |
//! |--------|-------|
//! | `X-User-Id` | opaque user identifier (required) |
//! | `X-User-Role` | `ADMIN` or `CUSTOMER` (default `CUSTOMER`) |

use axum::{extract::Request, middleware::Next, response::Response};

use crate::utils::AppError;
use crate::utils::validation::{MAX_SHORT_TEXT_LEN, validate_required_text};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Caller role, as asserted by the upstream gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Customer,
}

/// Identity of the calling user, injected by [`require_identity`]
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Identity middleware — requires identity headers on `/api/` routes.
///
/// Skips CORS preflight and non-API paths (those 404 normally).
pub async fn require_identity(mut req: Request, next: Next) -> Result<Response, AppError> {
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }
    if !req.uri().path().starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    let user_id = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .ok_or_else(AppError::not_authenticated)?;
    validate_required_text(&user_id, "user id", MAX_SHORT_TEXT_LEN)?;

    let role = match req
        .headers()
        .get(USER_ROLE_HEADER)
        .and_then(|h| h.to_str().ok())
    {
        Some("ADMIN") => Role::Admin,
        Some("CUSTOMER") | None => Role::Customer,
        Some(other) => {
            return Err(AppError::invalid_request(format!("Unknown role: {other}")));
        }
    };

    req.extensions_mut().insert(CurrentUser { id: user_id, role });
    Ok(next.run(req).await)
}

/// Admin guard — layered on management route groups, after
/// [`require_identity`].
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(AppError::not_authenticated)?;
    if !user.is_admin() {
        tracing::warn!(user_id = %user.id, path = %req.uri().path(), "Admin route denied");
        return Err(AppError::admin_required());
    }
    Ok(next.run(req).await)
}
