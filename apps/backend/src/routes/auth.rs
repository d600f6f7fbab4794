//! Authentication middleware
//!
//! Tokens are issued by the upstream identity provider; the bearer value is
//! the user's subject id and is trusted as-is.

use axum::{
    body::Body,
    extract::Request,
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::error::{ApiError, Result};

const MAX_SUBJECT_LEN: usize = 128;

/// Authenticated user info stored in request extensions
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

/// Auth middleware - extracts the user subject from the Authorization header
pub async fn auth_middleware(mut request: Request<Body>, next: Next) -> Result<Response> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    let subject = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization format".to_string()))?
        .trim();

    if subject.is_empty()
        || subject.len() > MAX_SUBJECT_LEN
        || subject.chars().any(char::is_whitespace)
    {
        return Err(ApiError::Unauthorized("Invalid token".to_string()));
    }

    let user = AuthenticatedUser {
        user_id: subject.to_string(),
    };
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
