//! Middleware: authentication extraction, admin gate, security headers.

use axum::{
    extract::{FromRequestParts, Request},
    http::{HeaderMap, HeaderName, HeaderValue, header, request::Parts},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;
use zorium_common::auth::{ACCESS_TOKEN, validate_token};
use zorium_common::error::ZoriumError;
use zorium_common::models::user::ROLE_ADMIN;

/// Authentication context extracted from the Authorization header.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub username: String,
    pub role: String,
}

impl AuthContext {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// The caller's [`AuthContext`] on routes behind [`optional_auth_middleware`].
#[derive(Debug, Clone)]
pub struct MaybeAuth(pub Option<AuthContext>);

impl MaybeAuth {
    pub fn user_id(&self) -> Option<Uuid> {
        self.0.as_ref().map(|a| a.user_id)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for MaybeAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<AuthContext>().cloned()))
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Decode an access token into an [`AuthContext`].
pub fn authenticate(token: &str) -> Result<AuthContext, ZoriumError> {
    let config = zorium_common::config::get();
    let claims = validate_token(token, &config.auth.jwt_secret).map_err(|e| {
        if matches!(e.kind(), jsonwebtoken::errors::ErrorKind::ExpiredSignature) {
            ZoriumError::TokenExpired
        } else {
            ZoriumError::InvalidToken
        }
    })?;

    // Refresh tokens are only accepted by /auth/refresh.
    if claims.token_type != ACCESS_TOKEN {
        return Err(ZoriumError::InvalidToken);
    }

    let user_id = claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| ZoriumError::InvalidToken)?;

    Ok(AuthContext {
        user_id,
        username: claims.username,
        role: claims.role,
    })
}

/// Require a valid `Authorization: Bearer <token>` header.
pub async fn auth_middleware(mut request: Request, next: Next) -> Result<Response, ZoriumError> {
    let token = bearer_token(request.headers()).ok_or(ZoriumError::Unauthorized)?;
    let auth_ctx = authenticate(token)?;
    request.extensions_mut().insert(auth_ctx);
    Ok(next.run(request).await)
}

/// Attach an [`AuthContext`] when a valid token is present; never rejects.
pub async fn optional_auth_middleware(mut request: Request, next: Next) -> Response {
    if let Some(ctx) = bearer_token(request.headers()).and_then(|t| authenticate(t).ok()) {
        request.extensions_mut().insert(ctx);
    }
    next.run(request).await
}

/// Reject callers without the admin role. Must run after [`auth_middleware`].
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ZoriumError> {
    let is_admin = request
        .extensions()
        .get::<AuthContext>()
        .ok_or(ZoriumError::Unauthorized)?
        .is_admin();
    if !is_admin {
        return Err(ZoriumError::Forbidden);
    }
    Ok(next.run(request).await)
}

/// Add security headers to every HTTP response.
pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let h = response.headers_mut();

    for (name, value) in [
        ("x-content-type-options", "nosniff"),
        ("x-frame-options", "DENY"),
        ("referrer-policy", "strict-origin-when-cross-origin"),
        ("permissions-policy", "camera=(), microphone=(), geolocation=()"),
        ("strict-transport-security", "max-age=63072000; includeSubDomains"),
        ("content-security-policy", "default-src 'none'; frame-ancestors 'none'"),
    ] {
        h.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }

    response
}
