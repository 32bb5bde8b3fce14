//! Session extractors.
//!
//! A session is a valid Bearer token issued by `POST /api/auth/login`. Its
//! claims carry everything handlers need, so no database lookup happens here.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use domain::models::user::UserRole;
use shared::jwt::{JwtConfig, JwtError, SessionClaims};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// Any signed-in staff member (admin or editor).
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    /// Token id, logged for traceability.
    pub jti: String,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl TryFrom<SessionClaims> for Session {
    type Error = JwtError;

    fn try_from(claims: SessionClaims) -> Result<Self, Self::Error> {
        let user_id = claims.user_id()?;
        let role = claims
            .role
            .parse::<UserRole>()
            .map_err(|_| JwtError::InvalidToken)?;

        Ok(Self {
            user_id,
            email: claims.email,
            name: claims.name,
            role,
            jti: claims.jti,
        })
    }
}

/// `Bearer` token from the `Authorization` header, if any.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Validates the request's Bearer token.
pub fn session_from_headers(headers: &HeaderMap, jwt: &JwtConfig) -> Result<Session, ApiError> {
    let token = bearer_token(headers)
        .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;

    let claims = jwt.validate_session(token).map_err(|e| {
        tracing::debug!(error = %e, "Rejected session token");
        ApiError::Unauthorized("Invalid or expired session".to_string())
    })?;

    Session::try_from(claims)
        .map_err(|_| ApiError::Unauthorized("Invalid or expired session".to_string()))
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        session_from_headers(&parts.headers, &state.jwt)
    }
}

/// A session whose role is `admin`. Other sessions get 401.
#[derive(Debug, Clone)]
pub struct AdminSession(pub Session);

#[async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = session_from_headers(&parts.headers, &state.jwt)?;
        if !session.is_admin() {
            tracing::info!(user_id = %session.user_id, "Non-admin session rejected");
            return Err(ApiError::Unauthorized("Admin access required".to_string()));
        }
        Ok(AdminSession(session))
    }
}

/// Session when a valid token is present; never rejects.
#[derive(Debug, Clone)]
pub struct OptionalSession(pub Option<Session>);

#[async_trait]
impl FromRequestParts<AppState> for OptionalSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(OptionalSession(
            session_from_headers(&parts.headers, &state.jwt).ok(),
        ))
    }
}
