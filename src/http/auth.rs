use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use crate::app::sessions::SessionService;
use crate::http::AppError;
use crate::AppState;

/// An authenticated caller, extracted from a `Bearer` session token.
/// Protected routes take `AuthUser`; public routes that personalize their
/// response take `Option<AuthUser>`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: uuid::Uuid,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("invalid Authorization header"))?;

        let service = SessionService::new(state.paseto_session_key, state.session_ttl_hours);
        let session = service
            .authenticate(token)
            .map_err(|_| AppError::internal("failed to authenticate"))?;

        let session = session.ok_or_else(|| AppError::unauthorized("invalid session token"))?;
        Ok(AuthUser {
            user_id: session.user_id,
        })
    }
}
