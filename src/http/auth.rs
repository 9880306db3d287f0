use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use crate::app::auth::{ApiKeyService, AuthFailure, Scope};
use crate::domain::community::Community;
use crate::http::ApiError;
use crate::AppState;

/// The authenticated acting community, resolved from the bearer token and
/// attached to the handler. Wrapping a handler argument in this type is
/// what puts the route behind private-scope auth.
#[derive(Debug, Clone)]
pub struct AuthCommunity {
    pub community: Community,
    pub scope: Scope,
}

/// Same resolution, but the route additionally requires master scope.
#[derive(Debug, Clone)]
pub struct MasterAuth {
    pub community: Community,
}

async fn resolve(parts: &mut Parts, state: &AppState) -> Result<AuthCommunity, ApiError> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("missing credentials"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthorized("missing credentials"))?;

    let service = ApiKeyService::new(state.db.clone(), state.api_key);
    let session = service.authenticate(token).await.map_err(|failure| {
        match failure {
            AuthFailure::InvalidToken => ApiError::unauthorized("invalid token"),
            AuthFailure::Malformed => ApiError::unauthorized("malformed token"),
            AuthFailure::UnknownCommunity => {
                ApiError::unauthorized("community not found")
            }
            AuthFailure::Revoked => ApiError::unauthorized("token revoked"),
            AuthFailure::Internal(err) => {
                tracing::error!(error = ?err, "failed to authenticate");
                ApiError::internal("failed to authenticate")
            }
        }
    })?;

    Ok(AuthCommunity {
        community: session.community,
        scope: session.scope,
    })
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthCommunity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve(parts, state).await
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for MasterAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = resolve(parts, state).await?;
        if auth.scope != Scope::Master {
            return Err(ApiError::forbidden("master scope required"));
        }
        Ok(MasterAuth {
            community: auth.community,
        })
    }
}
