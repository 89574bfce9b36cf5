use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::Deserialize;

use crate::error::ApiError;
use crate::{AppState, run_blocking};

/// The acting user, resolved from the caller-supplied `handle` query
/// parameter. There is no session or token mechanism: the handle is trusted
/// as-is, and this extractor is the single place that trust is encoded.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: i64,
    pub handle: String,
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
struct IdentityQuery {
    handle: Option<String>,
}

impl FromRequestParts<AppState> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<IdentityQuery>::try_from_uri(&parts.uri)
            .map_err(|_| ApiError::validation("malformed query string"))?;

        let handle = query
            .handle
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ApiError::validation("missing required parameter: handle"))?;

        let state = state.clone();
        let lookup = handle.clone();
        let user = run_blocking(move || {
            state
                .db
                .get_user_by_username(&lookup)
                .map_err(ApiError::from)
        })
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User '{handle}' not found")))?;

        Ok(Identity {
            user_id: user.id,
            handle: user.username,
            display_name: user.display_name,
        })
    }
}
