//! Request extractors for the session-authenticated API.

use crate::{entities::team_member::MemberRole, errors::ServiceError, AppState};
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::debug;
use uuid::Uuid;

/// The authenticated caller. Rejects with 401 when no identity can be resolved.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user_id: Uuid,
    pub selected_team: Option<Uuid>,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = state.identity.resolve(&parts.headers).await.map_err(|e| {
            debug!(reason = %e, "session resolution failed");
            ServiceError::Unauthorized
        })?;

        Ok(Self {
            user_id: identity.user_id,
            selected_team: identity.team_id,
        })
    }
}

/// The caller together with the team they are currently working in.
///
/// A token naming a team the user no longer belongs to counts as no selection.
#[derive(Debug, Clone)]
pub struct TeamScope {
    pub user_id: Uuid,
    pub team_id: Uuid,
    pub role: MemberRole,
}

impl TeamScope {
    pub fn is_admin(&self) -> bool {
        self.role == MemberRole::Admin
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for TeamScope {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = SessionUser::from_request_parts(parts, state).await?;
        let team_id = user.selected_team.ok_or(ServiceError::NoTeamSelected)?;

        let membership = state
            .services
            .users
            .membership(team_id, user.user_id)
            .await?
            .ok_or_else(|| {
                debug!(user_id = %user.user_id, team_id = %team_id, "stale team selection");
                ServiceError::NoTeamSelected
            })?;

        Ok(Self {
            user_id: user.user_id,
            team_id,
            role: membership.role,
        })
    }
}
