use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Serialize;
use uuid::Uuid;

use agora_auth_types::identity::CurrentActor;
use agora_domain::pagination::PageRequest;
use agora_domain::role::Role;

use crate::domain::types::User;
use crate::error::MarketServiceError;
use crate::state::AppState;
use crate::usecase::user::{ListUsersUseCase, SetUserVerificationUseCase};

#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub verified: bool,
    pub verified_by: Option<Uuid>,
    #[serde(serialize_with = "agora_core::serde::opt_to_rfc3339_ms")]
    pub verified_at: Option<chrono::DateTime<chrono::Utc>>,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[serde(serialize_with = "agora_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            verified: user.verified,
            verified_by: user.verified_by,
            verified_at: user.verified_at,
            phone: user.phone,
            address: user.address,
            created_at: user.created_at,
        }
    }
}

// ── GET /users ───────────────────────────────────────────────────────────────

pub async fn list_users(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Vec<UserResponse>>, MarketServiceError> {
    let usecase = ListUsersUseCase {
        users: state.user_repo(),
    };
    let users = usecase.execute(&actor, page.clamped()).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

// ── POST /users/{id}/verify ──────────────────────────────────────────────────

pub async fn verify_user(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, MarketServiceError> {
    let usecase = SetUserVerificationUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(&actor, id, true).await?;
    Ok(Json(UserResponse::from(user)))
}

// ── POST /users/{id}/unverify ────────────────────────────────────────────────

pub async fn unverify_user(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, MarketServiceError> {
    let usecase = SetUserVerificationUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(&actor, id, false).await?;
    Ok(Json(UserResponse::from(user)))
}
