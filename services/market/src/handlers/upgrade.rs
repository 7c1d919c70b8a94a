use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use agora_auth_types::identity::CurrentActor;
use agora_domain::pagination::PageRequest;
use agora_domain::role::RequestedRole;

use crate::domain::types::{Decision, UpgradeRequest, UpgradeStatus};
use crate::error::MarketServiceError;
use crate::state::AppState;
use crate::usecase::upgrade::{
    CreateUpgradeRequestUseCase, DecideUpgradeRequestUseCase, GetUpgradeRequestUseCase,
    ListUpgradeRequestsUseCase,
};

#[derive(Serialize)]
pub struct UpgradeRequestResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub requested_role: RequestedRole,
    pub business_name: Option<String>,
    pub status: UpgradeStatus,
    pub admin_comment: Option<String>,
    #[serde(serialize_with = "agora_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "agora_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<UpgradeRequest> for UpgradeRequestResponse {
    fn from(request: UpgradeRequest) -> Self {
        Self {
            id: request.id,
            user_id: request.user_id,
            requested_role: request.requested_role,
            business_name: request.business_name,
            status: request.status,
            admin_comment: request.admin_comment,
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }
}

// ── GET /upgrade-requests ────────────────────────────────────────────────────

pub async fn list_upgrade_requests(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Vec<UpgradeRequestResponse>>, MarketServiceError> {
    let usecase = ListUpgradeRequestsUseCase {
        requests: state.upgrade_repo(),
    };
    let requests = usecase.execute(&actor, page.clamped()).await?;
    Ok(Json(
        requests
            .into_iter()
            .map(UpgradeRequestResponse::from)
            .collect(),
    ))
}

// ── GET /upgrade-requests/{id} ───────────────────────────────────────────────

pub async fn get_upgrade_request(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UpgradeRequestResponse>, MarketServiceError> {
    let usecase = GetUpgradeRequestUseCase {
        requests: state.upgrade_repo(),
    };
    let request = usecase.execute(&actor, id).await?;
    Ok(Json(UpgradeRequestResponse::from(request)))
}

// ── POST /upgrade-requests ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateUpgradeRequestRequest {
    pub requested_role: String,
    pub business_name: Option<String>,
}

pub async fn create_upgrade_request(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Json(body): Json<CreateUpgradeRequestRequest>,
) -> Result<(StatusCode, Json<UpgradeRequestResponse>), MarketServiceError> {
    let usecase = CreateUpgradeRequestUseCase {
        requests: state.upgrade_repo(),
    };
    let request = usecase
        .execute(&actor, &body.requested_role, body.business_name)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(UpgradeRequestResponse::from(request)),
    ))
}

// ── POST /upgrade-requests/{id}/approve | /reject ────────────────────────────

#[derive(Deserialize, Default)]
pub struct DecideUpgradeRequestRequest {
    pub comment: Option<String>,
}

async fn decide(
    actor: agora_domain::actor::Actor,
    state: AppState,
    id: Uuid,
    decision: Decision,
    comment: Option<String>,
) -> Result<Json<UpgradeRequestResponse>, MarketServiceError> {
    let usecase = DecideUpgradeRequestUseCase {
        requests: state.upgrade_repo(),
        users: state.user_repo(),
        notifier: state.notifier.clone(),
    };
    let request = usecase
        .execute(&actor, id, decision, comment.as_deref())
        .await?;
    Ok(Json(UpgradeRequestResponse::from(request)))
}

pub async fn approve_upgrade_request(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Option<Json<DecideUpgradeRequestRequest>>,
) -> Result<Json<UpgradeRequestResponse>, MarketServiceError> {
    let comment = body.and_then(|Json(b)| b.comment);
    decide(actor, state, id, Decision::Approve, comment).await
}

pub async fn reject_upgrade_request(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Option<Json<DecideUpgradeRequestRequest>>,
) -> Result<Json<UpgradeRequestResponse>, MarketServiceError> {
    let comment = body.and_then(|Json(b)| b.comment);
    decide(actor, state, id, Decision::Reject, comment).await
}
