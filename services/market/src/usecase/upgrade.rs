use chrono::Utc;
use uuid::Uuid;

use agora_domain::actor::Actor;
use agora_domain::pagination::PageRequest;
use agora_domain::role::RequestedRole;

use crate::domain::repository::{Notifier, UpgradeRequestRepository, UserRepository};
use crate::domain::types::{Decision, UpgradeRequest, UpgradeStatus};
use crate::error::MarketServiceError;
use crate::usecase::ensure_admin;

// ── Create ───────────────────────────────────────────────────────────────────

pub struct CreateUpgradeRequestUseCase<R: UpgradeRequestRepository> {
    pub requests: R,
}

impl<R: UpgradeRequestRepository> CreateUpgradeRequestUseCase<R> {
    pub async fn execute(
        &self,
        actor: &Actor,
        requested_role: &str,
        business_name: Option<String>,
    ) -> Result<UpgradeRequest, MarketServiceError> {
        let identity = actor.identity().ok_or(MarketServiceError::Unauthorized)?;
        let requested_role = RequestedRole::from_str_value(requested_role)
            .ok_or(MarketServiceError::InvalidRole)?;
        let now = Utc::now();
        let request = UpgradeRequest {
            id: Uuid::now_v7(),
            user_id: identity.user_id,
            requested_role,
            business_name,
            status: UpgradeStatus::Pending,
            admin_comment: None,
            created_at: now,
            updated_at: now,
        };
        self.requests.create(&request).await?;
        Ok(request)
    }
}

// ── List ─────────────────────────────────────────────────────────────────────

pub struct ListUpgradeRequestsUseCase<R: UpgradeRequestRepository> {
    pub requests: R,
}

impl<R: UpgradeRequestRepository> ListUpgradeRequestsUseCase<R> {
    /// Admins review the full queue; everyone else sees only their own
    /// requests.
    pub async fn execute(
        &self,
        actor: &Actor,
        page: PageRequest,
    ) -> Result<Vec<UpgradeRequest>, MarketServiceError> {
        let identity = actor.identity().ok_or(MarketServiceError::Unauthorized)?;
        if actor.is_admin() {
            self.requests.list_all(page).await
        } else {
            self.requests.list_for(identity.user_id, page).await
        }
    }
}

pub struct GetUpgradeRequestUseCase<R: UpgradeRequestRepository> {
    pub requests: R,
}

impl<R: UpgradeRequestRepository> GetUpgradeRequestUseCase<R> {
    pub async fn execute(
        &self,
        actor: &Actor,
        id: Uuid,
    ) -> Result<UpgradeRequest, MarketServiceError> {
        let identity = actor.identity().ok_or(MarketServiceError::Unauthorized)?;
        let request = self
            .requests
            .find_by_id(id)
            .await?
            .ok_or(MarketServiceError::UpgradeRequestNotFound)?;
        if !actor.is_admin() && request.user_id != identity.user_id {
            // Foreign requests read as absent.
            return Err(MarketServiceError::UpgradeRequestNotFound);
        }
        Ok(request)
    }
}

// ── Decide ───────────────────────────────────────────────────────────────────

pub struct DecideUpgradeRequestUseCase<R, U, N>
where
    R: UpgradeRequestRepository,
    U: UserRepository,
    N: Notifier,
{
    pub requests: R,
    pub users: U,
    pub notifier: N,
}

impl<R, U, N> DecideUpgradeRequestUseCase<R, U, N>
where
    R: UpgradeRequestRepository,
    U: UserRepository,
    N: Notifier,
{
    /// Admin-only terminal transition. Approval grants the requested role and
    /// verification atomically with the status flip; a request already
    /// decided conflicts. The requester is notified by mail afterwards,
    /// best-effort.
    pub async fn execute(
        &self,
        actor: &Actor,
        id: Uuid,
        decision: Decision,
        comment: Option<&str>,
    ) -> Result<UpgradeRequest, MarketServiceError> {
        ensure_admin(actor)?;
        let admin_id = actor.user_id().ok_or(MarketServiceError::Unauthorized)?;
        let request = self.requests.decide(id, decision, admin_id, comment).await?;
        self.notify_requester(&request, comment).await;
        Ok(request)
    }

    async fn notify_requester(&self, request: &UpgradeRequest, comment: Option<&str>) {
        let requester = match self.users.find_by_id(request.user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(error = %e, "could not load requester for notification");
                return;
            }
        };
        let subject = format!(
            "Your role-upgrade request has been {}",
            request.status.as_str()
        );
        let body = format!(
            "Hello {},\n\nYour request to upgrade to '{}' has been {}.\nComment: {}\n",
            requester.username,
            request.requested_role.as_str(),
            request.status.as_str(),
            comment.unwrap_or("none"),
        );
        if let Err(e) = self.notifier.send(&requester.email, &subject, &body).await {
            tracing::warn!(error = %e, "failed to send upgrade decision mail");
        }
    }
}
