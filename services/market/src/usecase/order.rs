use uuid::Uuid;

use agora_domain::access::{Method, ResourceKind};
use agora_domain::actor::Actor;
use agora_domain::pagination::PageRequest;
use agora_domain::visibility::{self, OrderVisibility};

use crate::domain::repository::OrderRepository;
use crate::domain::types::{Order, OrderLine, OrderStatus};
use crate::error::MarketServiceError;
use crate::usecase::{ensure_admin, ensure_allowed};

// ── Checkout ─────────────────────────────────────────────────────────────────

pub struct CheckoutUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> CheckoutUseCase<O> {
    /// Convert the caller's cart into an order. The repository runs the
    /// all-or-nothing transaction; an empty cart fails before any mutation.
    pub async fn execute(&self, actor: &Actor) -> Result<Order, MarketServiceError> {
        ensure_allowed(actor, Method::Post, ResourceKind::Orders)?;
        let user_id = actor.user_id().ok_or(MarketServiceError::Unauthorized)?;
        self.orders.checkout(user_id).await
    }
}

// ── List / Get ───────────────────────────────────────────────────────────────

pub struct ListOrdersUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> ListOrdersUseCase<O> {
    pub async fn execute(
        &self,
        actor: &Actor,
        page: PageRequest,
    ) -> Result<Vec<Order>, MarketServiceError> {
        self.orders.list(visibility::orders(actor), page).await
    }
}

pub struct GetOrderUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> GetOrderUseCase<O> {
    pub async fn execute(
        &self,
        actor: &Actor,
        id: Uuid,
    ) -> Result<(Order, Vec<OrderLine>), MarketServiceError> {
        let order = self
            .orders
            .find_in_scope(visibility::orders(actor), id)
            .await?
            .ok_or(MarketServiceError::OrderNotFound)?;
        let lines = self.orders.lines(order.id).await?;
        Ok((order, lines))
    }
}

// ── Status update ────────────────────────────────────────────────────────────

pub struct UpdateOrderStatusUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> UpdateOrderStatusUseCase<O> {
    /// Admin-only. The status value arrives as a string from the request
    /// body; anything outside the closed set is a validation failure.
    pub async fn execute(
        &self,
        actor: &Actor,
        id: Uuid,
        status: &str,
    ) -> Result<Order, MarketServiceError> {
        ensure_admin(actor)?;
        let status =
            OrderStatus::from_str_value(status).ok_or(MarketServiceError::InvalidStatus)?;
        let order = self
            .orders
            .find_in_scope(OrderVisibility::Everything, id)
            .await?
            .ok_or(MarketServiceError::OrderNotFound)?;
        self.orders.update_status(order.id, status).await?;
        Ok(Order { status, ..order })
    }
}
