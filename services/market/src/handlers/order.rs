use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use agora_auth_types::identity::CurrentActor;
use agora_domain::pagination::PageRequest;

use crate::domain::types::{Order, OrderLine, OrderStatus};
use crate::error::MarketServiceError;
use crate::state::AppState;
use crate::usecase::order::{
    CheckoutUseCase, GetOrderUseCase, ListOrdersUseCase, UpdateOrderStatusUseCase,
};

#[derive(Serialize)]
pub struct OrderLineResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl From<OrderLine> for OrderLineResponse {
    fn from(line: OrderLine) -> Self {
        Self {
            id: line.id,
            product_id: line.product_id,
            quantity: line.quantity,
            unit_price: line.unit_price,
        }
    }
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total: Decimal,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<Vec<OrderLineResponse>>,
    #[serde(serialize_with = "agora_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl OrderResponse {
    fn summary(order: Order) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            total: order.total,
            status: order.status,
            lines: None,
            created_at: order.created_at,
        }
    }

    fn with_lines(order: Order, lines: Vec<OrderLine>) -> Self {
        Self {
            lines: Some(lines.into_iter().map(OrderLineResponse::from).collect()),
            ..Self::summary(order)
        }
    }
}

// ── GET /orders ──────────────────────────────────────────────────────────────

pub async fn list_orders(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Vec<OrderResponse>>, MarketServiceError> {
    let usecase = ListOrdersUseCase {
        orders: state.order_repo(),
    };
    let orders = usecase.execute(&actor, page.clamped()).await?;
    Ok(Json(orders.into_iter().map(OrderResponse::summary).collect()))
}

// ── GET /orders/{id} ─────────────────────────────────────────────────────────

pub async fn get_order(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderResponse>, MarketServiceError> {
    let usecase = GetOrderUseCase {
        orders: state.order_repo(),
    };
    let (order, lines) = usecase.execute(&actor, id).await?;
    Ok(Json(OrderResponse::with_lines(order, lines)))
}

// ── POST /orders (checkout) ──────────────────────────────────────────────────

pub async fn checkout(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<OrderResponse>), MarketServiceError> {
    let usecase = CheckoutUseCase {
        orders: state.order_repo(),
    };
    let order = usecase.execute(&actor).await?;
    Ok((StatusCode::CREATED, Json(OrderResponse::summary(order))))
}

// ── PATCH /orders/{id} ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateOrderRequest {
    pub status: String,
}

pub async fn update_order(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateOrderRequest>,
) -> Result<Json<OrderResponse>, MarketServiceError> {
    let usecase = UpdateOrderStatusUseCase {
        orders: state.order_repo(),
    };
    let order = usecase.execute(&actor, id, &body.status).await?;
    Ok(Json(OrderResponse::summary(order)))
}
