use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use agora_auth_types::identity::CurrentActor;
use agora_domain::pagination::PageRequest;

use crate::domain::types::{Cart, CartLine};
use crate::error::MarketServiceError;
use crate::state::AppState;
use crate::usecase::cart::{
    AddCartLineUseCase, GetMyCartUseCase, ListCartsUseCase, RemoveCartLineUseCase,
    UpdateCartLineUseCase,
};

#[derive(Serialize)]
pub struct CartLineResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: u32,
}

impl From<CartLine> for CartLineResponse {
    fn from(line: CartLine) -> Self {
        Self {
            id: line.id,
            product_id: line.product_id,
            quantity: line.quantity,
        }
    }
}

#[derive(Serialize)]
pub struct CartResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub lines: Vec<CartLineResponse>,
    #[serde(serialize_with = "agora_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "agora_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl CartResponse {
    fn new(cart: Cart, lines: Vec<CartLine>) -> Self {
        Self {
            id: cart.id,
            user_id: cart.user_id,
            lines: lines.into_iter().map(CartLineResponse::from).collect(),
            created_at: cart.created_at,
            updated_at: cart.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct CartSummaryResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(serialize_with = "agora_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

// ── GET /carts ───────────────────────────────────────────────────────────────

pub async fn list_carts(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Vec<CartSummaryResponse>>, MarketServiceError> {
    let usecase = ListCartsUseCase {
        carts: state.cart_repo(),
    };
    let carts = usecase.execute(&actor, page.clamped()).await?;
    Ok(Json(
        carts
            .into_iter()
            .map(|cart| CartSummaryResponse {
                id: cart.id,
                user_id: cart.user_id,
                created_at: cart.created_at,
            })
            .collect(),
    ))
}

// ── GET /carts/@me ───────────────────────────────────────────────────────────

pub async fn get_my_cart(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
) -> Result<Json<CartResponse>, MarketServiceError> {
    let usecase = GetMyCartUseCase {
        carts: state.cart_repo(),
    };
    let (cart, lines) = usecase.execute(&actor).await?;
    Ok(Json(CartResponse::new(cart, lines)))
}

// ── POST /carts/@me/lines ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct AddCartLineRequest {
    pub product_id: Uuid,
    pub quantity: u32,
}

pub async fn add_cart_line(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Json(body): Json<AddCartLineRequest>,
) -> Result<(StatusCode, Json<CartLineResponse>), MarketServiceError> {
    let usecase = AddCartLineUseCase {
        carts: state.cart_repo(),
        products: state.product_repo(),
    };
    let line = usecase
        .execute(&actor, body.product_id, body.quantity)
        .await?;
    Ok((StatusCode::CREATED, Json(CartLineResponse::from(line))))
}

// ── PATCH /carts/@me/lines/{id} ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateCartLineRequest {
    pub quantity: u32,
}

pub async fn update_cart_line(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateCartLineRequest>,
) -> Result<Json<CartLineResponse>, MarketServiceError> {
    let usecase = UpdateCartLineUseCase {
        carts: state.cart_repo(),
    };
    let line = usecase.execute(&actor, id, body.quantity).await?;
    Ok(Json(CartLineResponse::from(line)))
}

// ── DELETE /carts/@me/lines/{id} ─────────────────────────────────────────────

pub async fn remove_cart_line(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, MarketServiceError> {
    let usecase = RemoveCartLineUseCase {
        carts: state.cart_repo(),
    };
    usecase.execute(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
