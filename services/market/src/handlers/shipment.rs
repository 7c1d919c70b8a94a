use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use agora_auth_types::identity::CurrentActor;
use agora_domain::pagination::PageRequest;

use crate::domain::types::Shipment;
use crate::error::MarketServiceError;
use crate::state::AppState;
use crate::usecase::shipment::{
    CreateShipmentInput, CreateShipmentUseCase, GetShipmentUseCase, ListShipmentsUseCase,
    UpdateShipmentInput, UpdateShipmentUseCase,
};

#[derive(Serialize)]
pub struct ShipmentResponse {
    pub id: Uuid,
    pub order_id: Uuid,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub tracking_number: Option<String>,
    #[serde(serialize_with = "agora_core::serde::opt_to_rfc3339_ms")]
    pub shipped_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(serialize_with = "agora_core::serde::opt_to_rfc3339_ms")]
    pub delivered_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<Shipment> for ShipmentResponse {
    fn from(shipment: Shipment) -> Self {
        Self {
            id: shipment.id,
            order_id: shipment.order_id,
            address: shipment.address,
            city: shipment.city,
            state: shipment.state,
            postal_code: shipment.postal_code,
            tracking_number: shipment.tracking_number,
            shipped_at: shipment.shipped_at,
            delivered_at: shipment.delivered_at,
        }
    }
}

// ── GET /shipments ───────────────────────────────────────────────────────────

pub async fn list_shipments(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Vec<ShipmentResponse>>, MarketServiceError> {
    let usecase = ListShipmentsUseCase {
        shipments: state.shipment_repo(),
    };
    let shipments = usecase.execute(&actor, page.clamped()).await?;
    Ok(Json(
        shipments.into_iter().map(ShipmentResponse::from).collect(),
    ))
}

// ── GET /shipments/{id} ──────────────────────────────────────────────────────

pub async fn get_shipment(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ShipmentResponse>, MarketServiceError> {
    let usecase = GetShipmentUseCase {
        shipments: state.shipment_repo(),
    };
    let shipment = usecase.execute(&actor, id).await?;
    Ok(Json(ShipmentResponse::from(shipment)))
}

// ── POST /shipments ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateShipmentRequest {
    pub order_id: Uuid,
    pub address: String,
    pub city: String,
    #[serde(default)]
    pub state: String,
    pub postal_code: String,
}

pub async fn create_shipment(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Json(body): Json<CreateShipmentRequest>,
) -> Result<(StatusCode, Json<ShipmentResponse>), MarketServiceError> {
    let usecase = CreateShipmentUseCase {
        shipments: state.shipment_repo(),
        orders: state.order_repo(),
    };
    let shipment = usecase
        .execute(
            &actor,
            CreateShipmentInput {
                order_id: body.order_id,
                address: body.address,
                city: body.city,
                state: body.state,
                postal_code: body.postal_code,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ShipmentResponse::from(shipment))))
}

// ── PATCH /shipments/{id} ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateShipmentRequest {
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub mark_shipped: bool,
    #[serde(default)]
    pub mark_delivered: bool,
}

pub async fn update_shipment(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateShipmentRequest>,
) -> Result<Json<ShipmentResponse>, MarketServiceError> {
    let usecase = UpdateShipmentUseCase {
        shipments: state.shipment_repo(),
    };
    let shipment = usecase
        .execute(
            &actor,
            id,
            UpdateShipmentInput {
                tracking_number: body.tracking_number,
                mark_shipped: body.mark_shipped,
                mark_delivered: body.mark_delivered,
            },
        )
        .await?;
    Ok(Json(ShipmentResponse::from(shipment)))
}
