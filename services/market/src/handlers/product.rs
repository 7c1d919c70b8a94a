use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use agora_auth_types::identity::CurrentActor;
use agora_domain::pagination::PageRequest;

use crate::domain::repository::ProductChanges;
use crate::domain::types::{Product, ProductFilter, ProductSortBy};
use crate::error::MarketServiceError;
use crate::state::AppState;
use crate::usecase::product::{
    CreateProductInput, CreateProductUseCase, DeleteProductUseCase, GetProductUseCase,
    ListProductsUseCase, UpdateProductUseCase,
};

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category_id: Option<Uuid>,
    pub stock: u32,
    pub is_active: bool,
    #[serde(serialize_with = "agora_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "agora_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            owner_id: product.owner_id,
            name: product.name,
            description: product.description,
            price: product.price,
            category_id: product.category_id,
            stock: product.stock,
            is_active: product.is_active,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

// ── GET /products ────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ProductListQuery {
    pub per_page: Option<u32>,
    pub page: Option<u32>,
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort_by: Option<String>,
}

pub async fn list_products(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Vec<ProductResponse>>, MarketServiceError> {
    let query: ProductListQuery = raw_query
        .as_deref()
        .map(serde_qs::from_str)
        .transpose()
        .map_err(|_| MarketServiceError::MissingData)?
        .unwrap_or_default();

    let sort_by = query
        .sort_by
        .as_deref()
        .and_then(ProductSortBy::from_query)
        .unwrap_or_default();
    let filter = ProductFilter {
        search: query.search,
        category_id: query.category_id,
        min_price: query.min_price,
        max_price: query.max_price,
    };
    let page = PageRequest {
        per_page: query.per_page.unwrap_or(20),
        page: query.page.unwrap_or(1),
    }
    .clamped();

    let usecase = ListProductsUseCase {
        products: state.product_repo(),
    };
    let products = usecase.execute(&actor, &filter, sort_by, page).await?;
    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

// ── GET /products/{id} ───────────────────────────────────────────────────────

pub async fn get_product(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductResponse>, MarketServiceError> {
    let usecase = GetProductUseCase {
        products: state.product_repo(),
    };
    let product = usecase.execute(&actor, id).await?;
    Ok(Json(ProductResponse::from(product)))
}

// ── POST /products ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub stock: u32,
}

pub async fn create_product(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Json(body): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), MarketServiceError> {
    let usecase = CreateProductUseCase {
        products: state.product_repo(),
        categories: state.category_repo(),
    };
    let product = usecase
        .execute(
            &actor,
            CreateProductInput {
                name: body.name,
                description: body.description,
                price: body.price,
                category_id: body.category_id,
                stock: body.stock,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}

// ── PATCH /products/{id} ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    /// Present-and-null clears the category; absent leaves it unchanged.
    #[serde(default, deserialize_with = "agora_core::serde::double_option")]
    pub category_id: Option<Option<Uuid>>,
    pub stock: Option<u32>,
    pub is_active: Option<bool>,
}

pub async fn update_product(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, MarketServiceError> {
    let usecase = UpdateProductUseCase {
        products: state.product_repo(),
        categories: state.category_repo(),
    };
    let product = usecase
        .execute(
            &actor,
            id,
            ProductChanges {
                name: body.name,
                description: body.description,
                price: body.price,
                category_id: body.category_id,
                stock: body.stock,
                is_active: body.is_active,
            },
        )
        .await?;
    Ok(Json(ProductResponse::from(product)))
}

// ── DELETE /products/{id} ────────────────────────────────────────────────────

pub async fn delete_product(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, MarketServiceError> {
    let usecase = DeleteProductUseCase {
        products: state.product_repo(),
    };
    usecase.execute(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
