use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use agora_domain::access::{Method, ResourceKind};
use agora_domain::actor::Actor;
use agora_domain::pagination::PageRequest;
use agora_domain::visibility;

use crate::domain::repository::{CategoryRepository, ProductChanges, ProductRepository};
use crate::domain::types::{Product, ProductFilter, ProductSortBy};
use crate::error::MarketServiceError;
use crate::usecase::ensure_allowed;

// ── List / Get ───────────────────────────────────────────────────────────────

pub struct ListProductsUseCase<P: ProductRepository> {
    pub products: P,
}

impl<P: ProductRepository> ListProductsUseCase<P> {
    pub async fn execute(
        &self,
        actor: &Actor,
        filter: &ProductFilter,
        sort_by: ProductSortBy,
        page: PageRequest,
    ) -> Result<Vec<Product>, MarketServiceError> {
        self.products
            .list(visibility::products(actor), filter, sort_by, page)
            .await
    }
}

pub struct GetProductUseCase<P: ProductRepository> {
    pub products: P,
}

impl<P: ProductRepository> GetProductUseCase<P> {
    /// Out-of-scope products read as absent, not forbidden — a consumer must
    /// not learn that an unlisted product id exists.
    pub async fn execute(&self, actor: &Actor, id: Uuid) -> Result<Product, MarketServiceError> {
        self.products
            .find_in_scope(visibility::products(actor), id)
            .await?
            .ok_or(MarketServiceError::ProductNotFound)
    }
}

// ── Create ───────────────────────────────────────────────────────────────────

pub struct CreateProductInput {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category_id: Option<Uuid>,
    pub stock: u32,
}

pub struct CreateProductUseCase<P: ProductRepository, C: CategoryRepository> {
    pub products: P,
    pub categories: C,
}

impl<P: ProductRepository, C: CategoryRepository> CreateProductUseCase<P, C> {
    pub async fn execute(
        &self,
        actor: &Actor,
        input: CreateProductInput,
    ) -> Result<Product, MarketServiceError> {
        ensure_allowed(actor, Method::Post, ResourceKind::Products)?;
        let owner_id = actor.user_id().ok_or(MarketServiceError::Unauthorized)?;
        if input.name.trim().is_empty() {
            return Err(MarketServiceError::MissingData);
        }
        if input.price.is_sign_negative() {
            return Err(MarketServiceError::InvalidPrice);
        }
        if let Some(category_id) = input.category_id {
            if self.categories.find_by_id(category_id).await?.is_none() {
                return Err(MarketServiceError::CategoryNotFound);
            }
        }
        let now = Utc::now();
        let product = Product {
            id: Uuid::now_v7(),
            owner_id,
            name: input.name,
            description: input.description,
            price: input.price,
            category_id: input.category_id,
            stock: input.stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.products.create(&product).await?;
        Ok(product)
    }
}

// ── Update / Delete ──────────────────────────────────────────────────────────

pub struct UpdateProductUseCase<P: ProductRepository, C: CategoryRepository> {
    pub products: P,
    pub categories: C,
}

impl<P: ProductRepository, C: CategoryRepository> UpdateProductUseCase<P, C> {
    pub async fn execute(
        &self,
        actor: &Actor,
        id: Uuid,
        changes: ProductChanges,
    ) -> Result<Product, MarketServiceError> {
        ensure_allowed(actor, Method::Patch, ResourceKind::Products)?;
        if changes.is_empty() {
            return Err(MarketServiceError::MissingData);
        }
        if let Some(price) = changes.price {
            if price.is_sign_negative() {
                return Err(MarketServiceError::InvalidPrice);
            }
        }
        if let Some(Some(category_id)) = changes.category_id {
            if self.categories.find_by_id(category_id).await?.is_none() {
                return Err(MarketServiceError::CategoryNotFound);
            }
        }
        let product = self.find_owned(actor, id).await?;
        self.products.update(product.id, changes).await?;
        self.products
            .find_by_id(id)
            .await?
            .ok_or(MarketServiceError::ProductNotFound)
    }

    async fn find_owned(&self, actor: &Actor, id: Uuid) -> Result<Product, MarketServiceError> {
        // Scope first (invisible reads as absent), ownership second (visible
        // but foreign yields forbidden).
        let product = self
            .products
            .find_in_scope(visibility::products(actor), id)
            .await?
            .ok_or(MarketServiceError::ProductNotFound)?;
        if !actor.is_admin() && actor.user_id() != Some(product.owner_id) {
            return Err(MarketServiceError::Forbidden);
        }
        Ok(product)
    }
}

pub struct DeleteProductUseCase<P: ProductRepository> {
    pub products: P,
}

impl<P: ProductRepository> DeleteProductUseCase<P> {
    pub async fn execute(&self, actor: &Actor, id: Uuid) -> Result<(), MarketServiceError> {
        ensure_allowed(actor, Method::Delete, ResourceKind::Products)?;
        let product = self
            .products
            .find_in_scope(visibility::products(actor), id)
            .await?
            .ok_or(MarketServiceError::ProductNotFound)?;
        if !actor.is_admin() && actor.user_id() != Some(product.owner_id) {
            return Err(MarketServiceError::Forbidden);
        }
        if !self.products.delete(product.id).await? {
            return Err(MarketServiceError::ProductNotFound);
        }
        Ok(())
    }
}
