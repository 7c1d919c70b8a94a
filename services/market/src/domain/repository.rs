#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use agora_domain::pagination::PageRequest;
use agora_domain::visibility::{
    CartVisibility, OrderVisibility, ProductVisibility, ShipmentVisibility, UserVisibility,
};

use crate::domain::types::{
    Cart, CartLine, Category, Decision, Order, OrderLine, OrderStatus, Product, ProductFilter,
    ProductSortBy, Shipment, UpgradeRequest, User,
};
use crate::error::MarketServiceError;

/// Repository for user accounts.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, MarketServiceError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, MarketServiceError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, MarketServiceError>;

    /// Insert the user and their empty cart in one transaction.
    async fn create_with_cart(&self, user: &User) -> Result<(), MarketServiceError>;

    async fn list(
        &self,
        scope: UserVisibility,
        page: PageRequest,
    ) -> Result<Vec<User>, MarketServiceError>;

    /// Set or clear the verification flag with its audit fields.
    async fn set_verification(
        &self,
        id: Uuid,
        verified: bool,
        verified_by: Option<Uuid>,
        verified_at: Option<DateTime<Utc>>,
    ) -> Result<(), MarketServiceError>;
}

/// Repository for categories.
pub trait CategoryRepository: Send + Sync {
    async fn list(&self, page: PageRequest) -> Result<Vec<Category>, MarketServiceError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, MarketServiceError>;
    async fn create(&self, category: &Category) -> Result<(), MarketServiceError>;
    async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<(), MarketServiceError>;

    /// Delete a category. Returns `true` if a row was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, MarketServiceError>;
}

/// Repository for products. Every read takes a visibility scope computed by
/// the resolver; `Nothing` must yield an empty result without touching the
/// store.
pub trait ProductRepository: Send + Sync {
    async fn list(
        &self,
        scope: ProductVisibility,
        filter: &ProductFilter,
        sort_by: ProductSortBy,
        page: PageRequest,
    ) -> Result<Vec<Product>, MarketServiceError>;

    async fn find_in_scope(
        &self,
        scope: ProductVisibility,
        id: Uuid,
    ) -> Result<Option<Product>, MarketServiceError>;

    /// Unscoped lookup — cart operations reference products directly.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, MarketServiceError>;

    async fn create(&self, product: &Product) -> Result<(), MarketServiceError>;

    async fn update(
        &self,
        id: Uuid,
        changes: ProductChanges,
    ) -> Result<(), MarketServiceError>;

    /// Delete a product. Returns `true` if a row was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, MarketServiceError>;
}

/// Partial update for a product. `category_id` distinguishes "unchanged"
/// (None) from "cleared" (Some(None)).
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category_id: Option<Option<Uuid>>,
    pub stock: Option<u32>,
    pub is_active: Option<bool>,
}

impl ProductChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category_id.is_none()
            && self.stock.is_none()
            && self.is_active.is_none()
    }
}

/// Repository for carts and their lines.
pub trait CartRepository: Send + Sync {
    /// Fetch the user's cart, creating it if absent.
    async fn find_or_create(&self, user_id: Uuid) -> Result<Cart, MarketServiceError>;

    async fn list(
        &self,
        scope: CartVisibility,
        page: PageRequest,
    ) -> Result<Vec<Cart>, MarketServiceError>;

    async fn lines(&self, cart_id: Uuid) -> Result<Vec<CartLine>, MarketServiceError>;

    async fn find_line(
        &self,
        cart_id: Uuid,
        line_id: Uuid,
    ) -> Result<Option<CartLine>, MarketServiceError>;

    async fn insert_line(&self, line: &CartLine) -> Result<(), MarketServiceError>;

    async fn update_line_quantity(
        &self,
        line_id: Uuid,
        quantity: u32,
    ) -> Result<(), MarketServiceError>;

    /// Delete a cart line. Returns `true` if a row was deleted.
    async fn delete_line(&self, line_id: Uuid) -> Result<bool, MarketServiceError>;
}

/// Repository for orders, including the checkout transactor.
pub trait OrderRepository: Send + Sync {
    /// Convert the user's cart into an order, atomically: lock the cart row,
    /// snapshot prices into order lines, delete the cart lines. Fails with
    /// `EmptyCart` before any mutation when the cart has no lines.
    async fn checkout(&self, user_id: Uuid) -> Result<Order, MarketServiceError>;

    async fn list(
        &self,
        scope: OrderVisibility,
        page: PageRequest,
    ) -> Result<Vec<Order>, MarketServiceError>;

    async fn find_in_scope(
        &self,
        scope: OrderVisibility,
        id: Uuid,
    ) -> Result<Option<Order>, MarketServiceError>;

    async fn lines(&self, order_id: Uuid) -> Result<Vec<OrderLine>, MarketServiceError>;

    async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<(), MarketServiceError>;
}

/// Repository for shipments.
pub trait ShipmentRepository: Send + Sync {
    /// Insert a shipment. Fails with `ShipmentExists` when the order already
    /// has one.
    async fn create(&self, shipment: &Shipment) -> Result<(), MarketServiceError>;

    async fn list(
        &self,
        scope: ShipmentVisibility,
        page: PageRequest,
    ) -> Result<Vec<Shipment>, MarketServiceError>;

    async fn find_in_scope(
        &self,
        scope: ShipmentVisibility,
        id: Uuid,
    ) -> Result<Option<Shipment>, MarketServiceError>;

    async fn update(
        &self,
        id: Uuid,
        changes: ShipmentChanges,
    ) -> Result<(), MarketServiceError>;
}

/// Partial update for a shipment's fulfillment fields.
#[derive(Debug, Clone, Default)]
pub struct ShipmentChanges {
    pub tracking_number: Option<String>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

/// Repository for role-upgrade requests.
pub trait UpgradeRequestRepository: Send + Sync {
    async fn create(&self, request: &UpgradeRequest) -> Result<(), MarketServiceError>;

    async fn list_all(&self, page: PageRequest) -> Result<Vec<UpgradeRequest>, MarketServiceError>;

    async fn list_for(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<UpgradeRequest>, MarketServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UpgradeRequest>, MarketServiceError>;

    /// Apply an admin decision, atomically: flip the request out of pending
    /// (guarded — a request already decided fails with `RequestDecided`) and,
    /// on approval, grant the requested role and verification to the
    /// requester. Returns the updated request.
    async fn decide(
        &self,
        id: Uuid,
        decision: Decision,
        admin_id: Uuid,
        comment: Option<&str>,
    ) -> Result<UpgradeRequest, MarketServiceError>;
}

/// Refresh-token denylist.
pub trait RevokedTokenRepository: Send + Sync {
    async fn revoke(
        &self,
        jti: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), MarketServiceError>;

    async fn is_revoked(&self, jti: Uuid) -> Result<bool, MarketServiceError>;
}

/// Outbound notification port. Implementations are best-effort; callers
/// decide whether a failure matters (for upgrade decisions it never does).
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), anyhow::Error>;
}
