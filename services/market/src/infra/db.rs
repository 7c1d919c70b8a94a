use anyhow::{Context as _, anyhow};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionError, TransactionTrait,
    sea_query::{Expr, Query},
};
use uuid::Uuid;

use agora_domain::pagination::{PageRequest, Sort};
use agora_domain::role::{RequestedRole, Role};
use agora_domain::visibility::{
    CartVisibility, OrderVisibility, ProductVisibility, ShipmentVisibility, UserVisibility,
};
use agora_market_schema::{
    cart_lines, carts, categories, order_lines, orders, products, revoked_tokens, shipments,
    upgrade_requests, users,
};

use crate::domain::repository::{
    CartRepository, CategoryRepository, OrderRepository, ProductChanges, ProductRepository,
    RevokedTokenRepository, ShipmentChanges, ShipmentRepository, UpgradeRequestRepository,
    UserRepository,
};
use crate::domain::types::{
    Cart, CartLine, Category, Decision, Order, OrderLine, OrderStatus, PricedLine, Product,
    ProductFilter, ProductSortBy, Shipment, UpgradeRequest, UpgradeStatus, User, order_total,
};
use crate::error::MarketServiceError;

fn txn_err(e: TransactionError<MarketServiceError>) -> MarketServiceError {
    match e {
        TransactionError::Connection(db) => {
            MarketServiceError::Internal(anyhow::Error::new(db).context("transaction"))
        }
        TransactionError::Transaction(e) => e,
    }
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

fn user_from_model(model: users::Model) -> Result<User, MarketServiceError> {
    let role = Role::from_str_value(&model.role)
        .ok_or_else(|| anyhow!("unknown role in users.role: {}", model.role))?;
    Ok(User {
        id: model.id,
        username: model.username,
        email: model.email,
        password_hash: model.password_hash,
        role,
        verified: model.verified,
        verified_by: model.verified_by,
        verified_at: model.verified_at,
        phone: model.phone,
        address: model.address,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, MarketServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, MarketServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
            .context("find user by username")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, MarketServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        model.map(user_from_model).transpose()
    }

    async fn create_with_cart(&self, user: &User) -> Result<(), MarketServiceError> {
        let user = user.clone();
        self.db
            .transaction::<_, (), MarketServiceError>(|txn| {
                Box::pin(async move {
                    users::ActiveModel {
                        id: Set(user.id),
                        username: Set(user.username.clone()),
                        email: Set(user.email.clone()),
                        password_hash: Set(user.password_hash.clone()),
                        role: Set(user.role.as_str().to_owned()),
                        verified: Set(user.verified),
                        verified_by: Set(user.verified_by),
                        verified_at: Set(user.verified_at),
                        phone: Set(user.phone.clone()),
                        address: Set(user.address.clone()),
                        created_at: Set(user.created_at),
                        updated_at: Set(user.updated_at),
                    }
                    .insert(txn)
                    .await
                    .context("create user")?;
                    carts::ActiveModel {
                        id: Set(Uuid::now_v7()),
                        user_id: Set(user.id),
                        created_at: Set(user.created_at),
                        updated_at: Set(user.created_at),
                    }
                    .insert(txn)
                    .await
                    .context("create cart for user")?;
                    Ok(())
                })
            })
            .await
            .map_err(txn_err)
    }

    async fn list(
        &self,
        scope: UserVisibility,
        page: PageRequest,
    ) -> Result<Vec<User>, MarketServiceError> {
        let mut query = users::Entity::find();
        match scope {
            UserVisibility::Everything => {}
            UserVisibility::WithRole(role) => {
                query = query.filter(users::Column::Role.eq(role.as_str()));
            }
            UserVisibility::Itself(user_id) => {
                query = query.filter(users::Column::Id.eq(user_id));
            }
            UserVisibility::Nothing => return Ok(Vec::new()),
        }
        let models = query
            .order_by_desc(users::Column::CreatedAt)
            .limit(page.limit())
            .offset(page.offset())
            .all(&self.db)
            .await
            .context("list users")?;
        models.into_iter().map(user_from_model).collect()
    }

    async fn set_verification(
        &self,
        id: Uuid,
        verified: bool,
        verified_by: Option<Uuid>,
        verified_at: Option<DateTime<Utc>>,
    ) -> Result<(), MarketServiceError> {
        users::ActiveModel {
            id: Set(id),
            verified: Set(verified),
            verified_by: Set(verified_by),
            verified_at: Set(verified_at),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("set user verification")?;
        Ok(())
    }
}

// ── Category repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCategoryRepository {
    pub db: DatabaseConnection,
}

fn category_from_model(model: categories::Model) -> Category {
    Category {
        id: model.id,
        name: model.name,
        description: model.description,
    }
}

impl CategoryRepository for DbCategoryRepository {
    async fn list(&self, page: PageRequest) -> Result<Vec<Category>, MarketServiceError> {
        let models = categories::Entity::find()
            .order_by_asc(categories::Column::Name)
            .limit(page.limit())
            .offset(page.offset())
            .all(&self.db)
            .await
            .context("list categories")?;
        Ok(models.into_iter().map(category_from_model).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, MarketServiceError> {
        let model = categories::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find category")?;
        Ok(model.map(category_from_model))
    }

    async fn create(&self, category: &Category) -> Result<(), MarketServiceError> {
        categories::ActiveModel {
            id: Set(category.id),
            name: Set(category.name.clone()),
            description: Set(category.description.clone()),
        }
        .insert(&self.db)
        .await
        .context("create category")?;
        Ok(())
    }

    async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<(), MarketServiceError> {
        let mut am = categories::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(name) = name {
            am.name = Set(name.to_owned());
        }
        if let Some(description) = description {
            am.description = Set(Some(description.to_owned()));
        }
        am.update(&self.db).await.context("update category")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, MarketServiceError> {
        let res = categories::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete category")?;
        Ok(res.rows_affected > 0)
    }
}

// ── Product repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbProductRepository {
    pub db: DatabaseConnection,
}

fn product_from_model(model: products::Model) -> Product {
    Product {
        id: model.id,
        owner_id: model.owner_id,
        name: model.name,
        description: model.description,
        price: model.price,
        category_id: model.category_id,
        stock: model.stock.max(0) as u32,
        is_active: model.is_active,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

/// Subquery: ids of verified users holding `role`.
fn verified_owner_subquery(role: Role) -> sea_orm::sea_query::SelectStatement {
    Query::select()
        .column(users::Column::Id)
        .from(users::Entity)
        .and_where(Expr::col(users::Column::Role).eq(role.as_str()))
        .and_where(Expr::col(users::Column::Verified).eq(true))
        .to_owned()
}

fn apply_product_scope(
    query: sea_orm::Select<products::Entity>,
    scope: ProductVisibility,
) -> Option<sea_orm::Select<products::Entity>> {
    match scope {
        ProductVisibility::Everything => Some(query),
        ProductVisibility::Own(owner_id) => {
            Some(query.filter(products::Column::OwnerId.eq(owner_id)))
        }
        ProductVisibility::OwnedByVerified(role) => Some(
            query.filter(products::Column::OwnerId.in_subquery(verified_owner_subquery(role))),
        ),
        ProductVisibility::Nothing => None,
    }
}

impl ProductRepository for DbProductRepository {
    async fn list(
        &self,
        scope: ProductVisibility,
        filter: &ProductFilter,
        sort_by: ProductSortBy,
        page: PageRequest,
    ) -> Result<Vec<Product>, MarketServiceError> {
        let Some(mut query) = apply_product_scope(products::Entity::find(), scope) else {
            return Ok(Vec::new());
        };
        if let Some(ref search) = filter.search {
            let pattern = format!("%{search}%");
            query = query.filter(
                Condition::any()
                    .add(products::Column::Name.like(&pattern))
                    .add(products::Column::Description.like(&pattern)),
            );
        }
        if let Some(category_id) = filter.category_id {
            query = query.filter(products::Column::CategoryId.eq(category_id));
        }
        if let Some(min_price) = filter.min_price {
            query = query.filter(products::Column::Price.gte(min_price));
        }
        if let Some(max_price) = filter.max_price {
            query = query.filter(products::Column::Price.lte(max_price));
        }
        query = match sort_by {
            ProductSortBy::CreatedAt(Sort::Desc) => query.order_by_desc(products::Column::CreatedAt),
            ProductSortBy::CreatedAt(Sort::Asc) => query.order_by_asc(products::Column::CreatedAt),
            ProductSortBy::Price(Sort::Desc) => query.order_by_desc(products::Column::Price),
            ProductSortBy::Price(Sort::Asc) => query.order_by_asc(products::Column::Price),
        };
        let models = query
            .limit(page.limit())
            .offset(page.offset())
            .all(&self.db)
            .await
            .context("list products")?;
        Ok(models.into_iter().map(product_from_model).collect())
    }

    async fn find_in_scope(
        &self,
        scope: ProductVisibility,
        id: Uuid,
    ) -> Result<Option<Product>, MarketServiceError> {
        let Some(query) = apply_product_scope(products::Entity::find_by_id(id), scope) else {
            return Ok(None);
        };
        let model = query.one(&self.db).await.context("find product in scope")?;
        Ok(model.map(product_from_model))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, MarketServiceError> {
        let model = products::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find product")?;
        Ok(model.map(product_from_model))
    }

    async fn create(&self, product: &Product) -> Result<(), MarketServiceError> {
        products::ActiveModel {
            id: Set(product.id),
            owner_id: Set(product.owner_id),
            name: Set(product.name.clone()),
            description: Set(product.description.clone()),
            price: Set(product.price),
            category_id: Set(product.category_id),
            stock: Set(product.stock as i32),
            is_active: Set(product.is_active),
            created_at: Set(product.created_at),
            updated_at: Set(product.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create product")?;
        Ok(())
    }

    async fn update(&self, id: Uuid, changes: ProductChanges) -> Result<(), MarketServiceError> {
        let mut am = products::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(name) = changes.name {
            am.name = Set(name);
        }
        if let Some(description) = changes.description {
            am.description = Set(description);
        }
        if let Some(price) = changes.price {
            am.price = Set(price);
        }
        if let Some(category_id) = changes.category_id {
            am.category_id = Set(category_id);
        }
        if let Some(stock) = changes.stock {
            am.stock = Set(stock as i32);
        }
        if let Some(is_active) = changes.is_active {
            am.is_active = Set(is_active);
        }
        am.updated_at = Set(Utc::now());
        am.update(&self.db).await.context("update product")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, MarketServiceError> {
        let res = products::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete product")?;
        Ok(res.rows_affected > 0)
    }
}

// ── Cart repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCartRepository {
    pub db: DatabaseConnection,
}

fn cart_from_model(model: carts::Model) -> Cart {
    Cart {
        id: model.id,
        user_id: model.user_id,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn cart_line_from_model(model: cart_lines::Model) -> CartLine {
    CartLine {
        id: model.id,
        cart_id: model.cart_id,
        product_id: model.product_id,
        quantity: model.quantity.max(0) as u32,
    }
}

impl CartRepository for DbCartRepository {
    async fn find_or_create(&self, user_id: Uuid) -> Result<Cart, MarketServiceError> {
        let existing = carts::Entity::find()
            .filter(carts::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .context("find cart")?;
        if let Some(model) = existing {
            return Ok(cart_from_model(model));
        }
        let now = Utc::now();
        let model = carts::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(user_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .context("create cart")?;
        Ok(cart_from_model(model))
    }

    async fn list(
        &self,
        scope: CartVisibility,
        page: PageRequest,
    ) -> Result<Vec<Cart>, MarketServiceError> {
        let mut query = carts::Entity::find();
        match scope {
            CartVisibility::Everything => {}
            CartVisibility::Own(user_id) => {
                query = query.filter(carts::Column::UserId.eq(user_id));
            }
            CartVisibility::Nothing => return Ok(Vec::new()),
        }
        let models = query
            .order_by_desc(carts::Column::CreatedAt)
            .limit(page.limit())
            .offset(page.offset())
            .all(&self.db)
            .await
            .context("list carts")?;
        Ok(models.into_iter().map(cart_from_model).collect())
    }

    async fn lines(&self, cart_id: Uuid) -> Result<Vec<CartLine>, MarketServiceError> {
        let models = cart_lines::Entity::find()
            .filter(cart_lines::Column::CartId.eq(cart_id))
            .all(&self.db)
            .await
            .context("list cart lines")?;
        Ok(models.into_iter().map(cart_line_from_model).collect())
    }

    async fn find_line(
        &self,
        cart_id: Uuid,
        line_id: Uuid,
    ) -> Result<Option<CartLine>, MarketServiceError> {
        let model = cart_lines::Entity::find_by_id(line_id)
            .filter(cart_lines::Column::CartId.eq(cart_id))
            .one(&self.db)
            .await
            .context("find cart line")?;
        Ok(model.map(cart_line_from_model))
    }

    async fn insert_line(&self, line: &CartLine) -> Result<(), MarketServiceError> {
        cart_lines::ActiveModel {
            id: Set(line.id),
            cart_id: Set(line.cart_id),
            product_id: Set(line.product_id),
            quantity: Set(line.quantity as i32),
        }
        .insert(&self.db)
        .await
        .context("insert cart line")?;
        Ok(())
    }

    async fn update_line_quantity(
        &self,
        line_id: Uuid,
        quantity: u32,
    ) -> Result<(), MarketServiceError> {
        cart_lines::ActiveModel {
            id: Set(line_id),
            quantity: Set(quantity as i32),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update cart line quantity")?;
        Ok(())
    }

    async fn delete_line(&self, line_id: Uuid) -> Result<bool, MarketServiceError> {
        let res = cart_lines::Entity::delete_by_id(line_id)
            .exec(&self.db)
            .await
            .context("delete cart line")?;
        Ok(res.rows_affected > 0)
    }
}

// ── Order repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOrderRepository {
    pub db: DatabaseConnection,
}

fn order_from_model(model: orders::Model) -> Result<Order, MarketServiceError> {
    let status = OrderStatus::from_str_value(&model.status)
        .ok_or_else(|| anyhow!("unknown status in orders.status: {}", model.status))?;
    Ok(Order {
        id: model.id,
        user_id: model.user_id,
        total: model.total,
        status,
        created_at: model.created_at,
    })
}

fn order_line_from_model(model: order_lines::Model) -> OrderLine {
    OrderLine {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        quantity: model.quantity.max(0) as u32,
        unit_price: model.unit_price,
    }
}

/// Subquery: ids of orders containing at least one line whose product is
/// owned by `owner_id`.
fn supplying_order_subquery(owner_id: Uuid) -> sea_orm::sea_query::SelectStatement {
    Query::select()
        .column(order_lines::Column::OrderId)
        .from(order_lines::Entity)
        .and_where(
            Expr::col(order_lines::Column::ProductId).in_subquery(
                Query::select()
                    .column(products::Column::Id)
                    .from(products::Entity)
                    .and_where(Expr::col(products::Column::OwnerId).eq(owner_id))
                    .to_owned(),
            ),
        )
        .to_owned()
}

fn apply_order_scope(
    query: sea_orm::Select<orders::Entity>,
    scope: OrderVisibility,
) -> Option<sea_orm::Select<orders::Entity>> {
    match scope {
        OrderVisibility::Everything => Some(query),
        OrderVisibility::Supplying(owner_id) => {
            Some(query.filter(orders::Column::Id.in_subquery(supplying_order_subquery(owner_id))))
        }
        OrderVisibility::Own(user_id) => Some(query.filter(orders::Column::UserId.eq(user_id))),
        OrderVisibility::Nothing => None,
    }
}

impl OrderRepository for DbOrderRepository {
    async fn checkout(&self, user_id: Uuid) -> Result<Order, MarketServiceError> {
        self.db
            .transaction::<_, Order, MarketServiceError>(move |txn| {
                Box::pin(async move {
                    // Row lock serializes concurrent checkouts on the same
                    // cart; the second caller waits here and then sees the
                    // emptied cart.
                    let cart = carts::Entity::find()
                        .filter(carts::Column::UserId.eq(user_id))
                        .lock_exclusive()
                        .one(txn)
                        .await
                        .context("lock cart")?
                        .ok_or(MarketServiceError::EmptyCart)?;

                    let rows = cart_lines::Entity::find()
                        .filter(cart_lines::Column::CartId.eq(cart.id))
                        .find_also_related(products::Entity)
                        .all(txn)
                        .await
                        .context("load cart lines with products")?;
                    if rows.is_empty() {
                        return Err(MarketServiceError::EmptyCart);
                    }

                    let priced = rows
                        .into_iter()
                        .map(|(line, product)| {
                            let product =
                                product.ok_or_else(|| anyhow!("cart line without product"))?;
                            Ok(PricedLine {
                                product_id: product.id,
                                quantity: line.quantity.max(0) as u32,
                                unit_price: product.price,
                            })
                        })
                        .collect::<Result<Vec<_>, anyhow::Error>>()?;

                    let now = Utc::now();
                    let order = orders::ActiveModel {
                        id: Set(Uuid::now_v7()),
                        user_id: Set(user_id),
                        total: Set(order_total(&priced)),
                        status: Set(OrderStatus::Pending.as_str().to_owned()),
                        created_at: Set(now),
                    }
                    .insert(txn)
                    .await
                    .context("insert order")?;

                    for line in &priced {
                        order_lines::ActiveModel {
                            id: Set(Uuid::now_v7()),
                            order_id: Set(order.id),
                            product_id: Set(line.product_id),
                            quantity: Set(line.quantity as i32),
                            unit_price: Set(line.unit_price),
                        }
                        .insert(txn)
                        .await
                        .context("insert order line")?;
                    }

                    cart_lines::Entity::delete_many()
                        .filter(cart_lines::Column::CartId.eq(cart.id))
                        .exec(txn)
                        .await
                        .context("empty cart")?;

                    order_from_model(order)
                })
            })
            .await
            .map_err(txn_err)
    }

    async fn list(
        &self,
        scope: OrderVisibility,
        page: PageRequest,
    ) -> Result<Vec<Order>, MarketServiceError> {
        let Some(query) = apply_order_scope(orders::Entity::find(), scope) else {
            return Ok(Vec::new());
        };
        let models = query
            .order_by_desc(orders::Column::CreatedAt)
            .limit(page.limit())
            .offset(page.offset())
            .all(&self.db)
            .await
            .context("list orders")?;
        models.into_iter().map(order_from_model).collect()
    }

    async fn find_in_scope(
        &self,
        scope: OrderVisibility,
        id: Uuid,
    ) -> Result<Option<Order>, MarketServiceError> {
        let Some(query) = apply_order_scope(orders::Entity::find_by_id(id), scope) else {
            return Ok(None);
        };
        let model = query.one(&self.db).await.context("find order in scope")?;
        model.map(order_from_model).transpose()
    }

    async fn lines(&self, order_id: Uuid) -> Result<Vec<OrderLine>, MarketServiceError> {
        let models = order_lines::Entity::find()
            .filter(order_lines::Column::OrderId.eq(order_id))
            .all(&self.db)
            .await
            .context("list order lines")?;
        Ok(models.into_iter().map(order_line_from_model).collect())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<(), MarketServiceError> {
        orders::ActiveModel {
            id: Set(id),
            status: Set(status.as_str().to_owned()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update order status")?;
        Ok(())
    }
}

// ── Shipment repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbShipmentRepository {
    pub db: DatabaseConnection,
}

fn shipment_from_model(model: shipments::Model) -> Shipment {
    Shipment {
        id: model.id,
        order_id: model.order_id,
        address: model.address,
        city: model.city,
        state: model.state,
        postal_code: model.postal_code,
        tracking_number: model.tracking_number,
        shipped_at: model.shipped_at,
        delivered_at: model.delivered_at,
    }
}

fn apply_shipment_scope(
    query: sea_orm::Select<shipments::Entity>,
    scope: ShipmentVisibility,
) -> Option<sea_orm::Select<shipments::Entity>> {
    match scope {
        ShipmentVisibility::Everything => Some(query),
        ShipmentVisibility::ForOrdersOf(user_id) => Some(
            query.filter(
                shipments::Column::OrderId.in_subquery(
                    Query::select()
                        .column(orders::Column::Id)
                        .from(orders::Entity)
                        .and_where(Expr::col(orders::Column::UserId).eq(user_id))
                        .to_owned(),
                ),
            ),
        ),
        ShipmentVisibility::Nothing => None,
    }
}

impl ShipmentRepository for DbShipmentRepository {
    async fn create(&self, shipment: &Shipment) -> Result<(), MarketServiceError> {
        let existing = shipments::Entity::find()
            .filter(shipments::Column::OrderId.eq(shipment.order_id))
            .one(&self.db)
            .await
            .context("check existing shipment")?;
        if existing.is_some() {
            return Err(MarketServiceError::ShipmentExists);
        }
        shipments::ActiveModel {
            id: Set(shipment.id),
            order_id: Set(shipment.order_id),
            address: Set(shipment.address.clone()),
            city: Set(shipment.city.clone()),
            state: Set(shipment.state.clone()),
            postal_code: Set(shipment.postal_code.clone()),
            tracking_number: Set(shipment.tracking_number.clone()),
            shipped_at: Set(shipment.shipped_at),
            delivered_at: Set(shipment.delivered_at),
        }
        .insert(&self.db)
        .await
        .context("create shipment")?;
        Ok(())
    }

    async fn list(
        &self,
        scope: ShipmentVisibility,
        page: PageRequest,
    ) -> Result<Vec<Shipment>, MarketServiceError> {
        let Some(query) = apply_shipment_scope(shipments::Entity::find(), scope) else {
            return Ok(Vec::new());
        };
        let models = query
            .limit(page.limit())
            .offset(page.offset())
            .all(&self.db)
            .await
            .context("list shipments")?;
        Ok(models.into_iter().map(shipment_from_model).collect())
    }

    async fn find_in_scope(
        &self,
        scope: ShipmentVisibility,
        id: Uuid,
    ) -> Result<Option<Shipment>, MarketServiceError> {
        let Some(query) = apply_shipment_scope(shipments::Entity::find_by_id(id), scope) else {
            return Ok(None);
        };
        let model = query.one(&self.db).await.context("find shipment in scope")?;
        Ok(model.map(shipment_from_model))
    }

    async fn update(&self, id: Uuid, changes: ShipmentChanges) -> Result<(), MarketServiceError> {
        let mut am = shipments::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(tracking_number) = changes.tracking_number {
            am.tracking_number = Set(Some(tracking_number));
        }
        if let Some(shipped_at) = changes.shipped_at {
            am.shipped_at = Set(Some(shipped_at));
        }
        if let Some(delivered_at) = changes.delivered_at {
            am.delivered_at = Set(Some(delivered_at));
        }
        am.update(&self.db).await.context("update shipment")?;
        Ok(())
    }
}

// ── Upgrade request repository ───────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUpgradeRequestRepository {
    pub db: DatabaseConnection,
}

fn upgrade_request_from_model(
    model: upgrade_requests::Model,
) -> Result<UpgradeRequest, MarketServiceError> {
    let requested_role = RequestedRole::from_str_value(&model.requested_role).ok_or_else(|| {
        anyhow!(
            "unknown role in upgrade_requests.requested_role: {}",
            model.requested_role
        )
    })?;
    let status = UpgradeStatus::from_str_value(&model.status)
        .ok_or_else(|| anyhow!("unknown status in upgrade_requests.status: {}", model.status))?;
    Ok(UpgradeRequest {
        id: model.id,
        user_id: model.user_id,
        requested_role,
        business_name: model.business_name,
        status,
        admin_comment: model.admin_comment,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

impl UpgradeRequestRepository for DbUpgradeRequestRepository {
    async fn create(&self, request: &UpgradeRequest) -> Result<(), MarketServiceError> {
        upgrade_requests::ActiveModel {
            id: Set(request.id),
            user_id: Set(request.user_id),
            requested_role: Set(request.requested_role.as_str().to_owned()),
            business_name: Set(request.business_name.clone()),
            status: Set(request.status.as_str().to_owned()),
            admin_comment: Set(request.admin_comment.clone()),
            created_at: Set(request.created_at),
            updated_at: Set(request.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create upgrade request")?;
        Ok(())
    }

    async fn list_all(&self, page: PageRequest) -> Result<Vec<UpgradeRequest>, MarketServiceError> {
        let models = upgrade_requests::Entity::find()
            .order_by_desc(upgrade_requests::Column::CreatedAt)
            .limit(page.limit())
            .offset(page.offset())
            .all(&self.db)
            .await
            .context("list upgrade requests")?;
        models.into_iter().map(upgrade_request_from_model).collect()
    }

    async fn list_for(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<UpgradeRequest>, MarketServiceError> {
        let models = upgrade_requests::Entity::find()
            .filter(upgrade_requests::Column::UserId.eq(user_id))
            .order_by_desc(upgrade_requests::Column::CreatedAt)
            .limit(page.limit())
            .offset(page.offset())
            .all(&self.db)
            .await
            .context("list own upgrade requests")?;
        models.into_iter().map(upgrade_request_from_model).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UpgradeRequest>, MarketServiceError> {
        let model = upgrade_requests::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find upgrade request")?;
        model.map(upgrade_request_from_model).transpose()
    }

    async fn decide(
        &self,
        id: Uuid,
        decision: Decision,
        admin_id: Uuid,
        comment: Option<&str>,
    ) -> Result<UpgradeRequest, MarketServiceError> {
        let comment = comment.map(str::to_owned);
        self.db
            .transaction::<_, UpgradeRequest, MarketServiceError>(move |txn| {
                Box::pin(async move {
                    let now = Utc::now();
                    // Guarded transition: only a pending row is updated, so a
                    // request in a terminal state is left untouched.
                    let res = upgrade_requests::Entity::update_many()
                        .filter(upgrade_requests::Column::Id.eq(id))
                        .filter(
                            upgrade_requests::Column::Status.eq(UpgradeStatus::Pending.as_str()),
                        )
                        .col_expr(
                            upgrade_requests::Column::Status,
                            Expr::value(decision.resulting_status().as_str()),
                        )
                        .col_expr(
                            upgrade_requests::Column::AdminComment,
                            Expr::value(comment.clone()),
                        )
                        .col_expr(upgrade_requests::Column::UpdatedAt, Expr::value(now))
                        .exec(txn)
                        .await
                        .context("apply upgrade decision")?;

                    if res.rows_affected == 0 {
                        let existing = upgrade_requests::Entity::find_by_id(id)
                            .one(txn)
                            .await
                            .context("reload upgrade request")?;
                        return Err(match existing {
                            None => MarketServiceError::UpgradeRequestNotFound,
                            Some(_) => MarketServiceError::RequestDecided,
                        });
                    }

                    let request = upgrade_requests::Entity::find_by_id(id)
                        .one(txn)
                        .await
                        .context("reload upgrade request")?
                        .ok_or_else(|| anyhow!("upgrade request vanished mid-decision"))?;
                    let request = upgrade_request_from_model(request)?;

                    if decision == Decision::Approve {
                        users::Entity::update_many()
                            .filter(users::Column::Id.eq(request.user_id))
                            .col_expr(
                                users::Column::Role,
                                Expr::value(request.requested_role.as_str()),
                            )
                            .col_expr(users::Column::Verified, Expr::value(true))
                            .col_expr(users::Column::VerifiedBy, Expr::value(Some(admin_id)))
                            .col_expr(users::Column::VerifiedAt, Expr::value(Some(now)))
                            .col_expr(users::Column::UpdatedAt, Expr::value(now))
                            .exec(txn)
                            .await
                            .context("grant requested role")?;
                    }

                    Ok(request)
                })
            })
            .await
            .map_err(txn_err)
    }
}

// ── Revoked token repository ─────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRevokedTokenRepository {
    pub db: DatabaseConnection,
}

impl RevokedTokenRepository for DbRevokedTokenRepository {
    async fn revoke(
        &self,
        jti: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), MarketServiceError> {
        // Revoking an already-revoked token is a no-op.
        let existing = revoked_tokens::Entity::find_by_id(jti)
            .one(&self.db)
            .await
            .context("check revoked token")?;
        if existing.is_some() {
            return Ok(());
        }
        revoked_tokens::ActiveModel {
            jti: Set(jti),
            expires_at: Set(expires_at),
            revoked_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await
        .context("revoke token")?;
        Ok(())
    }

    async fn is_revoked(&self, jti: Uuid) -> Result<bool, MarketServiceError> {
        let existing = revoked_tokens::Entity::find_by_id(jti)
            .one(&self.db)
            .await
            .context("check revoked token")?;
        Ok(existing.is_some())
    }
}
