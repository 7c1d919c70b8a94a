use uuid::Uuid;

use agora_domain::access::{Method, ResourceKind};
use agora_domain::actor::Actor;
use agora_domain::pagination::PageRequest;
use agora_domain::visibility::{self, CartVisibility};

use crate::domain::repository::{CartRepository, ProductRepository};
use crate::domain::types::{Cart, CartLine};
use crate::error::MarketServiceError;
use crate::usecase::ensure_allowed;

/// Resolve the actor's own cart. Only actors whose cart visibility is `Own`
/// have one.
async fn own_cart<C: CartRepository>(
    carts: &C,
    actor: &Actor,
) -> Result<Cart, MarketServiceError> {
    match visibility::carts(actor) {
        CartVisibility::Own(user_id) => carts.find_or_create(user_id).await,
        CartVisibility::Everything | CartVisibility::Nothing => match actor {
            Actor::Anonymous => Err(MarketServiceError::Unauthorized),
            Actor::Known(_) => Err(MarketServiceError::Forbidden),
        },
    }
}

// ── List carts (admin browse + own) ──────────────────────────────────────────

pub struct ListCartsUseCase<C: CartRepository> {
    pub carts: C,
}

impl<C: CartRepository> ListCartsUseCase<C> {
    pub async fn execute(
        &self,
        actor: &Actor,
        page: PageRequest,
    ) -> Result<Vec<Cart>, MarketServiceError> {
        self.carts.list(visibility::carts(actor), page).await
    }
}

// ── My cart ──────────────────────────────────────────────────────────────────

pub struct GetMyCartUseCase<C: CartRepository> {
    pub carts: C,
}

impl<C: CartRepository> GetMyCartUseCase<C> {
    pub async fn execute(
        &self,
        actor: &Actor,
    ) -> Result<(Cart, Vec<CartLine>), MarketServiceError> {
        let cart = own_cart(&self.carts, actor).await?;
        let lines = self.carts.lines(cart.id).await?;
        Ok((cart, lines))
    }
}

// ── Cart lines ───────────────────────────────────────────────────────────────

pub struct AddCartLineUseCase<C: CartRepository, P: ProductRepository> {
    pub carts: C,
    pub products: P,
}

impl<C: CartRepository, P: ProductRepository> AddCartLineUseCase<C, P> {
    pub async fn execute(
        &self,
        actor: &Actor,
        product_id: Uuid,
        quantity: u32,
    ) -> Result<CartLine, MarketServiceError> {
        ensure_allowed(actor, Method::Post, ResourceKind::Carts)?;
        if quantity == 0 {
            return Err(MarketServiceError::InvalidQuantity);
        }
        if self.products.find_by_id(product_id).await?.is_none() {
            return Err(MarketServiceError::ProductNotFound);
        }
        let cart = own_cart(&self.carts, actor).await?;
        let line = CartLine {
            id: Uuid::now_v7(),
            cart_id: cart.id,
            product_id,
            quantity,
        };
        self.carts.insert_line(&line).await?;
        Ok(line)
    }
}

pub struct UpdateCartLineUseCase<C: CartRepository> {
    pub carts: C,
}

impl<C: CartRepository> UpdateCartLineUseCase<C> {
    pub async fn execute(
        &self,
        actor: &Actor,
        line_id: Uuid,
        quantity: u32,
    ) -> Result<CartLine, MarketServiceError> {
        ensure_allowed(actor, Method::Patch, ResourceKind::Carts)?;
        if quantity == 0 {
            return Err(MarketServiceError::InvalidQuantity);
        }
        let cart = own_cart(&self.carts, actor).await?;
        let line = self
            .carts
            .find_line(cart.id, line_id)
            .await?
            .ok_or(MarketServiceError::CartLineNotFound)?;
        self.carts.update_line_quantity(line.id, quantity).await?;
        Ok(CartLine { quantity, ..line })
    }
}

pub struct RemoveCartLineUseCase<C: CartRepository> {
    pub carts: C,
}

impl<C: CartRepository> RemoveCartLineUseCase<C> {
    pub async fn execute(&self, actor: &Actor, line_id: Uuid) -> Result<(), MarketServiceError> {
        ensure_allowed(actor, Method::Delete, ResourceKind::Carts)?;
        let cart = own_cart(&self.carts, actor).await?;
        let line = self
            .carts
            .find_line(cart.id, line_id)
            .await?
            .ok_or(MarketServiceError::CartLineNotFound)?;
        if !self.carts.delete_line(line.id).await? {
            return Err(MarketServiceError::CartLineNotFound);
        }
        Ok(())
    }
}
