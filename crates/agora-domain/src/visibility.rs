//! Visibility resolver: which rows of each resource kind an actor may see.
//!
//! Each function maps an actor to a scope value; the repository layer turns
//! the scope into a query filter. The functions are pure and match
//! exhaustively on the role, so adding a role is a compile-time-checked
//! change. Anonymous or otherwise unresolved actors always get the empty
//! scope (deny-by-default). Result ordering is the caller's concern.

use uuid::Uuid;

use crate::actor::Actor;
use crate::role::Role;

/// Scope over products.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductVisibility {
    /// Every product.
    Everything,
    /// Products owned by the given user.
    Own(Uuid),
    /// Products owned by any *verified* user with the given role.
    OwnedByVerified(Role),
    /// No products.
    Nothing,
}

pub fn products(actor: &Actor) -> ProductVisibility {
    match actor.identity() {
        None => ProductVisibility::Nothing,
        Some(identity) => match identity.role {
            Role::Admin => ProductVisibility::Everything,
            Role::Wholesaler => ProductVisibility::Own(identity.user_id),
            Role::Retailer => ProductVisibility::OwnedByVerified(Role::Wholesaler),
            Role::Consumer => ProductVisibility::OwnedByVerified(Role::Retailer),
        },
    }
}

/// Scope over orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderVisibility {
    Everything,
    /// Orders containing at least one line whose product the user owns.
    Supplying(Uuid),
    /// Orders placed by the user.
    Own(Uuid),
    Nothing,
}

pub fn orders(actor: &Actor) -> OrderVisibility {
    match actor.identity() {
        None => OrderVisibility::Nothing,
        Some(identity) => match identity.role {
            Role::Admin => OrderVisibility::Everything,
            Role::Wholesaler | Role::Retailer => OrderVisibility::Supplying(identity.user_id),
            Role::Consumer => OrderVisibility::Own(identity.user_id),
        },
    }
}

/// Scope over carts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartVisibility {
    Everything,
    Own(Uuid),
    Nothing,
}

pub fn carts(actor: &Actor) -> CartVisibility {
    match actor.identity() {
        None => CartVisibility::Nothing,
        Some(identity) => match identity.role {
            Role::Admin => CartVisibility::Everything,
            Role::Consumer => CartVisibility::Own(identity.user_id),
            Role::Wholesaler | Role::Retailer => CartVisibility::Nothing,
        },
    }
}

/// Scope over shipments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShipmentVisibility {
    Everything,
    /// Shipments attached to orders placed by the user.
    ForOrdersOf(Uuid),
    Nothing,
}

pub fn shipments(actor: &Actor) -> ShipmentVisibility {
    match actor.identity() {
        None => ShipmentVisibility::Nothing,
        Some(identity) => match identity.role {
            Role::Admin => ShipmentVisibility::Everything,
            Role::Consumer => ShipmentVisibility::ForOrdersOf(identity.user_id),
            Role::Wholesaler | Role::Retailer => ShipmentVisibility::Nothing,
        },
    }
}

/// Scope over user accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserVisibility {
    Everything,
    /// Every account holding the given role.
    WithRole(Role),
    /// The user's own account only.
    Itself(Uuid),
    Nothing,
}

pub fn users(actor: &Actor) -> UserVisibility {
    match actor.identity() {
        None => UserVisibility::Nothing,
        Some(identity) => match identity.role {
            Role::Admin => UserVisibility::Everything,
            Role::Wholesaler => UserVisibility::WithRole(Role::Retailer),
            Role::Retailer => UserVisibility::WithRole(Role::Consumer),
            Role::Consumer => UserVisibility::Itself(identity.user_id),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: Role) -> Actor {
        Actor::known(Uuid::new_v4(), role, true)
    }

    #[test]
    fn should_scope_products_per_role() {
        let wholesaler = Actor::known(Uuid::new_v4(), Role::Wholesaler, true);
        let id = wholesaler.user_id().unwrap();

        assert_eq!(products(&actor(Role::Admin)), ProductVisibility::Everything);
        assert_eq!(products(&wholesaler), ProductVisibility::Own(id));
        assert_eq!(
            products(&actor(Role::Retailer)),
            ProductVisibility::OwnedByVerified(Role::Wholesaler)
        );
        assert_eq!(
            products(&actor(Role::Consumer)),
            ProductVisibility::OwnedByVerified(Role::Retailer)
        );
    }

    #[test]
    fn should_scope_orders_per_role() {
        let consumer = Actor::known(Uuid::new_v4(), Role::Consumer, true);
        let retailer = Actor::known(Uuid::new_v4(), Role::Retailer, true);
        let wholesaler = Actor::known(Uuid::new_v4(), Role::Wholesaler, true);

        assert_eq!(orders(&actor(Role::Admin)), OrderVisibility::Everything);
        assert_eq!(
            orders(&retailer),
            OrderVisibility::Supplying(retailer.user_id().unwrap())
        );
        assert_eq!(
            orders(&wholesaler),
            OrderVisibility::Supplying(wholesaler.user_id().unwrap())
        );
        assert_eq!(orders(&consumer), OrderVisibility::Own(consumer.user_id().unwrap()));
    }

    #[test]
    fn should_hide_carts_and_shipments_from_trading_roles() {
        assert_eq!(carts(&actor(Role::Wholesaler)), CartVisibility::Nothing);
        assert_eq!(carts(&actor(Role::Retailer)), CartVisibility::Nothing);
        assert_eq!(shipments(&actor(Role::Wholesaler)), ShipmentVisibility::Nothing);
        assert_eq!(shipments(&actor(Role::Retailer)), ShipmentVisibility::Nothing);
    }

    #[test]
    fn should_scope_own_cart_and_shipments_for_consumer() {
        let consumer = Actor::known(Uuid::new_v4(), Role::Consumer, true);
        let id = consumer.user_id().unwrap();
        assert_eq!(carts(&consumer), CartVisibility::Own(id));
        assert_eq!(shipments(&consumer), ShipmentVisibility::ForOrdersOf(id));
        assert_eq!(carts(&actor(Role::Admin)), CartVisibility::Everything);
    }

    #[test]
    fn should_scope_user_directory_one_step_down() {
        let consumer = Actor::known(Uuid::new_v4(), Role::Consumer, true);
        assert_eq!(users(&actor(Role::Admin)), UserVisibility::Everything);
        assert_eq!(users(&actor(Role::Wholesaler)), UserVisibility::WithRole(Role::Retailer));
        assert_eq!(users(&actor(Role::Retailer)), UserVisibility::WithRole(Role::Consumer));
        assert_eq!(users(&consumer), UserVisibility::Itself(consumer.user_id().unwrap()));
    }

    #[test]
    fn should_resolve_anonymous_to_nothing_for_every_kind() {
        assert_eq!(products(&Actor::Anonymous), ProductVisibility::Nothing);
        assert_eq!(orders(&Actor::Anonymous), OrderVisibility::Nothing);
        assert_eq!(carts(&Actor::Anonymous), CartVisibility::Nothing);
        assert_eq!(shipments(&Actor::Anonymous), ShipmentVisibility::Nothing);
        assert_eq!(users(&Actor::Anonymous), UserVisibility::Nothing);
    }
}
