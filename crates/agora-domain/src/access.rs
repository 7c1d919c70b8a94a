//! Permission gate: may this actor perform this method on this resource kind?
//!
//! Pure predicate, applied before visibility scoping. Safe methods pass for
//! everyone; mutations are gated per resource kind by role and, for the
//! trading roles, the verified flag.

use crate::actor::{Actor, Identity};
use crate::role::Role;

/// HTTP-style request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Options,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Safe methods never mutate and are allowed for every actor.
    pub fn is_safe(self) -> bool {
        matches!(self, Self::Get | Self::Head | Self::Options)
    }
}

/// Resource kinds the gate knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Categories,
    Products,
    Carts,
    Orders,
    Shipments,
    Users,
    UpgradeRequests,
}

/// Whether `actor` may perform `method` on `resource`.
///
/// Ownership checks (may this wholesaler edit *this* product) are not the
/// gate's job; they happen in the usecases after visibility scoping.
pub fn allow(actor: &Actor, method: Method, resource: ResourceKind) -> bool {
    if method.is_safe() {
        return true;
    }
    let Some(identity) = actor.identity() else {
        return false;
    };
    allow_mutation(identity, resource)
}

fn allow_mutation(identity: &Identity, resource: ResourceKind) -> bool {
    let Identity { role, verified, .. } = *identity;
    match resource {
        ResourceKind::Categories => role == Role::Admin,
        ResourceKind::Products => match role {
            Role::Admin => true,
            Role::Wholesaler | Role::Retailer => verified,
            Role::Consumer => false,
        },
        ResourceKind::Carts | ResourceKind::Orders | ResourceKind::Shipments => {
            matches!(role, Role::Admin | Role::Consumer)
        }
        ResourceKind::Users => role == Role::Admin,
        // Any authenticated actor may open a request; the approve/reject
        // transitions enforce admin separately in the usecase.
        ResourceKind::UpgradeRequests => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn actor(role: Role, verified: bool) -> Actor {
        Actor::known(Uuid::new_v4(), role, verified)
    }

    const ALL_KINDS: [ResourceKind; 7] = [
        ResourceKind::Categories,
        ResourceKind::Products,
        ResourceKind::Carts,
        ResourceKind::Orders,
        ResourceKind::Shipments,
        ResourceKind::Users,
        ResourceKind::UpgradeRequests,
    ];

    #[test]
    fn should_allow_safe_methods_for_everyone() {
        for kind in ALL_KINDS {
            assert!(allow(&Actor::Anonymous, Method::Get, kind));
            assert!(allow(&actor(Role::Consumer, false), Method::Head, kind));
            assert!(allow(&actor(Role::Wholesaler, false), Method::Options, kind));
        }
    }

    #[test]
    fn should_deny_every_mutation_to_anonymous() {
        for kind in ALL_KINDS {
            for method in [Method::Post, Method::Put, Method::Patch, Method::Delete] {
                assert!(!allow(&Actor::Anonymous, method, kind));
            }
        }
    }

    #[test]
    fn should_restrict_category_mutations_to_admin() {
        assert!(allow(&actor(Role::Admin, true), Method::Post, ResourceKind::Categories));
        assert!(!allow(&actor(Role::Wholesaler, true), Method::Post, ResourceKind::Categories));
        assert!(!allow(&actor(Role::Retailer, true), Method::Delete, ResourceKind::Categories));
        assert!(!allow(&actor(Role::Consumer, true), Method::Post, ResourceKind::Categories));
    }

    #[test]
    fn should_require_verification_for_trading_roles_on_products() {
        assert!(allow(&actor(Role::Wholesaler, true), Method::Post, ResourceKind::Products));
        assert!(allow(&actor(Role::Retailer, true), Method::Patch, ResourceKind::Products));
        assert!(!allow(&actor(Role::Wholesaler, false), Method::Post, ResourceKind::Products));
        assert!(!allow(&actor(Role::Retailer, false), Method::Delete, ResourceKind::Products));
    }

    #[test]
    fn should_deny_product_mutations_to_consumers_even_verified() {
        assert!(!allow(&actor(Role::Consumer, true), Method::Post, ResourceKind::Products));
    }

    #[test]
    fn should_allow_admin_product_mutations_without_verification() {
        assert!(allow(&actor(Role::Admin, false), Method::Post, ResourceKind::Products));
    }

    #[test]
    fn should_limit_cart_and_order_mutations_to_consumers_and_admin() {
        for kind in [ResourceKind::Carts, ResourceKind::Orders, ResourceKind::Shipments] {
            assert!(allow(&actor(Role::Consumer, true), Method::Post, kind));
            assert!(allow(&actor(Role::Admin, true), Method::Patch, kind));
            assert!(!allow(&actor(Role::Wholesaler, true), Method::Post, kind));
            assert!(!allow(&actor(Role::Retailer, true), Method::Post, kind));
        }
    }

    #[test]
    fn should_allow_any_authenticated_actor_to_mutate_upgrade_requests() {
        for role in [Role::Admin, Role::Wholesaler, Role::Retailer, Role::Consumer] {
            assert!(allow(&actor(role, false), Method::Post, ResourceKind::UpgradeRequests));
        }
    }
}
