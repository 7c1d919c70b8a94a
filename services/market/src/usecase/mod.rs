pub mod auth;
pub mod cart;
pub mod category;
pub mod order;
pub mod product;
pub mod shipment;
pub mod upgrade;
pub mod user;

use agora_domain::access::{self, Method, ResourceKind};
use agora_domain::actor::Actor;

use crate::error::MarketServiceError;

/// Run the permission gate, mapping a denial to the right error: missing
/// credential → 401, insufficient role/verification → 403.
pub fn ensure_allowed(
    actor: &Actor,
    method: Method,
    resource: ResourceKind,
) -> Result<(), MarketServiceError> {
    if access::allow(actor, method, resource) {
        return Ok(());
    }
    match actor {
        Actor::Anonymous => Err(MarketServiceError::Unauthorized),
        Actor::Known(_) => Err(MarketServiceError::Forbidden),
    }
}

/// Admin-only operations that the per-resource gate cannot express (order
/// status changes, shipment fulfillment, upgrade decisions, user
/// verification).
pub fn ensure_admin(actor: &Actor) -> Result<(), MarketServiceError> {
    match actor {
        Actor::Anonymous => Err(MarketServiceError::Unauthorized),
        Actor::Known(_) if actor.is_admin() => Ok(()),
        Actor::Known(_) => Err(MarketServiceError::Forbidden),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_domain::role::Role;
    use uuid::Uuid;

    #[test]
    fn should_map_anonymous_denial_to_unauthorized() {
        let err = ensure_allowed(&Actor::Anonymous, Method::Post, ResourceKind::Products)
            .unwrap_err();
        assert!(matches!(err, MarketServiceError::Unauthorized));
    }

    #[test]
    fn should_map_known_denial_to_forbidden() {
        let consumer = Actor::known(Uuid::new_v4(), Role::Consumer, true);
        let err =
            ensure_allowed(&consumer, Method::Post, ResourceKind::Products).unwrap_err();
        assert!(matches!(err, MarketServiceError::Forbidden));
    }

    #[test]
    fn should_pass_allowed_mutations() {
        let admin = Actor::known(Uuid::new_v4(), Role::Admin, true);
        assert!(ensure_allowed(&admin, Method::Post, ResourceKind::Categories).is_ok());
        assert!(ensure_admin(&admin).is_ok());
    }

    #[test]
    fn should_reject_non_admin_from_admin_checks() {
        let retailer = Actor::known(Uuid::new_v4(), Role::Retailer, true);
        assert!(matches!(
            ensure_admin(&retailer).unwrap_err(),
            MarketServiceError::Forbidden
        ));
        assert!(matches!(
            ensure_admin(&Actor::Anonymous).unwrap_err(),
            MarketServiceError::Unauthorized
        ));
    }
}
