//! The requesting actor.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::role::Role;

/// Identity of an authenticated actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: Role,
    pub verified: bool,
}

/// Any requester, authenticated or not.
///
/// Anonymous is an explicit variant — resolvers and gates match on it rather
/// than probing for missing fields. Every permission and visibility decision
/// takes an `&Actor` parameter; there is no ambient "current user".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Anonymous,
    Known(Identity),
}

impl Actor {
    pub fn known(user_id: Uuid, role: Role, verified: bool) -> Self {
        Self::Known(Identity {
            user_id,
            role,
            verified,
        })
    }

    /// The identity, if authenticated.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Anonymous => None,
            Self::Known(identity) => Some(identity),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            Self::Known(Identity {
                role: Role::Admin,
                ..
            })
        )
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.identity().map(|i| i.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_expose_identity_only_when_known() {
        let id = Uuid::new_v4();
        let actor = Actor::known(id, Role::Consumer, true);
        assert_eq!(actor.user_id(), Some(id));
        assert_eq!(Actor::Anonymous.user_id(), None);
        assert!(Actor::Anonymous.identity().is_none());
    }

    #[test]
    fn should_recognize_admin() {
        let admin = Actor::known(Uuid::new_v4(), Role::Admin, true);
        let consumer = Actor::known(Uuid::new_v4(), Role::Consumer, true);
        assert!(admin.is_admin());
        assert!(!consumer.is_admin());
        assert!(!Actor::Anonymous.is_admin());
    }
}
