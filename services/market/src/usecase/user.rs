use chrono::Utc;
use uuid::Uuid;

use agora_domain::access::{Method, ResourceKind};
use agora_domain::actor::Actor;
use agora_domain::pagination::PageRequest;
use agora_domain::visibility;

use crate::domain::repository::UserRepository;
use crate::domain::types::User;
use crate::error::MarketServiceError;
use crate::usecase::ensure_allowed;

// ── GetMe ────────────────────────────────────────────────────────────────────

pub struct GetMeUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetMeUseCase<U> {
    pub async fn execute(&self, actor: &Actor) -> Result<User, MarketServiceError> {
        let identity = actor.identity().ok_or(MarketServiceError::Unauthorized)?;
        self.users
            .find_by_id(identity.user_id)
            .await?
            .ok_or(MarketServiceError::UserNotFound)
    }
}

// ── ListUsers ────────────────────────────────────────────────────────────────

pub struct ListUsersUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ListUsersUseCase<U> {
    /// The role-scoped directory: admins see everyone, wholesalers their
    /// retailers, retailers their consumers, consumers themselves.
    pub async fn execute(
        &self,
        actor: &Actor,
        page: PageRequest,
    ) -> Result<Vec<User>, MarketServiceError> {
        self.users.list(visibility::users(actor), page).await
    }
}

// ── Verify / Unverify ────────────────────────────────────────────────────────

pub struct SetUserVerificationUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> SetUserVerificationUseCase<U> {
    /// Admin action. Verifying stamps the deciding admin and timestamp;
    /// unverifying clears both (an unverified account never carries audit
    /// fields).
    pub async fn execute(
        &self,
        actor: &Actor,
        target_id: Uuid,
        verified: bool,
    ) -> Result<User, MarketServiceError> {
        ensure_allowed(actor, Method::Post, ResourceKind::Users)?;
        let admin_id = actor.user_id().ok_or(MarketServiceError::Unauthorized)?;
        if self.users.find_by_id(target_id).await?.is_none() {
            return Err(MarketServiceError::UserNotFound);
        }
        let (verified_by, verified_at) = if verified {
            (Some(admin_id), Some(Utc::now()))
        } else {
            (None, None)
        };
        self.users
            .set_verification(target_id, verified, verified_by, verified_at)
            .await?;
        self.users
            .find_by_id(target_id)
            .await?
            .ok_or(MarketServiceError::UserNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use chrono::{DateTime, Utc};

    use agora_domain::role::Role;
    use agora_domain::visibility::UserVisibility;

    struct MockUserRepo {
        user: Option<User>,
        verification_calls: Mutex<Vec<(Uuid, bool, Option<Uuid>, Option<DateTime<Utc>>)>>,
        listed_scope: Mutex<Option<UserVisibility>>,
    }

    impl MockUserRepo {
        fn with_user(user: Option<User>) -> Self {
            Self {
                user,
                verification_calls: Mutex::new(Vec::new()),
                listed_scope: Mutex::new(None),
            }
        }
    }

    impl UserRepository for MockUserRepo {
        async fn find_by_id(&self, _id: Uuid) -> Result<Option<User>, MarketServiceError> {
            Ok(self.user.clone())
        }
        async fn find_by_username(
            &self,
            _username: &str,
        ) -> Result<Option<User>, MarketServiceError> {
            Ok(None)
        }
        async fn find_by_email(&self, _email: &str) -> Result<Option<User>, MarketServiceError> {
            Ok(None)
        }
        async fn create_with_cart(&self, _user: &User) -> Result<(), MarketServiceError> {
            Ok(())
        }
        async fn list(
            &self,
            scope: UserVisibility,
            _page: PageRequest,
        ) -> Result<Vec<User>, MarketServiceError> {
            *self.listed_scope.lock().unwrap() = Some(scope);
            Ok(Vec::new())
        }
        async fn set_verification(
            &self,
            id: Uuid,
            verified: bool,
            verified_by: Option<Uuid>,
            verified_at: Option<DateTime<Utc>>,
        ) -> Result<(), MarketServiceError> {
            self.verification_calls
                .lock()
                .unwrap()
                .push((id, verified, verified_by, verified_at));
            Ok(())
        }
    }

    fn some_user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::now_v7(),
            username: "carol".to_owned(),
            email: "carol@example.com".to_owned(),
            password_hash: "hash".to_owned(),
            role: Role::Wholesaler,
            verified: false,
            verified_by: None,
            verified_at: None,
            phone: None,
            address: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn should_require_authentication_for_me() {
        let usecase = GetMeUseCase {
            users: MockUserRepo::with_user(None),
        };
        let err = usecase.execute(&Actor::Anonymous).await.unwrap_err();
        assert!(matches!(err, MarketServiceError::Unauthorized));
    }

    #[tokio::test]
    async fn should_scope_user_list_by_actor_role() {
        let usecase = ListUsersUseCase {
            users: MockUserRepo::with_user(None),
        };
        let wholesaler = Actor::known(Uuid::new_v4(), Role::Wholesaler, true);
        usecase
            .execute(&wholesaler, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(
            *usecase.users.listed_scope.lock().unwrap(),
            Some(UserVisibility::WithRole(Role::Retailer))
        );
    }

    #[tokio::test]
    async fn should_stamp_verifier_and_timestamp_on_verify() {
        let usecase = SetUserVerificationUseCase {
            users: MockUserRepo::with_user(Some(some_user())),
        };
        let admin = Actor::known(Uuid::new_v4(), Role::Admin, true);
        usecase
            .execute(&admin, Uuid::new_v4(), true)
            .await
            .unwrap();
        let calls = usecase.users.verification_calls.lock().unwrap();
        let (_, verified, verified_by, verified_at) = calls[0];
        assert!(verified);
        assert_eq!(verified_by, admin.user_id());
        assert!(verified_at.is_some());
    }

    #[tokio::test]
    async fn should_clear_audit_fields_on_unverify() {
        let usecase = SetUserVerificationUseCase {
            users: MockUserRepo::with_user(Some(some_user())),
        };
        let admin = Actor::known(Uuid::new_v4(), Role::Admin, true);
        usecase
            .execute(&admin, Uuid::new_v4(), false)
            .await
            .unwrap();
        let calls = usecase.users.verification_calls.lock().unwrap();
        let (_, verified, verified_by, verified_at) = calls[0];
        assert!(!verified);
        assert_eq!(verified_by, None);
        assert_eq!(verified_at, None);
    }

    #[tokio::test]
    async fn should_forbid_verification_by_non_admin() {
        let usecase = SetUserVerificationUseCase {
            users: MockUserRepo::with_user(Some(some_user())),
        };
        let retailer = Actor::known(Uuid::new_v4(), Role::Retailer, true);
        let err = usecase
            .execute(&retailer, Uuid::new_v4(), true)
            .await
            .unwrap_err();
        assert!(matches!(err, MarketServiceError::Forbidden));
        assert!(usecase.users.verification_calls.lock().unwrap().is_empty());
    }
}
