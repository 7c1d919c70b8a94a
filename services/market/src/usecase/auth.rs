use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use agora_auth_types::token::{
    TokenKind, issue_access_token, issue_refresh_token, validate_token,
};
use agora_domain::role::Role;

use crate::domain::repository::{RevokedTokenRepository, UserRepository};
use crate::domain::types::User;
use crate::error::MarketServiceError;

const MIN_PASSWORD_LEN: usize = 8;

fn hash_password(password: &str) -> Result<String, MarketServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| MarketServiceError::Internal(anyhow::anyhow!("hash password: {e}")))
}

fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .and_then(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed))
        .is_ok()
}

fn exp_to_datetime(exp: u64) -> DateTime<Utc> {
    Utc.timestamp_opt(exp as i64, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Access/refresh pair returned by the auth flows.
#[derive(Debug)]
pub struct TokenPair {
    pub access_token: String,
    pub access_token_exp: u64,
    pub refresh_token: String,
}

fn issue_pair(user: &User, secret: &str) -> Result<TokenPair, MarketServiceError> {
    let (access_token, access_token_exp) =
        issue_access_token(user.id, user.role, user.verified, secret)
            .map_err(|e| MarketServiceError::Internal(e.into()))?;
    let refresh_token = issue_refresh_token(user.id, user.role, user.verified, secret)
        .map_err(|e| MarketServiceError::Internal(e.into()))?;
    Ok(TokenPair {
        access_token,
        access_token_exp,
        refresh_token,
    })
}

// ── Register ─────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug)]
pub struct RegisterOutput {
    pub user: User,
    pub tokens: TokenPair,
}

pub struct RegisterUseCase<U: UserRepository> {
    pub users: U,
    pub jwt_secret: String,
}

impl<U: UserRepository> RegisterUseCase<U> {
    /// Create an account. New actors are always consumers, regardless of any
    /// role the caller asks for; upgrades go through the request workflow.
    pub async fn execute(&self, input: RegisterInput) -> Result<RegisterOutput, MarketServiceError> {
        if input.username.trim().is_empty() || input.email.trim().is_empty() {
            return Err(MarketServiceError::MissingData);
        }
        if input.password.len() < MIN_PASSWORD_LEN {
            return Err(MarketServiceError::PasswordTooShort);
        }
        if self.users.find_by_username(&input.username).await?.is_some() {
            return Err(MarketServiceError::UsernameTaken);
        }
        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(MarketServiceError::EmailTaken);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            username: input.username,
            email: input.email,
            password_hash: hash_password(&input.password)?,
            role: Role::Consumer,
            verified: true,
            verified_by: None,
            verified_at: None,
            phone: input.phone,
            address: input.address,
            created_at: now,
            updated_at: now,
        };
        self.users.create_with_cart(&user).await?;

        let tokens = issue_pair(&user, &self.jwt_secret)?;
        Ok(RegisterOutput { user, tokens })
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginUseCase<U: UserRepository> {
    pub users: U,
    pub jwt_secret: String,
}

impl<U: UserRepository> LoginUseCase<U> {
    pub async fn execute(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(User, TokenPair), MarketServiceError> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(MarketServiceError::InvalidCredentials)?;
        if !verify_password(password, &user.password_hash) {
            return Err(MarketServiceError::InvalidCredentials);
        }
        let tokens = issue_pair(&user, &self.jwt_secret)?;
        Ok((user, tokens))
    }
}

// ── Refresh ──────────────────────────────────────────────────────────────────

pub struct RefreshUseCase<U: UserRepository, R: RevokedTokenRepository> {
    pub users: U,
    pub revoked: R,
    pub jwt_secret: String,
}

impl<U: UserRepository, R: RevokedTokenRepository> RefreshUseCase<U, R> {
    /// Exchange a valid, unrevoked refresh token for a fresh pair. Role and
    /// verification are reloaded so a revoked verification takes effect at
    /// the next refresh.
    pub async fn execute(&self, refresh_token: &str) -> Result<TokenPair, MarketServiceError> {
        let info = validate_token(refresh_token, TokenKind::Refresh, &self.jwt_secret)
            .map_err(|_| MarketServiceError::InvalidRefreshToken)?;
        if self.revoked.is_revoked(info.jti).await? {
            return Err(MarketServiceError::InvalidRefreshToken);
        }
        let user = self
            .users
            .find_by_id(info.user_id)
            .await?
            .ok_or(MarketServiceError::InvalidRefreshToken)?;
        issue_pair(&user, &self.jwt_secret)
    }
}

// ── Logout ───────────────────────────────────────────────────────────────────

pub struct LogoutUseCase<R: RevokedTokenRepository> {
    pub revoked: R,
    pub jwt_secret: String,
}

impl<R: RevokedTokenRepository> LogoutUseCase<R> {
    /// Revoke the presented refresh token. The short-lived access token is
    /// left to expire on its own.
    pub async fn execute(&self, refresh_token: &str) -> Result<(), MarketServiceError> {
        let info = validate_token(refresh_token, TokenKind::Refresh, &self.jwt_secret)
            .map_err(|_| MarketServiceError::InvalidRefreshToken)?;
        self.revoked
            .revoke(info.jti, exp_to_datetime(info.exp))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use agora_domain::pagination::PageRequest;
    use agora_domain::visibility::UserVisibility;

    struct MockUserRepo {
        by_username: Option<User>,
        by_email: Option<User>,
        by_id: Option<User>,
        created: Mutex<Option<User>>,
    }

    impl MockUserRepo {
        fn empty() -> Self {
            Self {
                by_username: None,
                by_email: None,
                by_id: None,
                created: Mutex::new(None),
            }
        }
    }

    impl UserRepository for MockUserRepo {
        async fn find_by_id(&self, _id: Uuid) -> Result<Option<User>, MarketServiceError> {
            Ok(self.by_id.clone())
        }
        async fn find_by_username(
            &self,
            _username: &str,
        ) -> Result<Option<User>, MarketServiceError> {
            Ok(self.by_username.clone())
        }
        async fn find_by_email(&self, _email: &str) -> Result<Option<User>, MarketServiceError> {
            Ok(self.by_email.clone())
        }
        async fn create_with_cart(&self, user: &User) -> Result<(), MarketServiceError> {
            *self.created.lock().unwrap() = Some(user.clone());
            Ok(())
        }
        async fn list(
            &self,
            _scope: UserVisibility,
            _page: PageRequest,
        ) -> Result<Vec<User>, MarketServiceError> {
            Ok(Vec::new())
        }
        async fn set_verification(
            &self,
            _id: Uuid,
            _verified: bool,
            _verified_by: Option<Uuid>,
            _verified_at: Option<DateTime<Utc>>,
        ) -> Result<(), MarketServiceError> {
            Ok(())
        }
    }

    struct MockRevokedRepo {
        revoked: Mutex<Vec<Uuid>>,
        is_revoked: bool,
    }

    impl RevokedTokenRepository for MockRevokedRepo {
        async fn revoke(
            &self,
            jti: Uuid,
            _expires_at: DateTime<Utc>,
        ) -> Result<(), MarketServiceError> {
            self.revoked.lock().unwrap().push(jti);
            Ok(())
        }
        async fn is_revoked(&self, _jti: Uuid) -> Result<bool, MarketServiceError> {
            Ok(self.is_revoked)
        }
    }

    fn register_input(role_agnostic_name: &str) -> RegisterInput {
        RegisterInput {
            username: role_agnostic_name.to_owned(),
            email: format!("{role_agnostic_name}@example.com"),
            password: "correct horse battery".to_owned(),
            phone: None,
            address: None,
        }
    }

    fn existing_user(password: &str) -> User {
        let now = Utc::now();
        User {
            id: Uuid::now_v7(),
            username: "bob".to_owned(),
            email: "bob@example.com".to_owned(),
            password_hash: hash_password(password).unwrap(),
            role: Role::Consumer,
            verified: true,
            verified_by: None,
            verified_at: None,
            phone: None,
            address: None,
            created_at: now,
            updated_at: now,
        }
    }

    const SECRET: &str = "auth-usecase-test-secret";

    #[tokio::test]
    async fn should_register_as_consumer_with_hashed_password() {
        let usecase = RegisterUseCase {
            users: MockUserRepo::empty(),
            jwt_secret: SECRET.to_owned(),
        };
        let out = usecase.execute(register_input("alice")).await.unwrap();
        assert_eq!(out.user.role, Role::Consumer);
        assert!(out.user.verified);
        assert_ne!(out.user.password_hash, "correct horse battery");
        assert!(verify_password("correct horse battery", &out.user.password_hash));

        let created = usecase.users.created.lock().unwrap().clone().unwrap();
        assert_eq!(created.id, out.user.id);
    }

    #[tokio::test]
    async fn should_reject_short_password() {
        let usecase = RegisterUseCase {
            users: MockUserRepo::empty(),
            jwt_secret: SECRET.to_owned(),
        };
        let mut input = register_input("alice");
        input.password = "short".to_owned();
        let err = usecase.execute(input).await.unwrap_err();
        assert!(matches!(err, MarketServiceError::PasswordTooShort));
    }

    #[tokio::test]
    async fn should_reject_taken_username() {
        let mut repo = MockUserRepo::empty();
        repo.by_username = Some(existing_user("irrelevant-pw"));
        let usecase = RegisterUseCase {
            users: repo,
            jwt_secret: SECRET.to_owned(),
        };
        let err = usecase.execute(register_input("bob")).await.unwrap_err();
        assert!(matches!(err, MarketServiceError::UsernameTaken));
    }

    #[tokio::test]
    async fn should_login_with_correct_password() {
        let mut repo = MockUserRepo::empty();
        repo.by_username = Some(existing_user("hunter2hunter2"));
        let usecase = LoginUseCase {
            users: repo,
            jwt_secret: SECRET.to_owned(),
        };
        let (user, tokens) = usecase.execute("bob", "hunter2hunter2").await.unwrap();
        assert_eq!(user.username, "bob");
        assert!(!tokens.access_token.is_empty());
        assert!(!tokens.refresh_token.is_empty());
    }

    #[tokio::test]
    async fn should_reject_wrong_password() {
        let mut repo = MockUserRepo::empty();
        repo.by_username = Some(existing_user("hunter2hunter2"));
        let usecase = LoginUseCase {
            users: repo,
            jwt_secret: SECRET.to_owned(),
        };
        let err = usecase.execute("bob", "wrong").await.unwrap_err();
        assert!(matches!(err, MarketServiceError::InvalidCredentials));
    }

    #[tokio::test]
    async fn should_reject_unknown_username_without_timing_shortcut() {
        let usecase = LoginUseCase {
            users: MockUserRepo::empty(),
            jwt_secret: SECRET.to_owned(),
        };
        let err = usecase.execute("nobody", "whatever").await.unwrap_err();
        assert!(matches!(err, MarketServiceError::InvalidCredentials));
    }

    #[tokio::test]
    async fn should_refresh_with_valid_unrevoked_token() {
        let user = existing_user("hunter2hunter2");
        let refresh =
            issue_refresh_token(user.id, user.role, user.verified, SECRET).unwrap();
        let mut repo = MockUserRepo::empty();
        repo.by_id = Some(user);
        let usecase = RefreshUseCase {
            users: repo,
            revoked: MockRevokedRepo {
                revoked: Mutex::new(Vec::new()),
                is_revoked: false,
            },
            jwt_secret: SECRET.to_owned(),
        };
        let pair = usecase.execute(&refresh).await.unwrap();
        assert!(!pair.access_token.is_empty());
    }

    #[tokio::test]
    async fn should_reject_revoked_refresh_token() {
        let user = existing_user("hunter2hunter2");
        let refresh =
            issue_refresh_token(user.id, user.role, user.verified, SECRET).unwrap();
        let mut repo = MockUserRepo::empty();
        repo.by_id = Some(user);
        let usecase = RefreshUseCase {
            users: repo,
            revoked: MockRevokedRepo {
                revoked: Mutex::new(Vec::new()),
                is_revoked: true,
            },
            jwt_secret: SECRET.to_owned(),
        };
        let err = usecase.execute(&refresh).await.unwrap_err();
        assert!(matches!(err, MarketServiceError::InvalidRefreshToken));
    }

    #[tokio::test]
    async fn should_reject_access_token_at_refresh_endpoint() {
        let user = existing_user("hunter2hunter2");
        let (access, _) =
            issue_access_token(user.id, user.role, user.verified, SECRET).unwrap();
        let usecase = RefreshUseCase {
            users: MockUserRepo::empty(),
            revoked: MockRevokedRepo {
                revoked: Mutex::new(Vec::new()),
                is_revoked: false,
            },
            jwt_secret: SECRET.to_owned(),
        };
        let err = usecase.execute(&access).await.unwrap_err();
        assert!(matches!(err, MarketServiceError::InvalidRefreshToken));
    }

    #[tokio::test]
    async fn should_revoke_refresh_token_on_logout() {
        let user = existing_user("hunter2hunter2");
        let refresh =
            issue_refresh_token(user.id, user.role, user.verified, SECRET).unwrap();
        let usecase = LogoutUseCase {
            revoked: MockRevokedRepo {
                revoked: Mutex::new(Vec::new()),
                is_revoked: false,
            },
            jwt_secret: SECRET.to_owned(),
        };
        usecase.execute(&refresh).await.unwrap();
        assert_eq!(usecase.revoked.revoked.lock().unwrap().len(), 1);
    }
}
