use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use agora_auth_types::identity::JwtSecret;

use crate::infra::db::{
    DbCartRepository, DbCategoryRepository, DbOrderRepository, DbProductRepository,
    DbRevokedTokenRepository, DbShipmentRepository, DbUpgradeRequestRepository, DbUserRepository,
};
use crate::infra::mailer::SmtpNotifier;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt_secret: JwtSecret,
    pub notifier: SmtpNotifier,
}

impl FromRef<AppState> for JwtSecret {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_secret.clone()
    }
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn category_repo(&self) -> DbCategoryRepository {
        DbCategoryRepository {
            db: self.db.clone(),
        }
    }

    pub fn product_repo(&self) -> DbProductRepository {
        DbProductRepository {
            db: self.db.clone(),
        }
    }

    pub fn cart_repo(&self) -> DbCartRepository {
        DbCartRepository {
            db: self.db.clone(),
        }
    }

    pub fn order_repo(&self) -> DbOrderRepository {
        DbOrderRepository {
            db: self.db.clone(),
        }
    }

    pub fn shipment_repo(&self) -> DbShipmentRepository {
        DbShipmentRepository {
            db: self.db.clone(),
        }
    }

    pub fn upgrade_repo(&self) -> DbUpgradeRequestRepository {
        DbUpgradeRequestRepository {
            db: self.db.clone(),
        }
    }

    pub fn revoked_token_repo(&self) -> DbRevokedTokenRepository {
        DbRevokedTokenRepository {
            db: self.db.clone(),
        }
    }
}
