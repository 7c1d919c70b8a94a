use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Market service error variants.
#[derive(Debug, thiserror::Error)]
pub enum MarketServiceError {
    #[error("authentication required")]
    Unauthorized,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid refresh token")]
    InvalidRefreshToken,
    #[error("forbidden")]
    Forbidden,
    #[error("user not found")]
    UserNotFound,
    #[error("category not found")]
    CategoryNotFound,
    #[error("product not found")]
    ProductNotFound,
    #[error("cart line not found")]
    CartLineNotFound,
    #[error("order not found")]
    OrderNotFound,
    #[error("shipment not found")]
    ShipmentNotFound,
    #[error("upgrade request not found")]
    UpgradeRequestNotFound,
    #[error("cart is empty")]
    EmptyCart,
    #[error("quantity must be at least 1")]
    InvalidQuantity,
    #[error("invalid status value")]
    InvalidStatus,
    #[error("invalid role value")]
    InvalidRole,
    #[error("price must not be negative")]
    InvalidPrice,
    #[error("password too short")]
    PasswordTooShort,
    #[error("shipment has not been shipped")]
    NotShipped,
    #[error("missing data")]
    MissingData,
    #[error("username already taken")]
    UsernameTaken,
    #[error("email already registered")]
    EmailTaken,
    #[error("order already has a shipment")]
    ShipmentExists,
    #[error("request already decided")]
    RequestDecided,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl MarketServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            Self::Forbidden => "FORBIDDEN",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::CategoryNotFound => "CATEGORY_NOT_FOUND",
            Self::ProductNotFound => "PRODUCT_NOT_FOUND",
            Self::CartLineNotFound => "CART_LINE_NOT_FOUND",
            Self::OrderNotFound => "ORDER_NOT_FOUND",
            Self::ShipmentNotFound => "SHIPMENT_NOT_FOUND",
            Self::UpgradeRequestNotFound => "UPGRADE_REQUEST_NOT_FOUND",
            Self::EmptyCart => "EMPTY_CART",
            Self::InvalidQuantity => "INVALID_QUANTITY",
            Self::InvalidStatus => "INVALID_STATUS",
            Self::InvalidRole => "INVALID_ROLE",
            Self::InvalidPrice => "INVALID_PRICE",
            Self::PasswordTooShort => "PASSWORD_TOO_SHORT",
            Self::NotShipped => "NOT_SHIPPED",
            Self::MissingData => "MISSING_DATA",
            Self::UsernameTaken => "USERNAME_TAKEN",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::ShipmentExists => "SHIPMENT_EXISTS",
            Self::RequestDecided => "REQUEST_DECIDED",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for MarketServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Unauthorized | Self::InvalidCredentials | Self::InvalidRefreshToken => {
                StatusCode::UNAUTHORIZED
            }
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::UserNotFound
            | Self::CategoryNotFound
            | Self::ProductNotFound
            | Self::CartLineNotFound
            | Self::OrderNotFound
            | Self::ShipmentNotFound
            | Self::UpgradeRequestNotFound => StatusCode::NOT_FOUND,
            Self::EmptyCart
            | Self::InvalidQuantity
            | Self::InvalidStatus
            | Self::InvalidRole
            | Self::InvalidPrice
            | Self::PasswordTooShort
            | Self::NotShipped
            | Self::MissingData => StatusCode::BAD_REQUEST,
            Self::UsernameTaken
            | Self::EmailTaken
            | Self::ShipmentExists
            | Self::RequestDecided => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // tower-http's TraceLayer records method/uri/status for every request;
        // only 500s carry information worth logging here.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::response::IntoResponse;

    async fn assert_error(
        error: MarketServiceError,
        expected_status: StatusCode,
        expected_kind: &str,
    ) {
        let resp = error.into_response();
        assert_eq!(resp.status(), expected_status);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["kind"], expected_kind);
        assert!(json["message"].is_string());
    }

    #[tokio::test]
    async fn should_map_credential_errors_to_401() {
        assert_error(
            MarketServiceError::Unauthorized,
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
        )
        .await;
        assert_error(
            MarketServiceError::InvalidCredentials,
            StatusCode::UNAUTHORIZED,
            "INVALID_CREDENTIALS",
        )
        .await;
        assert_error(
            MarketServiceError::InvalidRefreshToken,
            StatusCode::UNAUTHORIZED,
            "INVALID_REFRESH_TOKEN",
        )
        .await;
    }

    #[tokio::test]
    async fn should_map_forbidden_to_403() {
        assert_error(MarketServiceError::Forbidden, StatusCode::FORBIDDEN, "FORBIDDEN").await;
    }

    #[tokio::test]
    async fn should_map_missing_entities_to_404() {
        assert_error(
            MarketServiceError::ProductNotFound,
            StatusCode::NOT_FOUND,
            "PRODUCT_NOT_FOUND",
        )
        .await;
        assert_error(
            MarketServiceError::OrderNotFound,
            StatusCode::NOT_FOUND,
            "ORDER_NOT_FOUND",
        )
        .await;
        assert_error(
            MarketServiceError::UpgradeRequestNotFound,
            StatusCode::NOT_FOUND,
            "UPGRADE_REQUEST_NOT_FOUND",
        )
        .await;
    }

    #[tokio::test]
    async fn should_map_validation_failures_to_400() {
        assert_error(MarketServiceError::EmptyCart, StatusCode::BAD_REQUEST, "EMPTY_CART").await;
        assert_error(
            MarketServiceError::InvalidStatus,
            StatusCode::BAD_REQUEST,
            "INVALID_STATUS",
        )
        .await;
        assert_error(
            MarketServiceError::InvalidQuantity,
            StatusCode::BAD_REQUEST,
            "INVALID_QUANTITY",
        )
        .await;
        assert_error(MarketServiceError::NotShipped, StatusCode::BAD_REQUEST, "NOT_SHIPPED").await;
    }

    #[tokio::test]
    async fn should_map_conflicts_to_409() {
        assert_error(
            MarketServiceError::UsernameTaken,
            StatusCode::CONFLICT,
            "USERNAME_TAKEN",
        )
        .await;
        assert_error(
            MarketServiceError::RequestDecided,
            StatusCode::CONFLICT,
            "REQUEST_DECIDED",
        )
        .await;
        assert_error(
            MarketServiceError::ShipmentExists,
            StatusCode::CONFLICT,
            "SHIPMENT_EXISTS",
        )
        .await;
    }

    #[tokio::test]
    async fn should_map_internal_to_500() {
        assert_error(
            MarketServiceError::Internal(anyhow::anyhow!("db down")),
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL",
        )
        .await;
    }
}
