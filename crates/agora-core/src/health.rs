use axum::http::StatusCode;

/// Handler for `GET /healthz` — process is up.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Handler for `GET /readyz` — ready to take traffic. Services that need a
/// dependency check (database ping) register their own handler instead.
pub async fn readyz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn health_endpoints_return_200() {
        assert_eq!(healthz().await, StatusCode::OK);
        assert_eq!(readyz().await, StatusCode::OK);
    }
}
