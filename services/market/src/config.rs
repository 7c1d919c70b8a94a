/// Market service configuration loaded from environment variables.
#[derive(Debug)]
pub struct MarketConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port for the HTTP server (default 3200). Env var: `MARKET_PORT`.
    pub market_port: u16,
    /// HS256 signing secret for access and refresh tokens.
    pub jwt_secret: String,
    /// SMTP relay for notification mail. Unset disables outbound mail
    /// entirely (sends become logged no-ops).
    pub smtp_host: Option<String>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    /// From address for notification mail (default `no-reply@agora.local`).
    pub mail_from: String,
}

impl MarketConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            market_port: std::env::var("MARKET_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3200),
            jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET"),
            smtp_host: std::env::var("SMTP_HOST").ok(),
            smtp_username: std::env::var("SMTP_USERNAME").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
            mail_from: std::env::var("MAIL_FROM")
                .unwrap_or_else(|_| "no-reply@agora.local".to_owned()),
        }
    }
}
