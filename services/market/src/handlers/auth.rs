use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use agora_auth_types::identity::CurrentActor;

use crate::error::MarketServiceError;
use crate::state::AppState;
use crate::usecase::auth::{
    LoginUseCase, LogoutUseCase, RefreshUseCase, RegisterInput, RegisterUseCase, TokenPair,
};
use crate::usecase::user::GetMeUseCase;

use super::user::UserResponse;

#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub access_token_exp: u64,
    pub refresh_token: String,
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            access_token_exp: pair.access_token_exp,
            refresh_token: pair.refresh_token,
        }
    }
}

// ── POST /auth/register ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub user: UserResponse,
    #[serde(flatten)]
    pub tokens: TokenResponse,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), MarketServiceError> {
    let usecase = RegisterUseCase {
        users: state.user_repo(),
        jwt_secret: state.jwt_secret.0.clone(),
    };
    let out = usecase
        .execute(RegisterInput {
            username: body.username,
            email: body.email,
            password: body.password,
            phone: body.phone,
            address: body.address,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: UserResponse::from(out.user),
            tokens: TokenResponse::from(out.tokens),
        }),
    ))
}

// ── POST /auth/token ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, MarketServiceError> {
    let usecase = LoginUseCase {
        users: state.user_repo(),
        jwt_secret: state.jwt_secret.0.clone(),
    };
    let (_user, tokens) = usecase.execute(&body.username, &body.password).await?;
    Ok(Json(TokenResponse::from(tokens)))
}

// ── POST /auth/token/refresh ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>, MarketServiceError> {
    let usecase = RefreshUseCase {
        users: state.user_repo(),
        revoked: state.revoked_token_repo(),
        jwt_secret: state.jwt_secret.0.clone(),
    };
    let tokens = usecase.execute(&body.refresh_token).await?;
    Ok(Json(TokenResponse::from(tokens)))
}

// ── POST /auth/logout ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: String,
}

pub async fn logout(
    State(state): State<AppState>,
    Json(body): Json<LogoutRequest>,
) -> Result<StatusCode, MarketServiceError> {
    let usecase = LogoutUseCase {
        revoked: state.revoked_token_repo(),
        jwt_secret: state.jwt_secret.0.clone(),
    };
    usecase.execute(&body.refresh_token).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /auth/me ─────────────────────────────────────────────────────────────

pub async fn me(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, MarketServiceError> {
    let usecase = GetMeUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(&actor).await?;
    Ok(Json(UserResponse::from(user)))
}
