//! JWT issue and validation.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use agora_domain::role::Role;

/// Access-token lifetime in seconds (15 minutes).
pub const ACCESS_TOKEN_EXP: u64 = 15 * 60;

/// Refresh-token lifetime in seconds (7 days).
pub const REFRESH_TOKEN_EXP: u64 = 7 * 24 * 60 * 60;

/// Whether a token grants API access or only a refresh.
///
/// Both token kinds share the claims shape; the `kind` claim keeps a refresh
/// token from being presented as an access credential and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User ID (UUID string).
    pub sub: String,
    pub role: Role,
    pub verified: bool,
    pub kind: TokenKind,
    /// Token ID — refresh tokens are revoked by this value at logout.
    pub jti: String,
    /// Expiration, seconds since UNIX epoch.
    pub exp: u64,
}

/// Errors returned by [`validate_token`].
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
}

/// Identity carried by a validated token.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub user_id: Uuid,
    pub role: Role,
    pub verified: bool,
    pub jti: Uuid,
    pub exp: u64,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_secs()
}

fn issue(
    user_id: Uuid,
    role: Role,
    verified: bool,
    kind: TokenKind,
    lifetime: u64,
    secret: &str,
) -> Result<(String, u64), jsonwebtoken::errors::Error> {
    let exp = now_secs() + lifetime;
    let claims = TokenClaims {
        sub: user_id.to_string(),
        role,
        verified,
        kind,
        jti: Uuid::new_v4().to_string(),
        exp,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok((token, exp))
}

/// Issue an access token. Returns the token and its expiration timestamp.
pub fn issue_access_token(
    user_id: Uuid,
    role: Role,
    verified: bool,
    secret: &str,
) -> Result<(String, u64), jsonwebtoken::errors::Error> {
    issue(user_id, role, verified, TokenKind::Access, ACCESS_TOKEN_EXP, secret)
}

/// Issue a refresh token.
pub fn issue_refresh_token(
    user_id: Uuid,
    role: Role,
    verified: bool,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    issue(user_id, role, verified, TokenKind::Refresh, REFRESH_TOKEN_EXP, secret)
        .map(|(token, _)| token)
}

/// Decode a token, check signature + expiry, and require the expected kind.
///
/// HS256 only; required claims `exp` + `sub`; default 60s leeway for clock
/// skew between issuer and validator.
pub fn validate_token(
    token: &str,
    expected_kind: TokenKind,
    secret: &str,
) -> Result<TokenInfo, TokenError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    })?;

    let claims = data.claims;
    if claims.kind != expected_kind {
        return Err(TokenError::Invalid);
    }
    let user_id = claims.sub.parse::<Uuid>().map_err(|_| TokenError::Invalid)?;
    let jti = claims.jti.parse::<Uuid>().map_err(|_| TokenError::Invalid)?;
    Ok(TokenInfo {
        user_id,
        role: claims.role,
        verified: claims.verified,
        jti,
        exp: claims.exp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "unit-test-secret";

    #[test]
    fn should_round_trip_access_token() {
        let user_id = Uuid::new_v4();
        let (token, exp) =
            issue_access_token(user_id, Role::Retailer, true, TEST_SECRET).unwrap();
        let info = validate_token(&token, TokenKind::Access, TEST_SECRET).unwrap();
        assert_eq!(info.user_id, user_id);
        assert_eq!(info.role, Role::Retailer);
        assert!(info.verified);
        assert_eq!(info.exp, exp);
    }

    #[test]
    fn should_reject_refresh_token_presented_as_access() {
        let token =
            issue_refresh_token(Uuid::new_v4(), Role::Consumer, true, TEST_SECRET).unwrap();
        let err = validate_token(&token, TokenKind::Access, TEST_SECRET).unwrap_err();
        assert!(matches!(err, TokenError::Invalid));
    }

    #[test]
    fn should_reject_wrong_secret() {
        let (token, _) =
            issue_access_token(Uuid::new_v4(), Role::Consumer, true, TEST_SECRET).unwrap();
        let err = validate_token(&token, TokenKind::Access, "other-secret").unwrap_err();
        assert!(matches!(err, TokenError::Invalid));
    }

    #[test]
    fn should_reject_expired_token() {
        // Hand-build a token whose exp is past the 60s leeway.
        let claims = TokenClaims {
            sub: Uuid::new_v4().to_string(),
            role: Role::Consumer,
            verified: true,
            kind: TokenKind::Access,
            jti: Uuid::new_v4().to_string(),
            exp: now_secs() - 120,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();
        let err = validate_token(&token, TokenKind::Access, TEST_SECRET).unwrap_err();
        assert!(matches!(err, TokenError::Expired));
    }

    #[test]
    fn should_reject_garbage() {
        let err = validate_token("not.a.jwt", TokenKind::Access, TEST_SECRET).unwrap_err();
        assert!(matches!(err, TokenError::Invalid));
    }
}
