//! Bearer-header actor extractor.

use axum::extract::{FromRef, FromRequestParts};
use http::StatusCode;
use http::request::Parts;

use agora_domain::actor::Actor;

use crate::token::{TokenKind, validate_token};

/// JWT signing secret, provided to the extractor through the application
/// state via [`FromRef`].
#[derive(Debug, Clone)]
pub struct JwtSecret(pub String);

/// Extracts the requesting [`Actor`] from the `Authorization: Bearer` header.
///
/// No header at all yields `Actor::Anonymous` — whether an anonymous caller
/// may proceed is the permission gate's decision, not the extractor's. A
/// header that is present but unusable (wrong scheme, invalid or expired
/// token, refresh token where an access token is required) is rejected
/// with 401.
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Actor);

impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
    JwtSecret: FromRef<S>,
{
    type Rejection = StatusCode;

    // axum-core 0.5 declares this as `fn -> impl Future + Send`; extract
    // header values synchronously and return a 'static async block.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let secret = JwtSecret::from_ref(state);
        let header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .map(|v| v.to_str().map(str::to_owned));

        async move {
            let header = match header {
                None => return Ok(Self(Actor::Anonymous)),
                Some(Ok(value)) => value,
                Some(Err(_)) => return Err(StatusCode::UNAUTHORIZED),
            };
            let token = header
                .strip_prefix("Bearer ")
                .ok_or(StatusCode::UNAUTHORIZED)?;
            let info = validate_token(token, TokenKind::Access, &secret.0)
                .map_err(|_| StatusCode::UNAUTHORIZED)?;
            Ok(Self(Actor::known(info.user_id, info.role, info.verified)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_domain::role::Role;
    use http::Request;
    use uuid::Uuid;

    use crate::token::issue_access_token;

    const TEST_SECRET: &str = "extractor-test-secret";

    #[derive(Clone)]
    struct TestState {
        secret: JwtSecret,
    }

    impl FromRef<TestState> for JwtSecret {
        fn from_ref(state: &TestState) -> Self {
            state.secret.clone()
        }
    }

    async fn extract(authorization: Option<&str>) -> Result<CurrentActor, StatusCode> {
        let mut builder = Request::builder().method("GET").uri("/products");
        if let Some(value) = authorization {
            builder = builder.header("authorization", value);
        }
        let request = builder.body(()).unwrap();
        let (mut parts, _body) = request.into_parts();
        let state = TestState {
            secret: JwtSecret(TEST_SECRET.to_owned()),
        };
        CurrentActor::from_request_parts(&mut parts, &state).await
    }

    #[tokio::test]
    async fn should_yield_anonymous_without_header() {
        let CurrentActor(actor) = extract(None).await.unwrap();
        assert_eq!(actor, Actor::Anonymous);
    }

    #[tokio::test]
    async fn should_extract_known_actor_from_valid_token() {
        let user_id = Uuid::new_v4();
        let (token, _) = issue_access_token(user_id, Role::Wholesaler, true, TEST_SECRET).unwrap();
        let CurrentActor(actor) = extract(Some(&format!("Bearer {token}"))).await.unwrap();
        let identity = actor.identity().unwrap();
        assert_eq!(identity.user_id, user_id);
        assert_eq!(identity.role, Role::Wholesaler);
        assert!(identity.verified);
    }

    #[tokio::test]
    async fn should_reject_non_bearer_scheme() {
        let err = extract(Some("Basic dXNlcjpwdw==")).await.unwrap_err();
        assert_eq!(err, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn should_reject_invalid_token() {
        let err = extract(Some("Bearer not.a.jwt")).await.unwrap_err();
        assert_eq!(err, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn should_reject_token_signed_with_other_secret() {
        let (token, _) =
            issue_access_token(Uuid::new_v4(), Role::Consumer, true, "other").unwrap();
        let err = extract(Some(&format!("Bearer {token}"))).await.unwrap_err();
        assert_eq!(err, StatusCode::UNAUTHORIZED);
    }
}
