//! Authentication middleware for protected routes.
//!
//! Extracts the Bearer token from the Authorization header, verifies it with
//! the shared credential decoder, and injects the claims into request
//! extensions.

use crate::errors::CourseError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
};
use common::gate::authorization_header;
use common::jwt::{bearer_token, CredentialDecoder};
use std::sync::Arc;
use tracing::instrument;

/// State for the authentication middleware.
#[derive(Clone)]
pub struct AuthState {
    pub decoder: Arc<CredentialDecoder>,
}

/// Authentication middleware that verifies bearer credentials.
///
/// # Authorization Header Format
///
/// ```text
/// Authorization: Bearer <token>
/// ```
///
/// # Response
///
/// - Returns 401 Unauthorized with WWW-Authenticate header if token is missing or invalid
/// - Continues to next handler with `Claims` in extensions if token is valid
#[instrument(skip_all, name = "course.middleware.auth")]
pub async fn require_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, CourseError> {
    let header = authorization_header(req.headers()).ok_or_else(|| {
        tracing::debug!(target: "course.middleware.auth", "Missing Authorization header");
        CourseError::InvalidToken("Missing Authorization header".to_string())
    })?;

    let token = bearer_token(header).ok_or_else(|| {
        tracing::debug!(target: "course.middleware.auth", "Invalid Authorization header format");
        CourseError::InvalidToken("Invalid Authorization header format".to_string())
    })?;

    let claims = state.decoder.decode(token)?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header::AUTHORIZATION, Request as HttpRequest, StatusCode},
        middleware,
        routing::get,
        Extension, Router,
    };
    use common::jwt::{Claims, DEFAULT_CLOCK_SKEW};
    use common::secret::SecretString;
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use tower::ServiceExt;

    const SECRET: &str = "middleware-test-secret";

    fn app() -> Router {
        let state = Arc::new(AuthState {
            decoder: Arc::new(CredentialDecoder::hs256(
                &SecretString::from(SECRET),
                DEFAULT_CLOCK_SKEW,
            )),
        });

        Router::new()
            .route(
                "/whoami",
                get(|Extension(claims): Extension<Claims>| async move { claims.sub }),
            )
            .route_layer(middleware::from_fn_with_state(state, require_auth))
    }

    fn token(sub: &str) -> String {
        let now = chrono::Utc::now().timestamp();
        encode(
            &Header::new(Algorithm::HS256),
            &serde_json::json!({ "sub": sub, "exp": now + 600, "iat": now }),
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_auth_state_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AuthState>();
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler_with_claims() {
        let response = app()
            .oneshot(
                HttpRequest::builder()
                    .uri("/whoami")
                    .header(AUTHORIZATION, format!("Bearer {}", token("carol")))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = http_body_util::BodyExt::collect(response.into_body())
            .await
            .unwrap()
            .to_bytes();
        assert_eq!(body.as_ref(), b"carol");
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let response = app()
            .oneshot(
                HttpRequest::builder()
                    .uri("/whoami")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key("www-authenticate"));
    }

    #[tokio::test]
    async fn test_garbage_token_is_unauthorized() {
        let response = app()
            .oneshot(
                HttpRequest::builder()
                    .uri("/whoami")
                    .header(AUTHORIZATION, "Bearer not.a.jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
