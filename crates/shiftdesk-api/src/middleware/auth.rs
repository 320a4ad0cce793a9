//! JWT Authentication Middleware
//!
//! Extracts the session JWT from the `session_token` cookie or the
//! `Authorization: Bearer` header, validates it, and makes the caller's
//! identity available to handlers via Axum's `Extension`.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use shiftdesk_auth::{JwtValidator, SESSION_TOKEN_TYPE};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::ErrorResponse;

const SESSION_COOKIE: &str = "session_token=";

/// Authenticated caller extracted from the JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    /// User ID from the `sub` claim
    pub user_id: Uuid,
    /// Token type (always "session" once past the middleware)
    pub token_type: String,
}

/// JWT validation state shared across middleware instances
#[derive(Clone)]
pub struct JwtState {
    pub validator: Arc<JwtValidator>,
}

impl JwtState {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            validator: Arc::new(JwtValidator::new(secret)),
        }
    }
}

fn unauthorized(error: impl Into<String>, code: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: error.into(),
            code: Some(code.to_string()),
        }),
    )
}

/// Authentication middleware that validates JWT session tokens
///
/// # Errors
/// Returns 401 Unauthorized if:
/// - Both cookie and Authorization header are missing
/// - Token is malformed, badly signed or expired
/// - Token type is not "session"
/// - The subject is not a user id
pub async fn require_auth(
    State(state): State<Arc<JwtState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let from_cookie = request
        .headers()
        .get(header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .map(|c| c.trim())
                .find_map(|c| c.strip_prefix(SESSION_COOKIE))
        })
        .map(str::to_string);

    let token = match from_cookie {
        Some(token) => token,
        None => {
            let auth_header = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .ok_or_else(|| {
                    unauthorized(
                        "Missing authentication token (cookie or Authorization header)",
                        "MISSING_AUTH",
                    )
                })?;

            auth_header
                .strip_prefix("Bearer ")
                .ok_or_else(|| {
                    unauthorized(
                        "Invalid Authorization header format. Expected 'Bearer <token>'",
                        "INVALID_AUTH_FORMAT",
                    )
                })?
                .to_string()
        }
    };

    let claims = state.validator.validate(&token).map_err(|e| {
        unauthorized(format!("Invalid or expired token: {}", e), "INVALID_TOKEN")
    })?;

    let token_type = match claims.token_type.as_deref() {
        Some(SESSION_TOKEN_TYPE) => SESSION_TOKEN_TYPE.to_string(),
        Some(other) => {
            return Err(unauthorized(
                format!(
                    "Invalid token type '{}'. Expected 'session' token for API access",
                    other
                ),
                "INVALID_TOKEN_TYPE",
            ));
        }
        None => {
            return Err(unauthorized(
                "Token missing 'token_type' claim",
                "MISSING_TOKEN_TYPE",
            ));
        }
    };

    let user_id = claims
        .user_id()
        .map_err(|e| unauthorized(e.to_string(), "INVALID_SUBJECT"))?;

    request.extensions_mut().insert(AuthUser {
        user_id,
        token_type,
    });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, middleware, routing::get, Router};
    use chrono::Duration;
    use shiftdesk_auth::JwtClaims;
    use tower::ServiceExt; // For oneshot()

    async fn protected_handler(axum::Extension(user): axum::Extension<AuthUser>) -> Json<AuthUser> {
        Json(user)
    }

    fn create_test_app(jwt_secret: &[u8]) -> Router {
        let jwt_state = Arc::new(JwtState::new(jwt_secret));

        Router::new()
            .route("/protected", get(protected_handler))
            .layer(middleware::from_fn_with_state(
                jwt_state.clone(),
                require_auth,
            ))
            .with_state(jwt_state)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    fn bearer(token: &str) -> Request<Body> {
        Request::builder()
            .uri("/protected")
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_session_token() {
        let jwt_secret = b"test-secret-key";
        let user_id = Uuid::new_v4();
        let token =
            JwtValidator::encode(jwt_secret, &JwtClaims::session(user_id, Duration::hours(1)))
                .unwrap();

        let (status, body) = send(create_test_app(jwt_secret), bearer(&token)).await;

        assert_eq!(status, StatusCode::OK);
        let auth_user: AuthUser = serde_json::from_slice(&body).unwrap();
        assert_eq!(auth_user.user_id, user_id);
        assert_eq!(auth_user.token_type, "session");
    }

    #[tokio::test]
    async fn test_session_cookie_accepted() {
        let jwt_secret = b"test-secret-key";
        let user_id = Uuid::new_v4();
        let token =
            JwtValidator::encode(jwt_secret, &JwtClaims::session(user_id, Duration::hours(1)))
                .unwrap();

        let request = Request::builder()
            .uri("/protected")
            .header("Cookie", format!("theme=dark; session_token={}", token))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(create_test_app(jwt_secret), request).await;

        assert_eq!(status, StatusCode::OK);
        let auth_user: AuthUser = serde_json::from_slice(&body).unwrap();
        assert_eq!(auth_user.user_id, user_id);
    }

    #[tokio::test]
    async fn test_missing_authorization_header() {
        let request = Request::builder()
            .uri("/protected")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(create_test_app(b"test-secret-key"), request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code.as_deref(), Some("MISSING_AUTH"));
    }

    #[tokio::test]
    async fn test_invalid_bearer_format() {
        let request = Request::builder()
            .uri("/protected")
            .header("Authorization", "InvalidFormat token123")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(create_test_app(b"test-secret-key"), request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert!(error.error.contains("Invalid Authorization header format"));
    }

    #[tokio::test]
    async fn test_expired_token() {
        let jwt_secret = b"test-secret-key";
        let claims = JwtClaims::session(Uuid::new_v4(), Duration::seconds(-120));
        let token = JwtValidator::encode(jwt_secret, &claims).unwrap();

        let (status, body) = send(create_test_app(jwt_secret), bearer(&token)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert!(error.error.contains("Invalid or expired token"));
    }

    #[tokio::test]
    async fn test_wrong_secret() {
        let claims = JwtClaims::session(Uuid::new_v4(), Duration::hours(1));
        let token = JwtValidator::encode(b"wrong-secret-key", &claims).unwrap();

        let (status, _) = send(create_test_app(b"test-secret-key"), bearer(&token)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_rejects_non_session_token() {
        let jwt_secret = b"test-secret-key";
        let claims = JwtClaims::session(Uuid::new_v4(), Duration::hours(1))
            .with_token_type("refresh".to_string());
        let token = JwtValidator::encode(jwt_secret, &claims).unwrap();

        let (status, body) = send(create_test_app(jwt_secret), bearer(&token)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert!(error.error.contains("Invalid token type"));
    }

    #[tokio::test]
    async fn test_rejects_non_uuid_subject() {
        let jwt_secret = b"test-secret-key";
        let claims = JwtClaims::new(
            "someone".to_string(),
            "shiftdesk".to_string(),
            "shiftdesk-api".to_string(),
            Duration::hours(1),
        )
        .with_token_type("session".to_string());
        let token = JwtValidator::encode(jwt_secret, &claims).unwrap();

        let (status, body) = send(create_test_app(jwt_secret), bearer(&token)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code.as_deref(), Some("INVALID_SUBJECT"));
    }
}
