use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::services::auth_service::AuthService;

/// Extension type to store authenticated user ID in request
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

/// Auth middleware that validates JWT tokens and adds user_id to request extensions
pub async fn auth_middleware(
    State(auth_service): State<Arc<dyn AuthService>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    // Extract Authorization header
    let auth_header = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    // Parse Bearer token
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidTokenFormat)?;

    // Validate token and extract user_id
    let user_id = auth_service
        .validate_token(token)
        .await
        .map_err(|e| match e {
            crate::services::auth_service::AuthError::TokenExpired => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?;

    // Add user_id to request extensions
    request
        .extensions_mut()
        .insert(AuthenticatedUser { user_id });

    // Continue to next handler
    Ok(next.run(request).await)
}

/// Auth middleware errors
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidTokenFormat,
    InvalidToken,
    TokenExpired,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing authorization token"),
            AuthError::InvalidTokenFormat => (
                StatusCode::UNAUTHORIZED,
                "Invalid authorization header format. Expected: Bearer <token>",
            ),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or malformed token"),
            AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token has expired"),
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::{AuthToken, LoginRequest};
    use crate::models::user::{CreateUserRequest, User};
    use crate::services::auth_service::AuthError as ServiceAuthError;
    use async_trait::async_trait;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        middleware,
        routing::get,
    };
    use chrono::Utc;
    use std::sync::Arc;
    use tower::ServiceExt;

    /// Accepts exactly one token, mapping it to a fixed user id
    struct SingleTokenAuthService {
        token: String,
        user_id: Uuid,
    }

    #[async_trait]
    impl AuthService for SingleTokenAuthService {
        async fn register(&self, _request: CreateUserRequest) -> Result<User, ServiceAuthError> {
            Err(ServiceAuthError::DatabaseError("not implemented".to_string()))
        }

        async fn login(&self, _request: LoginRequest) -> Result<AuthToken, ServiceAuthError> {
            Ok(AuthToken {
                token: self.token.clone(),
                expires_at: Utc::now(),
            })
        }

        async fn validate_token(&self, token: &str) -> Result<Uuid, ServiceAuthError> {
            if token == self.token {
                Ok(self.user_id)
            } else {
                Err(ServiceAuthError::InvalidToken)
            }
        }
    }

    // Test handler that requires authentication
    async fn protected_handler(
        axum::Extension(user): axum::Extension<AuthenticatedUser>,
    ) -> impl IntoResponse {
        Json(json!({
            "user_id": user.user_id.to_string(),
            "message": "Access granted"
        }))
    }

    fn create_test_app(auth_service: Arc<dyn AuthService>) -> Router {
        Router::new()
            .route("/protected", get(protected_handler))
            .layer(middleware::from_fn_with_state(
                auth_service.clone(),
                auth_middleware,
            ))
            .with_state(auth_service)
    }

    fn test_auth_service() -> (Arc<dyn AuthService>, Uuid) {
        let user_id = Uuid::new_v4();
        let service: Arc<dyn AuthService> = Arc::new(SingleTokenAuthService {
            token: "valid_token".to_string(),
            user_id,
        });
        (service, user_id)
    }

    async fn parse_body(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_middleware_with_valid_token() {
        let (auth_service, user_id) = test_auth_service();
        let app = create_test_app(auth_service);

        let request = Request::builder()
            .uri("/protected")
            .header("Authorization", "Bearer valid_token")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body_json = parse_body(response).await;
        assert_eq!(body_json["user_id"], user_id.to_string());
        assert_eq!(body_json["message"], "Access granted");
    }

    #[tokio::test]
    async fn test_middleware_without_token() {
        let (auth_service, _) = test_auth_service();
        let app = create_test_app(auth_service);

        let request = Request::builder()
            .uri("/protected")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_json = parse_body(response).await;
        assert!(
            body_json["error"]
                .as_str()
                .unwrap()
                .contains("Missing authorization token")
        );
    }

    #[tokio::test]
    async fn test_middleware_with_invalid_token() {
        let (auth_service, _) = test_auth_service();
        let app = create_test_app(auth_service);

        let request = Request::builder()
            .uri("/protected")
            .header("Authorization", "Bearer wrong_token")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_json = parse_body(response).await;
        assert!(
            body_json["error"]
                .as_str()
                .unwrap()
                .contains("Invalid or malformed token")
        );
    }

    #[tokio::test]
    async fn test_middleware_with_malformed_header() {
        let (auth_service, _) = test_auth_service();
        let app = create_test_app(auth_service);

        // Without "Bearer " prefix
        let request = Request::builder()
            .uri("/protected")
            .header("Authorization", "some_token")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_json = parse_body(response).await;
        assert!(
            body_json["error"]
                .as_str()
                .unwrap()
                .contains("Invalid authorization header format")
        );
    }
}
