use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use tracing::{error, info};

use aboard_types::api::{
    ErrorResponse, HealthResponse, SendConfirmationRequest, SendConfirmationResponse,
};

use crate::email::{ConfirmationEmail, MailError, Mailer};

/// Shared application state for all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub mailer: Arc<Mailer>,
}

/// GET /health — liveness probe.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".into(),
        message: "Wedding email server is running".into(),
    })
}

/// POST /send-confirmation — validate the payload and relay exactly one
/// confirmation email.
pub async fn send_confirmation(
    State(state): State<AppState>,
    Json(req): Json<SendConfirmationRequest>,
) -> Result<Json<SendConfirmationResponse>, (StatusCode, Json<ErrorResponse>)> {
    info!(
        "Received email request for confirmation {:?}",
        req.confirmation_number
    );

    let email = ConfirmationEmail::from_request(req).map_err(|e| {
        error!("Rejected email request: {e}");
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
                details: None,
                code: None,
            }),
        )
    })?;

    match state.mailer.send(&email).await {
        Ok(message_id) => {
            info!("Email sent, message id {message_id}");
            Ok(Json(SendConfirmationResponse {
                success: true,
                message_id,
                message: "Confirmation email sent successfully".into(),
            }))
        }
        Err(e) => {
            error!("Error sending confirmation email: {e}");
            Err((StatusCode::INTERNAL_SERVER_ERROR, Json(relay_error(&e))))
        }
    }
}

/// 500 body for a failed relay, echoing the provider's diagnostics.
fn relay_error(e: &MailError) -> ErrorResponse {
    let (details, code) = match e {
        MailError::Relay { message, code } => (message.clone(), code.clone()),
        other => (other.to_string(), None),
    };
    ErrorResponse {
        error: "Failed to send confirmation email".into(),
        details: Some(details),
        code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Environment, MailerConfig};
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use axum::routing::{get, post};
    use axum::Router;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_router() -> Router {
        // No relay credentials: any send attempt fails at the relay stage,
        // which is exactly what the 500 contract covers.
        let config = MailerConfig {
            port: 3001,
            gmail_user: None,
            gmail_app_password: None,
            sender_name: "Wedding ADA2024".into(),
            destination: "inmobiliaria1920@gmail.com".into(),
            environment: Environment::Development,
            frontend_url: None,
        };
        let state = AppState {
            mailer: Arc::new(Mailer::new(&config)),
        };
        Router::new()
            .route("/health", get(health))
            .route("/send-confirmation", post(send_confirmation))
            .with_state(state)
    }

    fn post_json(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/send-confirmation")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn full_payload() -> serde_json::Value {
        serde_json::json!({
            "name": "Ana",
            "email": "a@x.com",
            "selectedSeats": ["A1", "A2"],
            "guests": 2,
            "confirmationNumber": "ADA412345"
        })
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = test_router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "OK");
    }

    #[tokio::test]
    async fn missing_required_fields_are_a_400() {
        for field in ["name", "email", "selectedSeats", "confirmationNumber"] {
            let mut payload = full_payload();
            payload.as_object_mut().unwrap().remove(field);

            let response = test_router().oneshot(post_json(payload)).await.unwrap();
            assert_eq!(
                response.status(),
                StatusCode::BAD_REQUEST,
                "expected 400 without {field}"
            );
            let body = body_json(response).await;
            assert!(body["error"]
                .as_str()
                .unwrap()
                .contains("Missing required fields"));
        }
    }

    #[tokio::test]
    async fn empty_name_counts_as_missing() {
        let mut payload = full_payload();
        payload["name"] = serde_json::json!("");
        let response = test_router().oneshot(post_json(payload)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn relay_failure_is_a_500_with_details() {
        let response = test_router().oneshot(post_json(full_payload())).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Failed to send confirmation email");
        assert!(body["details"].is_string());
    }

    #[test]
    fn relay_error_echoes_the_provider_code() {
        let body = relay_error(&MailError::Relay {
            message: "535-5.7.8 Username and Password not accepted".into(),
            code: Some("535".into()),
        });
        assert_eq!(body.error, "Failed to send confirmation email");
        assert_eq!(
            body.details.as_deref(),
            Some("535-5.7.8 Username and Password not accepted")
        );
        assert_eq!(body.code.as_deref(), Some("535"));
    }
}
