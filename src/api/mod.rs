//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/settings", get(settings_handler))
        .route("/settings/delay", put(delay_handler))
        .route("/settings/delay/preset", put(preset_handler))
        .route("/settings/delay/enabled", put(enabled_handler))
        .route("/settings/theme", put(theme_handler))
        .route("/settings/tab", put(tab_handler))
        .route("/account/sign-in", post(sign_in_handler))
        .route("/account/sign-out", post(sign_out_handler))
        .route("/preview", get(preview_handler))
        .route("/preview/start", post(preview_start_handler))
        .route("/preview/reset", post(preview_reset_handler))
        .route("/outbox", get(outbox_handler))
        .route("/outbox/:id/edit", post(outbox_edit_handler))
        .route("/outbox/:id/cancel", post(outbox_cancel_handler))
        .route("/outbox/:id/send-now", post(outbox_send_now_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        state::Outbox,
        store::{MemoryBackend, SettingsStore},
    };

    fn router() -> Router {
        let store = SettingsStore::init(Box::new(MemoryBackend::new())).unwrap();
        let state = AppState::new(0, "127.0.0.1".to_string(), store, Outbox::with_demo_emails());
        create_router(Arc::new(state))
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn health() {
        let app = router();
        let (status, body) = call(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn default_settings() {
        let app = router();
        let (status, body) = call(&app, Method::GET, "/settings", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["settings"]["delay_duration"], 60);
        assert_eq!(body["settings"]["theme"], "light");
        assert_eq!(body["settings"]["active_tab"], "settings");
        assert_eq!(body["delay"]["formatted"], "1m");
        assert_eq!(body["delay"]["selected_preset"], 60);
        assert_eq!(body["status_label"], "Active");
        assert_eq!(body["presets"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn delay_is_clamped_unless_strict() {
        let app = router();
        let (status, body) =
            call(&app, Method::PUT, "/settings/delay", Some(json!({ "seconds": 17 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["duration_seconds"], 15);
        assert_eq!(body["data"]["formatted"], "15s");

        let (status, body) = call(
            &app,
            Method::PUT,
            "/settings/delay",
            Some(json!({ "seconds": 900, "strict": true })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");

        let (_, body) = call(&app, Method::GET, "/settings", None).await;
        assert_eq!(body["settings"]["delay_duration"], 15);
    }

    #[tokio::test]
    async fn presets_and_toggle() {
        let app = router();
        let (status, body) =
            call(&app, Method::PUT, "/settings/delay/preset", Some(json!({ "seconds": 120 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["formatted"], "2m");

        let (status, _) =
            call(&app, Method::PUT, "/settings/delay/preset", Some(json!({ "seconds": 45 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) =
            call(&app, Method::PUT, "/settings/delay/enabled", Some(json!({ "enabled": false }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["enabled"], false);

        let (_, body) = call(&app, Method::GET, "/settings", None).await;
        assert_eq!(body["status_label"], "Paused");
    }

    #[tokio::test]
    async fn theme_tab_and_account() {
        let app = router();
        let (status, body) =
            call(&app, Method::PUT, "/settings/theme", Some(json!({ "theme": "dark" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["theme"], "dark");

        let (status, _) =
            call(&app, Method::PUT, "/settings/theme", Some(json!({ "theme": "sepia" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) =
            call(&app, Method::PUT, "/settings/tab", Some(json!({ "tab": "outbox" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["active_tab"], "outbox");

        let (status, _) =
            call(&app, Method::PUT, "/settings/tab", Some(json!({ "tab": "billing" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = call(&app, Method::POST, "/account/sign-out", None).await;
        assert_eq!(body["data"]["is_signed_in"], false);
        let (_, body) = call(&app, Method::POST, "/account/sign-in", None).await;
        assert_eq!(body["data"]["is_signed_in"], true);
    }

    #[tokio::test(start_paused = true)]
    async fn preview_lifecycle() {
        let app = router();
        let (_, body) = call(&app, Method::GET, "/preview", None).await;
        assert_eq!(body["phase"], "idle");
        assert_eq!(body["indicator"]["kind"], "hidden");

        let (status, body) = call(&app, Method::POST, "/preview/start", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["phase"], "running");
        assert_eq!(body["data"]["remaining_seconds"], 60);

        let (status, _) = call(&app, Method::POST, "/preview/start", None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        tokio::time::sleep(std::time::Duration::from_millis(2_500)).await;
        let (_, body) = call(&app, Method::GET, "/preview", None).await;
        assert_eq!(body["remaining_seconds"], 58);

        let (_, body) = call(&app, Method::POST, "/preview/reset", None).await;
        assert_eq!(body["data"]["phase"], "idle");
        assert_eq!(body["data"]["remaining_seconds"], 60);
    }

    #[tokio::test]
    async fn outbox_actions() {
        let app = router();
        let (_, body) = call(&app, Method::GET, "/outbox", None).await;
        assert_eq!(body["count"], 3);
        assert_eq!(body["average_delay"], 72);
        assert_eq!(body["formatted_average_delay"], "1m 12s");

        let (status, body) = call(&app, Method::POST, "/outbox/1/edit", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["touches"], 1);

        let (status, _) = call(&app, Method::POST, "/outbox/2/send-now", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = call(&app, Method::POST, "/outbox/2/cancel", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = call(&app, Method::GET, "/outbox", None).await;
        assert_eq!(body["count"], 2);
    }

    #[tokio::test]
    async fn status_reports_last_action() {
        let app = router();
        call(&app, Method::PUT, "/settings/delay", Some(json!({ "seconds": 30 }))).await;
        let (status, body) = call(&app, Method::GET, "/status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["last_action"], "set-delay");
        assert_eq!(body["countdown"]["remaining_seconds"], 30);
    }
}
