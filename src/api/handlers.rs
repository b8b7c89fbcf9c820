//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    response::Json,
};
use tracing::info;

use crate::{
    state::{AppState, CountdownSnapshot, DelayConfiguration, DelayedEmail},
    store::{PersistedSettings, Tab, Theme},
};
use super::responses::{
    reject, ApiError, ApiResponse, DelayRequest, EnabledRequest, HealthResponse, OutboxResponse,
    PresetRequest, SettingsResponse, StatusResponse, TabRequest, ThemeRequest,
};

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Handle GET /settings - Return every persisted setting with display fields
pub async fn settings_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SettingsResponse>, ApiError> {
    let settings = state.get_settings().map_err(reject)?;
    Ok(Json(SettingsResponse::new(settings)))
}

/// Handle PUT /settings/delay - Set the delay from the slider or a typed value
pub async fn delay_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DelayRequest>,
) -> ApiResult<DelayConfiguration> {
    let config = if request.strict {
        state.set_delay_strict(request.seconds)
    } else {
        state.set_delay(request.seconds)
    }
    .map_err(reject)?;

    info!("Delay endpoint called - delay is now {}", config.formatted);
    Ok(Json(ApiResponse::ok(
        format!("Delay set to {}", config.formatted),
        config,
    )))
}

/// Handle PUT /settings/delay/preset - Select one of the preset delays
pub async fn preset_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PresetRequest>,
) -> ApiResult<DelayConfiguration> {
    let config = state.select_preset(request.seconds).map_err(reject)?;
    Ok(Json(ApiResponse::ok(
        format!("Preset {} selected", config.formatted),
        config,
    )))
}

/// Handle PUT /settings/delay/enabled - Toggle delay protection
pub async fn enabled_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EnabledRequest>,
) -> ApiResult<DelayConfiguration> {
    let config = state.set_delay_enabled(request.enabled).map_err(reject)?;
    Ok(Json(ApiResponse::ok(
        format!("Delay protection {}", if config.enabled { "enabled" } else { "disabled" }),
        config,
    )))
}

/// Handle PUT /settings/theme - Switch between dark and light
pub async fn theme_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ThemeRequest>,
) -> ApiResult<PersistedSettings> {
    let theme: Theme = request.theme.parse().map_err(reject)?;
    let settings = state.set_theme(theme).map_err(reject)?;
    Ok(Json(ApiResponse::ok(format!("Theme set to {}", theme), settings)))
}

/// Handle PUT /settings/tab - Remember the active dashboard tab
pub async fn tab_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TabRequest>,
) -> ApiResult<PersistedSettings> {
    let tab: Tab = request.tab.parse().map_err(reject)?;
    let settings = state.set_active_tab(tab).map_err(reject)?;
    Ok(Json(ApiResponse::ok(format!("Active tab is {}", tab), settings)))
}

/// Handle POST /account/sign-in - Mark the mock account as signed in
pub async fn sign_in_handler(State(state): State<Arc<AppState>>) -> ApiResult<PersistedSettings> {
    let settings = state.set_signed_in(true).map_err(reject)?;
    Ok(Json(ApiResponse::ok("Signed in".to_string(), settings)))
}

/// Handle POST /account/sign-out - Mark the mock account as signed out
pub async fn sign_out_handler(State(state): State<Arc<AppState>>) -> ApiResult<PersistedSettings> {
    let settings = state.set_signed_in(false).map_err(reject)?;
    Ok(Json(ApiResponse::ok("Signed out".to_string(), settings)))
}

/// Handle GET /preview - Current countdown preview state
pub async fn preview_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CountdownSnapshot>, ApiError> {
    state.get_countdown().map(Json).map_err(reject)
}

/// Handle POST /preview/start - Simulate sending an email
pub async fn preview_start_handler(State(state): State<Arc<AppState>>) -> ApiResult<CountdownSnapshot> {
    let snapshot = state.start_countdown().map_err(reject)?;
    Ok(Json(ApiResponse::ok(
        format!("Email will send in {} seconds", snapshot.remaining_seconds),
        snapshot,
    )))
}

/// Handle POST /preview/reset - Stop the preview and go back to idle
pub async fn preview_reset_handler(State(state): State<Arc<AppState>>) -> ApiResult<CountdownSnapshot> {
    let snapshot = state.reset_countdown().map_err(reject)?;
    Ok(Json(ApiResponse::ok("Preview reset".to_string(), snapshot)))
}

/// Handle GET /outbox - List held emails
pub async fn outbox_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<OutboxResponse>, ApiError> {
    let (emails, average) = state.get_outbox().map_err(reject)?;
    Ok(Json(OutboxResponse::new(emails, average)))
}

/// Handle POST /outbox/:id/edit - Reopen a held email
pub async fn outbox_edit_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<DelayedEmail> {
    let email = state.edit_email(&id).map_err(reject)?;
    Ok(Json(ApiResponse::ok(format!("Editing \"{}\"", email.subject), email)))
}

/// Handle POST /outbox/:id/cancel - Drop a held email
pub async fn outbox_cancel_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<DelayedEmail> {
    let email = state.cancel_email(&id).map_err(reject)?;
    Ok(Json(ApiResponse::ok(format!("Cancelled \"{}\"", email.subject), email)))
}

/// Handle POST /outbox/:id/send-now - Skip the remaining delay
pub async fn outbox_send_now_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<DelayedEmail> {
    let email = state.send_email_now(&id).map_err(reject)?;
    Ok(Json(ApiResponse::ok(format!("Sent \"{}\"", email.subject), email)))
}

/// Handle GET /status - Return settings, countdown and server metadata
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, ApiError> {
    let settings = state.get_settings().map_err(reject)?;
    let countdown = state.get_countdown().map_err(reject)?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        settings,
        countdown,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
