//! API request and response structures

use axum::{http::StatusCode, response::Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::{
    error::SettingsError,
    state::{CountdownSnapshot, DelayConfiguration, DelayedEmail, Preset, PRESETS},
    store::PersistedSettings,
    utils::format_duration,
};

/// API response envelope for state change endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response
    pub fn new(status: &str, message: String, data: T) -> Self {
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            data,
        }
    }

    /// Create a success response
    pub fn ok(message: String, data: T) -> Self {
        Self::new("ok", message, data)
    }
}

/// Error body returned alongside a non-2xx status
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

impl From<SettingsError> for ErrorResponse {
    fn from(e: SettingsError) -> Self {
        Self {
            status: "error".to_string(),
            message: e.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Map a core error to the status code the dashboard expects
pub fn reject(e: SettingsError) -> ApiError {
    let code = match &e {
        SettingsError::InvalidDuration(_)
        | SettingsError::UnknownPreset(_)
        | SettingsError::UnknownTheme(_)
        | SettingsError::UnknownTab(_)
        | SettingsError::PersistenceRead { .. } => StatusCode::BAD_REQUEST,
        SettingsError::UnknownEmail(_) => StatusCode::NOT_FOUND,
        SettingsError::CountdownRunning => StatusCode::CONFLICT,
        SettingsError::Storage(_)
        | SettingsError::Serialization(_)
        | SettingsError::LockPoisoned(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if code.is_server_error() {
        error!("Request failed: {}", e);
    } else {
        warn!("Request rejected: {}", e);
    }
    (code, Json(e.into()))
}

/// Full settings view rendered by the settings tab
#[derive(Debug, Clone, Serialize)]
pub struct SettingsResponse {
    pub settings: PersistedSettings,
    pub delay: DelayConfiguration,
    pub status_label: &'static str,
    pub presets: &'static [Preset],
}

impl SettingsResponse {
    pub fn new(settings: PersistedSettings) -> Self {
        let delay = DelayConfiguration::new(settings.delay_duration, settings.delay_enabled);
        Self {
            settings,
            status_label: delay.status_label(),
            delay,
            presets: &PRESETS,
        }
    }
}

/// Outbox tab contents
#[derive(Debug, Clone, Serialize)]
pub struct OutboxResponse {
    pub emails: Vec<DelayedEmail>,
    pub count: usize,
    pub average_delay: u32,
    pub formatted_average_delay: String,
}

impl OutboxResponse {
    pub fn new(emails: Vec<DelayedEmail>, average_delay: u32) -> Self {
        Self {
            count: emails.len(),
            emails,
            average_delay,
            formatted_average_delay: format_duration(average_delay as u64),
        }
    }
}

/// Status response with countdown information
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub settings: PersistedSettings,
    pub countdown: CountdownSnapshot,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DelayRequest {
    pub seconds: i64,
    /// Reject out-of-range values instead of clamping them
    #[serde(default)]
    pub strict: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PresetRequest {
    pub seconds: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnabledRequest {
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThemeRequest {
    pub theme: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TabRequest {
    pub tab: String,
}
