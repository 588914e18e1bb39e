use crate::gateway::auth::{authenticate, require_admin, Auth};
use crate::gateway::error::ApiError;
use crate::gateway::server::GatewayState;
use crate::providers::{jitsi, ClientSettings, Settings};

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::{header::CACHE_CONTROL, HeaderValue},
    middleware,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Admin endpoint updating the Jitsi provider settings.
pub const ADMIN_SETTINGS_PATH: &str = "/jitsiadmin/webconferencing/settings";

/// Build all routes for the gateway.
pub fn build_routes(state: GatewayState) -> Router {
    let admin = Router::new()
        .route(ADMIN_SETTINGS_PATH, post(post_settings_handler))
        .route_layer(middleware::from_fn(require_admin));

    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/providers", get(providers_list_handler))
        .merge(admin)
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store"),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state))
        .with_state(state)
}

fn cors_layer(state: &GatewayState) -> CorsLayer {
    let origins: Vec<HeaderValue> = state
        .config
        .server
        .cors_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(origins)
    }
}

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    uptime: u64,
}

async fn health_handler(State(state): State<GatewayState>) -> Json<HealthResponse> {
    let uptime = state.start_time.elapsed().as_secs();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: state.version.clone(),
        uptime,
    })
}

// ============================================================================
// Providers
// ============================================================================

async fn providers_list_handler(
    State(state): State<GatewayState>,
    Auth(_identity): Auth,
) -> Json<Vec<ClientSettings>> {
    Json(state.providers.list())
}

// ============================================================================
// Jitsi Admin
// ============================================================================

async fn post_settings_handler(
    State(state): State<GatewayState>,
    Auth(identity): Auth,
    payload: Result<Json<Settings>, JsonRejection>,
) -> Result<Json<Settings>, ApiError> {
    let Json(settings) = payload.map_err(|e| {
        warn!(user = %identity.user_id, "Rejected Jitsi settings body: {}", e.body_text());
        ApiError::BadRequest("Invalid Jitsi settings".to_string())
    })?;

    let provider = state
        .providers
        .get(jitsi::TYPE)
        .filter(|p| p.configurable().is_some())
        .ok_or_else(|| ApiError::NotFound("Jitsi provider not found".to_string()))?;

    // Store writes are synchronous; keep them off the async workers.
    let outcome = tokio::task::spawn_blocking(move || {
        provider
            .configurable()
            .map(|configurable| configurable.update_settings(settings))
    })
    .await
    .map_err(|e| {
        error!("Jitsi settings update task failed: {}", e);
        ApiError::Internal("Error saving Jitsi settings".to_string())
    })?
    .ok_or_else(|| ApiError::NotFound("Jitsi provider not found".to_string()))?;

    match outcome {
        Ok(()) => {
            info!(
                user = %identity.user_id,
                log_enabled = settings.log_enabled,
                "Jitsi settings updated"
            );
            Ok(Json(settings))
        }
        Err(e) => {
            error!("Error saving Jitsi settings by '{}': {}", identity.user_id, e);
            Err(ApiError::Internal("Error saving Jitsi settings".to_string()))
        }
    }
}
