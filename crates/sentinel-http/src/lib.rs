//! Axum adapter for the Sentinel core.
//!
//! Two surfaces: the internal status endpoint (gated by the private-network
//! policy) and the public short-link redirect route behind every issued
//! short URL. All core errors are rendered as flat `{"error": ...}` bodies.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{info, warn};

use sentinel_core::{
    guilds::GuildStore,
    links::LinkDirectory,
    netpolicy::check_origin,
    status::{Census, StatusGateway},
    Error,
};

/// Header the network fabric sets on traffic it has already vetted. Its
/// presence bypasses the source-address check.
pub const TRUST_HEADER: &str = "x-internal-auth";

#[derive(Clone)]
pub struct AppState {
    pub guilds: Arc<GuildStore>,
    pub links: Arc<LinkDirectory>,
    pub census: Arc<Census>,
    pub status: Arc<StatusGateway>,
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/private/internal", post(internal_endpoint))
        .route("/u/:code", get(serve_redirect))
        .with_state(state)
}

async fn internal_endpoint(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Option<Json<Value>>,
) -> Response {
    // Policy first, before the command is even looked at.
    let trusted = headers.contains_key(TRUST_HEADER);
    if let Err(error) = check_origin(&peer.ip().to_string(), trusted) {
        warn!(%peer, %error, "internal endpoint rejected");
        return match error {
            Error::BadRequest(_) => error_reply(StatusCode::BAD_REQUEST, "Invalid IP"),
            _ => error_reply(StatusCode::FORBIDDEN, "Access denied"),
        };
    }

    let command = body
        .as_ref()
        .and_then(|Json(v)| v.get("command"))
        .and_then(Value::as_str);

    match command {
        None => error_reply(StatusCode::BAD_REQUEST, "Command required"),
        Some("status") => {
            let counts = state.census.counts().await;
            let tenant_count = state.guilds.count().await;
            let user_count = state.guilds.total_members(&counts).await;
            let report = state.status.report(tenant_count, user_count, Utc::now());
            (StatusCode::OK, Json(report)).into_response()
        }
        Some(_) => error_reply(StatusCode::BAD_REQUEST, "Invalid command"),
    }
}

async fn serve_redirect(State(state): State<AppState>, Path(code): Path<String>) -> Response {
    let Some(record) = state.links.resolve(&code).await else {
        return error_reply(StatusCode::NOT_FOUND, "URL not found");
    };

    state.links.increment_usage(&code).await;
    info!(code, target = record.target_url, "short link served");
    Redirect::temporary(&record.target_url).into_response()
}

fn error_reply(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
