use std::sync::Arc;

use airports::AirportDirectory;
use axum::extract::{Path as AxumPath, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::debug;

#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<AirportDirectory>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::OPTIONS]);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/airports/:iata", get(get_airport))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

async fn get_airport(
    State(state): State<AppState>,
    AxumPath(iata): AxumPath<String>,
) -> Response {
    let code = iata.trim().to_uppercase();
    match state.directory.lookup(&code) {
        Some(airport) => Json(airport.clone()).into_response(),
        None => {
            debug!(iata = %code, "airport not found");
            (
                StatusCode::NOT_FOUND,
                Json(ErrorBody {
                    error: "Airport not found",
                }),
            )
                .into_response()
        }
    }
}
