//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::distance::{great_circle_miles, round_miles};
use crate::domain::{Coordinates, Locode};
use crate::geocache::GeocodeStore;
use crate::geocoder::Geocoder;
use crate::resolver::ResolutionError;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router<G, S>(state: AppState<G, S>) -> Router
where
    G: Geocoder + 'static,
    S: GeocodeStore + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/lanes", post(process_lanes::<G, S>))
        .route("/resolve", get(resolve::<G, S>))
        .route("/distance", get(distance::<G, S>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Enrich a batch of lanes.
async fn process_lanes<G: Geocoder, S: GeocodeStore>(
    State(state): State<AppState<G, S>>,
    Json(req): Json<LanesRequest>,
) -> Json<LanesResponse> {
    let output = state.processor.process(req.lanes).await;
    Json(LanesResponse::from_output(&output))
}

/// Resolve a single place.
async fn resolve<G: Geocoder, S: GeocodeStore>(
    State(state): State<AppState<G, S>>,
    Query(req): Query<ResolveQuery>,
) -> Result<Json<ResolveResponse>, AppError> {
    let resolver = state.resolver();
    let code = req.code.as_deref();

    let resolution = match req.country.as_deref() {
        Some(country) => resolver.resolve(&req.name, country, code).await?,
        None => resolver.resolve_place(&req.name, code).await?,
    };

    Ok(Json(resolution.into()))
}

/// Distance between two UN/LOCODEs from the table.
async fn distance<G: Geocoder, S: GeocodeStore>(
    State(state): State<AppState<G, S>>,
    Query(req): Query<DistanceQuery>,
) -> Result<Json<DistanceResponse>, AppError> {
    let table = state.resolver().table();

    let lookup = |raw: &str| -> Result<(Locode, Coordinates), AppError> {
        let code = Locode::parse_normalized(raw).map_err(|e| AppError::BadRequest {
            message: e.to_string(),
        })?;
        table
            .get(&code)
            .map(|entry| (code, entry.coordinates))
            .ok_or_else(|| AppError::NotFound {
                message: format!("Unknown location code: {code}"),
            })
    };

    let (from, from_coords) = lookup(&req.from)?;
    let (to, to_coords) = lookup(&req.to)?;

    Ok(Json(DistanceResponse {
        from: from.to_string(),
        to: to.to_string(),
        distance_miles: round_miles(great_circle_miles(from_coords, to_coords)),
    }))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Unavailable { message: String },
}

impl From<ResolutionError> for AppError {
    fn from(e: ResolutionError) -> Self {
        let message = e.to_string();
        match e {
            ResolutionError::EmptyQuery => AppError::BadRequest { message },
            ResolutionError::NotFound(_) => AppError::NotFound { message },
            ResolutionError::ServiceUnavailable { .. } => AppError::Unavailable { message },
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let message = match self {
            AppError::BadRequest { message }
            | AppError::NotFound { message }
            | AppError::Unavailable { message } => message,
        };

        // Bad input and unknown places are routine for callers.
        if status.is_server_error() {
            warn!(status = %status, error = %message, "Request failed");
        } else {
            debug!(status = %status, error = %message, "Request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
