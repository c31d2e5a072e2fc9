//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use tracing::{error, warn};

use crate::domain::{DomainError, LocoNumber, PositionRecord, portal_time};
use crate::portal::PortalError;
use crate::tracker::QueryOutcome;

use super::auth::require_basic_auth;
use super::dto::*;
use super::state::AppState;

/// Create the application router.
///
/// Query routes sit behind basic authentication; `/health` does not.
pub fn create_router(state: AppState) -> Router {
    let queries = Router::new()
        .route("/loco/:number", get(get_locomotive))
        .route("/loco/:number/refresh", post(refresh_locomotive))
        .route("/train/:number", get(get_train))
        .route("/fleet", post(refresh_fleet))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_basic_auth,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(queries)
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Position of one locomotive, subject to the single-query cooldown.
async fn get_locomotive(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<PositionRecord>, AppError> {
    locomotive(&state, &number, false).await
}

/// Position of one locomotive, bypassing the cooldown.
async fn refresh_locomotive(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<PositionRecord>, AppError> {
    locomotive(&state, &number, true).await
}

async fn locomotive(
    state: &AppState,
    number: &str,
    bypass: bool,
) -> Result<Json<PositionRecord>, AppError> {
    let loco = LocoNumber::parse(number)?;
    let record = ready(state.tracker.locomotive(&loco, bypass).await?)?;
    Ok(Json(record))
}

/// Route of one train.
async fn get_train(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<TrainResponse>, AppError> {
    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::BadRequest {
            message: format!("Invalid train number: {number}"),
        });
    }

    let route = ready(state.tracker.train(&number, false).await?)?;
    Ok(Json(route.into()))
}

/// Refresh every listed locomotive, subject to the bulk cooldown.
async fn refresh_fleet(
    State(state): State<AppState>,
    Json(req): Json<FleetRequest>,
) -> Result<Json<FleetResponse>, AppError> {
    let fleet = req
        .numbers
        .iter()
        .map(|n| LocoNumber::parse(n))
        .collect::<Result<Vec<_>, _>>()?;

    let records = ready(state.tracker.fleet(&fleet, false).await?)?;
    Ok(Json(FleetResponse::new(records, portal_time(Utc::now()))))
}

/// Turn a cooldown denial into a 429.
fn ready<T>(outcome: QueryOutcome<T>) -> Result<T, AppError> {
    let retry_after_secs = outcome.retry_after_secs();
    outcome
        .ready()
        .ok_or(AppError::TooManyRequests {
            retry_after_secs: retry_after_secs.unwrap_or_default(),
        })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    Unauthorized,
    BadRequest { message: String },
    TooManyRequests { retry_after_secs: u64 },
    Portal(PortalError),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<PortalError> for AppError {
    fn from(e: PortalError) -> Self {
        AppError::Portal(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message, retry_after_secs) = match self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
                None,
            ),
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message, None),
            AppError::TooManyRequests { retry_after_secs } => (
                StatusCode::TOO_MANY_REQUESTS,
                format!("Too many requests, try again after: {retry_after_secs} seconds"),
                Some(retry_after_secs),
            ),
            AppError::Portal(e) => {
                let status = match &e {
                    PortalError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                    PortalError::WorkerStopped => StatusCode::SERVICE_UNAVAILABLE,
                    _ => StatusCode::BAD_GATEWAY,
                };
                error!(%status, error = %e, "portal query failed");
                (status, e.to_string(), None)
            }
        };

        if status.is_client_error() {
            warn!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse {
            error: message,
            retry_after_secs,
        });
        if status == StatusCode::UNAUTHORIZED {
            let challenge = [(header::WWW_AUTHENTICATE, r#"Basic realm="isor""#)];
            return (status, challenge, body).into_response();
        }
        (status, body).into_response()
    }
}
