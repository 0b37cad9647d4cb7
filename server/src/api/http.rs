use axum::{
    extract::State as AxumState,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use pizzeria_types::{Player, Reward};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::store::StoreError;
use crate::Pizzeria;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("Usuário não encontrado")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InvalidRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Internal(err) => {
                // Raw internals stay in the logs, never in the response.
                tracing::error!(error = %err, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Erro interno".to_string())
            }
        };
        (
            status,
            Json(ErrorResponse {
                success: false,
                message,
            }),
        )
            .into_response()
    }
}

/// An absent `username` is stored as an empty string: the record keeps the
/// field non-optional, so clients that omitted it see `""` where the legacy
/// backend returned `null`.
#[derive(Deserialize)]
pub(super) struct CreateUserRequest {
    id: Option<String>,
    username: Option<String>,
    email: Option<String>,
}

#[derive(Deserialize)]
pub(super) struct FinishGameRequest {
    user_id: Option<String>,
    #[serde(flatten)]
    reward: Reward,
}

#[derive(Serialize)]
struct PlayerResponse {
    success: bool,
    data: Player,
}

#[derive(Serialize)]
struct FinishGameResponse {
    success: bool,
    data: Player,
    level_up: bool,
}

#[derive(Serialize)]
struct HealthResponse {
    success: bool,
    message: &'static str,
}

/// Simple liveness response for load balancer probes.
#[derive(Serialize)]
struct HealthzResponse {
    ok: bool,
}

fn required_id(value: Option<String>) -> Result<String, ApiError> {
    match value {
        Some(id) if !id.trim().is_empty() => Ok(id),
        _ => Err(ApiError::InvalidRequest(
            "ID do usuário é obrigatório".to_string(),
        )),
    }
}

/// POST /api/user - idempotent get-or-create for a player.
pub(super) async fn create_or_get_user(
    AxumState(pizzeria): AxumState<Arc<Pizzeria>>,
    Json(body): Json<CreateUserRequest>,
) -> Response {
    let start = Instant::now();
    let response = match required_id(body.id) {
        Ok(user_id) => {
            let player = pizzeria
                .get_or_create_player(user_id, body.username.unwrap_or_default(), body.email)
                .await;
            Json(PlayerResponse {
                success: true,
                data: player,
            })
            .into_response()
        }
        Err(err) => err.into_response(),
    };

    pizzeria.http_metrics().record_get_or_create(start.elapsed());
    response
}

/// POST /api/game/finish - apply a session reward and resolve level-ups.
pub(super) async fn finish_game(
    AxumState(pizzeria): AxumState<Arc<Pizzeria>>,
    Json(body): Json<FinishGameRequest>,
) -> Response {
    let start = Instant::now();
    let response = match required_id(body.user_id) {
        Ok(user_id) => match pizzeria.finish_game(&user_id, body.reward).await {
            Ok((player, level_up)) => Json(FinishGameResponse {
                success: true,
                data: player,
                level_up,
            })
            .into_response(),
            Err(err) => ApiError::from(err).into_response(),
        },
        Err(err) => err.into_response(),
    };

    pizzeria.http_metrics().record_finish_game(start.elapsed());
    response
}

/// GET /api/user/:user_id - fetch a player record.
pub(super) async fn get_user(
    AxumState(pizzeria): AxumState<Arc<Pizzeria>>,
    axum::extract::Path(user_id): axum::extract::Path<String>,
) -> Response {
    let start = Instant::now();
    let response = match pizzeria.fetch_player(&user_id).await {
        Some(player) => Json(PlayerResponse {
            success: true,
            data: player,
        })
        .into_response(),
        None => ApiError::NotFound.into_response(),
    };

    pizzeria.http_metrics().record_fetch_player(start.elapsed());
    response
}

/// GET /api/health - always succeeds, no side effects.
pub(super) async fn health() -> Response {
    Json(HealthResponse {
        success: true,
        message: "Pizza Master Tycoon API funcionando!",
    })
    .into_response()
}

/// GET /healthz - bare liveness probe.
pub(super) async fn healthz() -> Response {
    Json(HealthzResponse { ok: true }).into_response()
}

pub(super) async fn http_metrics(
    headers: HeaderMap,
    AxumState(pizzeria): AxumState<Arc<Pizzeria>>,
) -> Response {
    if let Some(status) = metrics_auth_error(&headers) {
        return status.into_response();
    }
    Json(pizzeria.http_metrics_snapshot()).into_response()
}

pub(super) async fn store_metrics(
    headers: HeaderMap,
    AxumState(pizzeria): AxumState<Arc<Pizzeria>>,
) -> Response {
    if let Some(status) = metrics_auth_error(&headers) {
        return status.into_response();
    }
    Json(pizzeria.store_metrics_snapshot()).into_response()
}

fn metrics_auth_error(headers: &HeaderMap) -> Option<StatusCode> {
    let token = std::env::var("METRICS_AUTH_TOKEN").unwrap_or_default();
    if token.is_empty() {
        return None;
    }
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);
    let header_token = headers
        .get("x-metrics-token")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    if bearer.as_deref() == Some(token.as_str()) || header_token.as_deref() == Some(token.as_str())
    {
        None
    } else {
        Some(StatusCode::UNAUTHORIZED)
    }
}
