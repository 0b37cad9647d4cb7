use axum::{
    extract::{DefaultBodyLimit, Request},
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::Pizzeria;

mod http;
pub use http::ApiError;

pub struct Api {
    pizzeria: Arc<Pizzeria>,
}

impl Api {
    pub fn new(pizzeria: Arc<Pizzeria>) -> Self {
        Self { pizzeria }
    }

    pub fn router(&self) -> Router {
        // The game client is served from another origin, so browser requests
        // must pass CORS. ALLOWED_HTTP_ORIGINS narrows the default allow-all.
        let allowed_origins = parse_allowed_origins("ALLOWED_HTTP_ORIGINS");
        let cors = if allowed_origins.is_empty() || allowed_origins.iter().any(|o| o == "*") {
            CorsLayer::new().allow_origin(AllowOrigin::any())
        } else {
            let origins = allowed_origins
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!("Invalid origin in ALLOWED_HTTP_ORIGINS: {}", origin);
                        None
                    }
                })
                .collect::<Vec<_>>();
            CorsLayer::new().allow_origin(AllowOrigin::list(origins))
        }
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-request-id"),
        ])
        .expose_headers([header::HeaderName::from_static("x-request-id")]);

        let router = Router::new()
            .route("/api/user", post(http::create_or_get_user))
            .route("/api/user/:user_id", get(http::get_user))
            .route("/api/game/finish", post(http::finish_game))
            .route("/api/health", get(http::health))
            .route("/healthz", get(http::healthz))
            .route("/metrics/http", get(http::http_metrics))
            .route("/metrics/store", get(http::store_metrics));

        let router = router.layer(cors);
        let router = match self.pizzeria.config.http_body_limit_bytes {
            Some(limit) if limit > 0 => router.layer(DefaultBodyLimit::max(limit)),
            _ => router,
        };
        let router = router.layer(middleware::from_fn(request_id_middleware));
        let router = router.layer(TraceLayer::new_for_http());

        router.with_state(self.pizzeria.clone())
    }
}

fn parse_allowed_origins(var: &str) -> Vec<String> {
    std::env::var(var)
        .unwrap_or_default()
        .split(',')
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

async fn request_id_middleware(req: Request, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(header::HeaderName::from_static("x-request-id"))
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();
    let mut response = next.run(req).await;
    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(
            header::HeaderName::from_static("x-request-id"),
            header_value,
        );
    }
    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "http.request"
    );
    response
}
