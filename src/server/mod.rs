//! HTTP front end.
//!
//! [`build_router`] is shared by the binary and the integration tests so
//! both exercise the same middleware stack.
//!
//! | Method | Path                         | Handler                  |
//! |--------|------------------------------|--------------------------|
//! | GET    | `/`                          | [`handlers::index`]      |
//! | POST   | `/api/upload`                | [`handlers::upload`]     |
//! | GET    | `/api/status/{upload_id}`    | [`handlers::status`]     |
//! | GET    | `/api/result/{upload_id}`    | [`handlers::result`]     |
//! | GET    | `/api/download/{upload_id}`  | [`handlers::download`]   |
//! | GET    | `/api/health`                | [`handlers::health`]     |

pub mod handlers;
mod response;

use crate::service::ConversionService;
use axum::extract::DefaultBodyLimit;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use std::time::Duration;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, warn, Level};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: ConversionService,
}

/// Build the full application [`Router`] with all middleware layers.
///
/// The middleware stack is applied bottom-up:
///
/// 1. CORS
/// 2. Set request ID on incoming requests
/// 3. Structured request/response tracing
/// 4. Propagate request ID to response
/// 5. Request timeout
/// 6. Panic recovery (catch panics, return 500)
/// 7. Request body limit (enforced by the multipart extractor)
pub fn build_router(service: ConversionService) -> Router {
    let config = service.config();
    let cors = build_cors_layer(&config.cors_origins);
    let timeout = Duration::from_secs(config.request_timeout_secs);
    let body_limit = config.max_upload_bytes;
    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .route("/", get(handlers::index))
        .route("/api/upload", post(handlers::upload))
        .route("/api/status/{upload_id}", get(handlers::status))
        .route("/api/result/{upload_id}", get(handlers::result))
        .route("/api/download/{upload_id}", get(handlers::download))
        .route("/api/health", get(handlers::health))
        // -- Middleware stack (applied bottom-up) --
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(AppState { service })
}

/// Build the CORS layer. An empty origin list allows any origin; origins
/// that are not valid header values are skipped with a warning.
pub fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    if origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();
    cors.allow_origin(parsed)
}

/// Bind the configured address and serve until Ctrl-C or SIGTERM.
///
/// In-flight jobs are not awaited on shutdown.
pub async fn serve(service: ConversionService) -> std::io::Result<()> {
    let addr = service.config().bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, build_router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT (Ctrl-C), starting graceful shutdown"),
        () = terminate => info!("Received SIGTERM, starting graceful shutdown"),
    }
}
