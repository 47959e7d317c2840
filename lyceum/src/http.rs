use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderName, HeaderValue, Method,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::api::middleware::authorization::CAMPUS_HEADER;
use crate::{api::router::ApiRoutes, app_state::SharedAppState};

fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() || origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins.iter().filter_map(|origin| {
            origin
                .parse::<HeaderValue>()
                .inspect_err(|_| warn!("Ignoring invalid CORS origin '{}'", origin))
                .ok()
        }))
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            AUTHORIZATION,
            ACCEPT,
            CONTENT_TYPE,
            HeaderName::from_static(CAMPUS_HEADER),
        ])
}

pub async fn setup_http_server(
    app_state: SharedAppState,
    bind_address: &str,
) -> anyhow::Result<tokio::task::JoinHandle<anyhow::Result<()>>> {
    let app = ApiRoutes::create(app_state.clone())
        .layer(build_cors_layer(&app_state.settings.api.cors_origins))
        .layer(TraceLayer::new_for_http());

    info!("API server starting at {}", bind_address);
    let listener = tokio::net::TcpListener::bind(bind_address).await?;

    let stop_flag = app_state.stop_flag.clone();
    let handle = tokio::spawn(async move {
        info!("Starting HTTP server");
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                stop_flag.wait().await;
                info!("Stop flag was set, shutting down HTTP server gracefully");
            })
            .await?;
        info!("HTTP server is down");
        Ok(())
    });

    Ok(handle)
}
