use axum::http::{HeaderValue, Method};
use log::*;
use service::AppState;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};

mod controller;
pub mod error;
pub mod extractors;
pub mod router;
mod sse;

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let listen_addr = format!(
        "{}:{}",
        app_state.config.interface(),
        app_state.config.port
    );

    info!("Server starting... listening for connections on http://{listen_addr}");
    warn!(
        "Trusting the {} header as the authenticated user; it must be stripped from client requests by the fronting proxy",
        app_state.config.principal_header()
    );

    let allowed_origins: Vec<HeaderValue> = app_state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin {origin}: {e}");
                None
            }
        })
        .collect();

    let cors_layer = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_credentials(true)
        .allow_origin(AllowOrigin::list(allowed_origins));

    let listener = TcpListener::bind(listen_addr).await?;
    axum::serve(listener, router::define_routes(app_state).layer(cors_layer)).await
}
