use log::*;
use service::{config::Config, logging::Logger, AppState};

#[tokio::main]
async fn main() {
    let config = Config::new();

    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to start logger: {e}");
    }

    info!(
        "Starting push router ({} environment)",
        config.runtime_env()
    );

    let app_state = AppState::init(config).await;

    if let Err(e) = web::init_server(app_state).await {
        error!("Push router stopped: {e}");
        std::process::exit(1);
    }
}
