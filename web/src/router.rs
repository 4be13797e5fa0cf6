use crate::{controller::health_check_controller, sse};
use axum::{routing::get, Router};
use service::AppState;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(sse_routes(app_state))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn sse_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/sse", get(sse::handler::sse_handler))
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use clap::Parser;
    use service::config::Config;
    use tower::ServiceExt;

    async fn test_state() -> AppState {
        AppState::init(Config::parse_from(["push_router"])).await
    }

    fn sse_request(user: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/sse");
        if let Some(user) = user {
            builder = builder.header("x-forwarded-user", user);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health_check_responds_ok() {
        let router = define_routes(test_state().await);

        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_sse_registers_user_until_stream_is_dropped() {
        let app_state = test_state().await;
        let router = define_routes(app_state.clone());

        let response = router.oneshot(sse_request(Some("alice"))).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/event-stream"
        );
        assert!(app_state.registry.get("alice").is_some());

        drop(response);

        assert!(app_state.registry.get("alice").is_none());
        assert_eq!(app_state.registry.size(), 0);
    }

    #[tokio::test]
    async fn test_sse_anonymous_client_is_keyed_by_connection_id() {
        let app_state = test_state().await;
        let router = define_routes(app_state.clone());

        let response = router.oneshot(sse_request(None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(app_state.registry.size(), 1);
        assert!(app_state.registry.get("alice").is_none());
    }

    #[tokio::test]
    async fn test_sse_reconnect_survives_old_stream_closing() {
        let app_state = test_state().await;

        let first = define_routes(app_state.clone())
            .oneshot(sse_request(Some("alice")))
            .await
            .unwrap();
        let second = define_routes(app_state.clone())
            .oneshot(sse_request(Some("alice")))
            .await
            .unwrap();
        assert_eq!(app_state.registry.size(), 1);

        drop(first);
        assert!(app_state.registry.get("alice").is_some());

        drop(second);
        assert!(app_state.registry.get("alice").is_none());
    }
}
