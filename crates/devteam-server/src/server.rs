//! Axum setup and router configuration

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::encoding;
use crate::routes;
use crate::state::AppState;

/// Create the Axum router with all routes
pub fn create_router(state: AppState, timeout_secs: u64) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(timeout_secs)))
        .layer(middleware::from_fn(encoding::force_utf8_charset));

    Router::new()
        // Health
        .route("/health", get(routes::health))
        // Specifications
        .route("/specifications", post(routes::submit_specification))
        .route("/specifications/waiting", get(routes::waiting_specifications))
        .route("/specifications/{id}", get(routes::get_specification))
        .route(
            "/specifications/{id}/status",
            put(routes::set_specification_status),
        )
        .route("/specifications/{id}/jobs", get(routes::specification_jobs))
        // Users
        .route("/users/{id}/specifications", get(routes::user_specifications))
        .with_state(state)
        .layer(middleware)
}

/// Run the server until a shutdown signal arrives
pub async fn serve(state: AppState, addr: SocketAddr, timeout_secs: u64) -> anyhow::Result<()> {
    let app = create_router(state, timeout_secs);

    let listener = TcpListener::bind(addr).await?;
    info!("listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use devteam_connection::{ConnectionFactory, ConnectionPool, PoolConfig};
    use devteam_core::{
        Connection, DevteamError, QueryResult, Result, Row, StatementResult, Value,
    };
    use devteam_db::Database;
    use parking_lot::Mutex;
    use tower::ServiceExt;

    struct ScriptedConnection {
        scripted: Mutex<Vec<(&'static str, QueryResult)>>,
        executed: Mutex<Vec<(String, Vec<Value>)>>,
    }

    impl ScriptedConnection {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                scripted: Mutex::new(Vec::new()),
                executed: Mutex::new(Vec::new()),
            })
        }

        fn script(&self, fragment: &'static str, result: QueryResult) {
            self.scripted.lock().push((fragment, result));
        }
    }

    #[async_trait]
    impl Connection for ScriptedConnection {
        fn driver_name(&self) -> &str {
            "scripted"
        }

        async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult> {
            self.executed.lock().push((sql.to_string(), params.to_vec()));
            Ok(StatementResult::new(1))
        }

        async fn query(&self, sql: &str, _params: &[Value]) -> Result<QueryResult> {
            let mut scripted = self.scripted.lock();
            let position = scripted.iter().position(|(fragment, _)| sql.contains(fragment));
            match position {
                Some(idx) => Ok(scripted.remove(idx).1),
                None => Err(DevteamError::Query(format!("unscripted query: {}", sql))),
            }
        }

        async fn close(&self) -> Result<()> {
            Ok(())
        }

        fn is_closed(&self) -> bool {
            false
        }
    }

    struct ScriptedFactory(Arc<ScriptedConnection>);

    #[async_trait]
    impl ConnectionFactory for ScriptedFactory {
        async fn open(&self) -> Result<Arc<dyn Connection>> {
            Ok(self.0.clone())
        }
    }

    fn app(conn: &Arc<ScriptedConnection>) -> Router {
        let pool = ConnectionPool::new(PoolConfig::new(0, 2), ScriptedFactory(conn.clone()));
        let state = AppState::new(Database::new(Arc::new(pool)));
        create_router(state, 30)
    }

    fn rows(columns: &[&str], data: Vec<Vec<Value>>) -> QueryResult {
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let rows = data
            .into_iter()
            .map(|values| Row::new(columns.clone(), values))
            .collect();
        QueryResult::new(columns, rows)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok_with_pool_stats() {
        let conn = ScriptedConnection::new();
        conn.script("SELECT 1", rows(&["?column?"], vec![vec![Value::Int32(1)]]));

        let response = app(&conn)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["pool"]["total"], 1);
        assert_eq!(body["pool"]["active"], 0);
    }

    #[tokio::test]
    async fn submit_returns_created_with_the_new_id() {
        let conn = ScriptedConnection::new();
        conn.script(
            "SELECT MAX(id)",
            rows(&["id"], vec![vec![Value::Int32(7)]]),
        );

        let response = app(&conn)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/specifications")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"user_id": 3, "name": "site redesign"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["id"], 7);

        let executed = conn.executed.lock().clone();
        assert_eq!(executed.len(), 1);
        assert!(executed[0].0.starts_with("INSERT INTO specifications"));
    }

    #[tokio::test]
    async fn submit_rejects_a_blank_name() {
        let conn = ScriptedConnection::new();

        let response = app(&conn)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/specifications")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"user_id": 3, "name": "   "}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(conn.executed.lock().is_empty());
    }

    #[tokio::test]
    async fn get_specification_combines_name_status_and_author() {
        let conn = ScriptedConnection::new();
        conn.script(
            "SELECT name FROM specifications",
            rows(&["name"], vec![vec![Value::String("site redesign".into())]]),
        );
        conn.script(
            "SELECT status FROM specifications",
            rows(&["status"], vec![vec![Value::String("active".into())]]),
        );
        conn.script(
            "SELECT user_id FROM specifications",
            rows(&["user_id"], vec![vec![Value::Int32(3)]]),
        );

        let response = app(&conn)
            .oneshot(
                Request::builder()
                    .uri("/specifications/5")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["id"], 5);
        assert_eq!(body["name"], "site redesign");
        assert_eq!(body["status"], "active");
        assert_eq!(body["author_id"], 3);
    }

    #[tokio::test]
    async fn missing_specification_maps_to_not_found() {
        let conn = ScriptedConnection::new();
        conn.script("SELECT name FROM specifications", rows(&["name"], vec![]));

        let response = app(&conn)
            .oneshot(
                Request::builder()
                    .uri("/specifications/99")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn status_update_returns_no_content() {
        let conn = ScriptedConnection::new();

        let response = app(&conn)
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/specifications/5/status")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"status": "done"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let executed = conn.executed.lock().clone();
        assert_eq!(executed.len(), 1);
        assert_eq!(
            executed[0].1,
            vec![Value::String("done".into()), Value::Int32(5)]
        );
    }

    #[tokio::test]
    async fn json_responses_carry_a_utf8_charset() {
        let conn = ScriptedConnection::new();
        conn.script("SELECT name FROM specifications", rows(&["name"], vec![]));

        let response = app(&conn)
            .oneshot(
                Request::builder()
                    .uri("/specifications/99")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(content_type.contains("charset=utf-8"));
    }

    #[tokio::test]
    async fn waiting_queue_lists_specifications_with_mail() {
        let conn = ScriptedConnection::new();
        conn.script(
            "INNER JOIN users",
            rows(
                &["id", "user_id", "name", "status", "mail"],
                vec![vec![
                    Value::Int32(4),
                    Value::Int32(3),
                    Value::String("site redesign".into()),
                    Value::String("waiting".into()),
                    Value::String("customer@example.com".into()),
                ]],
            ),
        );
        conn.script(
            "SELECT COUNT(*)",
            rows(&["count"], vec![vec![Value::Int64(2)]]),
        );

        let response = app(&conn)
            .oneshot(
                Request::builder()
                    .uri("/specifications/waiting")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body[0]["id"], 4);
        assert_eq!(body[0]["jobs"], 2);
        assert_eq!(body[0]["customer_mail"], "customer@example.com");
    }
}
