//! Web服务器

use axum::{
    routing::{get, post, put},
    Router,
};
use clinic_core::{ClinicError, Result};
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::handlers::{
    add_inventory_item, advance, api_root, check_in, enter_lab_result, get_bill,
    get_patient_history, get_queue, get_visit, health, mark_paid, order_lab_tests, prescribe,
    record_consultation, record_vitals, register_patient, AppState,
};

pub struct WebServer {
    addr: SocketAddr,
    app: Router,
}

impl WebServer {
    pub fn new(addr: SocketAddr, state: AppState) -> Self {
        let app = Self::create_app(state);
        Self { addr, app }
    }

    fn create_app(state: AppState) -> Router {
        Router::new()
            // 根路径
            .route("/", get(api_root))
            // 健康检查
            .route("/health", get(health))
            // API路由
            .nest("/api/v1", api_routes())
            .with_state(state)
            // 全局中间件
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(
                        CorsLayer::new()
                            .allow_origin(Any)
                            .allow_methods(Any)
                            .allow_headers(Any),
                    ),
            )
    }

    pub async fn run(self) -> Result<()> {
        info!("Starting web server on {}", self.addr);

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        axum::serve(listener, self.app)
            .await
            .map_err(|e| ClinicError::Internal(format!("Failed to start web server: {}", e)))?;

        Ok(())
    }
}

/// API v1 路由
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(api_root))
        .route("/patients", post(register_patient))
        .route("/patients/:patient_id/history", get(get_patient_history))
        .route("/inventory", post(add_inventory_item))
        .route("/visits", post(check_in))
        .route("/visits/queue", get(get_queue))
        .route("/visits/:visit_id", get(get_visit))
        .route("/visits/:visit_id/vitals", put(record_vitals))
        .route("/visits/:visit_id/consultation", put(record_consultation))
        .route("/visits/:visit_id/lab-orders", post(order_lab_tests))
        .route(
            "/visits/:visit_id/lab-orders/:test_id/result",
            put(enter_lab_result),
        )
        .route("/visits/:visit_id/prescription", post(prescribe))
        .route("/visits/:visit_id/payment", post(mark_paid))
        .route("/visits/:visit_id/bill", get(get_bill))
        .route("/visits/:visit_id/advance", post(advance))
}
