//! HTTP处理器

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use clinic_core::{ClinicError, PrescriptionLine, Vitals};
use clinic_workflow::{
    AdvanceOutcome, CheckInRequest, ConsultationUpdate, NewLabOrder, VisitEvent, VisitWorkflow,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// 处理器共享状态
pub type AppState = Arc<VisitWorkflow>;

/// 错误到HTTP响应的映射
///
/// ClinicError 是外部crate类型，包一层本地newtype才能实现 IntoResponse。
pub struct ApiError(ClinicError);

impl From<ClinicError> for ApiError {
    fn from(err: ClinicError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            ClinicError::NotFound(_) => StatusCode::NOT_FOUND,
            ClinicError::Validation(_) | ClinicError::InvalidStageTransition { .. } => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": true,
            "message": self.0.to_string(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// API根路径处理器
pub async fn api_root() -> impl IntoResponse {
    Json(json!({
        "service": "Clinic Workflow API",
        "version": "1.0.0",
        "status": "running",
        "endpoints": {
            "health": "/health",
            "api": "/api/v1"
        }
    }))
}

/// 健康检查处理器
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": "1.0.0"
    }))
}

// ========== 患者与库存 ==========

#[derive(Debug, Deserialize)]
pub struct RegisterPatientRequest {
    pub patient_number: String,
    pub name: String,
}

/// 登记新患者
pub async fn register_patient(
    State(workflow): State<AppState>,
    Json(request): Json<RegisterPatientRequest>,
) -> ApiResult<impl IntoResponse> {
    info!("Registering patient {}", request.patient_number);
    let patient = workflow
        .register_patient(&request.patient_number, &request.name)
        .await?;
    Ok((StatusCode::CREATED, Json(patient)))
}

/// 查询患者就诊历史（最新在前）
pub async fn get_patient_history(
    State(workflow): State<AppState>,
    Path(patient_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let history = workflow.patient_history(patient_id).await?;
    Ok(Json(json!({ "patient_id": patient_id, "history": history })))
}

#[derive(Debug, Deserialize)]
pub struct AddInventoryRequest {
    pub name: String,
    pub stock: i32,
    pub unit_price: i64,
}

/// 录入库存药品
pub async fn add_inventory_item(
    State(workflow): State<AppState>,
    Json(request): Json<AddInventoryRequest>,
) -> ApiResult<impl IntoResponse> {
    let item = workflow
        .add_inventory_item(&request.name, request.stock, request.unit_price)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

// ========== 挂号与队列 ==========

/// 办理挂号
pub async fn check_in(
    State(workflow): State<AppState>,
    Json(request): Json<CheckInRequest>,
) -> ApiResult<impl IntoResponse> {
    info!("Check-in for patient {}", request.patient_name);
    let visit = workflow.check_in(request).await?;
    Ok((StatusCode::CREATED, Json(visit)))
}

/// 候诊队列快照
pub async fn get_queue(State(workflow): State<AppState>) -> ApiResult<impl IntoResponse> {
    let queue = workflow.queue().await?;
    Ok(Json(json!({ "total": queue.len(), "queue": queue })))
}

/// 查询就诊记录
pub async fn get_visit(
    State(workflow): State<AppState>,
    Path(visit_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let visit = workflow.get_visit(visit_id).await?;
    Ok(Json(visit))
}

// ========== 阶段数据录入 ==========

/// 记录体征
pub async fn record_vitals(
    State(workflow): State<AppState>,
    Path(visit_id): Path<Uuid>,
    Json(vitals): Json<Vitals>,
) -> ApiResult<impl IntoResponse> {
    let visit = workflow.record_vitals(visit_id, vitals).await?;
    Ok(Json(visit))
}

/// 录入问诊数据
pub async fn record_consultation(
    State(workflow): State<AppState>,
    Path(visit_id): Path<Uuid>,
    Json(update): Json<ConsultationUpdate>,
) -> ApiResult<impl IntoResponse> {
    let visit = workflow.record_consultation(visit_id, update).await?;
    Ok(Json(visit))
}

/// 开具化验单
pub async fn order_lab_tests(
    State(workflow): State<AppState>,
    Path(visit_id): Path<Uuid>,
    Json(orders): Json<Vec<NewLabOrder>>,
) -> ApiResult<impl IntoResponse> {
    let visit = workflow.order_lab_tests(visit_id, orders).await?;
    Ok(Json(visit))
}

#[derive(Debug, Deserialize)]
pub struct LabResultRequest {
    pub result: String,
}

/// 录入化验结果
pub async fn enter_lab_result(
    State(workflow): State<AppState>,
    Path((visit_id, test_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<LabResultRequest>,
) -> ApiResult<impl IntoResponse> {
    let visit = workflow
        .enter_lab_result(visit_id, test_id, &request.result)
        .await?;
    Ok(Json(visit))
}

/// 开具处方
pub async fn prescribe(
    State(workflow): State<AppState>,
    Path(visit_id): Path<Uuid>,
    Json(lines): Json<Vec<PrescriptionLine>>,
) -> ApiResult<impl IntoResponse> {
    let visit = workflow.prescribe(visit_id, lines).await?;
    Ok(Json(visit))
}

/// 标记已支付（外部支付回调与人工补录共用）
pub async fn mark_paid(
    State(workflow): State<AppState>,
    Path(visit_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let visit = workflow.mark_paid(visit_id).await?;
    Ok(Json(visit))
}

/// 查询账单明细
pub async fn get_bill(
    State(workflow): State<AppState>,
    Path(visit_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let summary = workflow.bill_summary(visit_id).await?;
    Ok(Json(summary))
}

// ========== 阶段推进 ==========

#[derive(Debug, Deserialize)]
pub struct AdvanceRequest {
    pub event: VisitEvent,
}

/// 推进就诊阶段
pub async fn advance(
    State(workflow): State<AppState>,
    Path(visit_id): Path<Uuid>,
    Json(request): Json<AdvanceRequest>,
) -> ApiResult<impl IntoResponse> {
    let outcome = workflow.advance(visit_id, request.event).await?;
    let body = match outcome {
        AdvanceOutcome::Advanced(visit) => json!({
            "outcome": "advanced",
            "visit": visit
        }),
        AdvanceOutcome::Rejected { visit, reason } => json!({
            "outcome": "rejected",
            "reason": reason,
            "visit": visit
        }),
    };
    Ok(Json(body))
}
