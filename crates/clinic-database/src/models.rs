//! 数据库模型

use chrono::{DateTime, Utc};
use clinic_core::{
    ClinicError, InventoryItem, Patient, PaymentStatus, Visit, VisitPriority, VisitStage,
};
use sqlx::FromRow;
use uuid::Uuid;

// 数据库表模型 - 使用FromRow trait用于SQL查询。
// 嵌套列表（体征、化验单、处方、历史）以JSONB列存储。

/// 数据库就诊表
#[derive(Debug, FromRow)]
pub struct DbVisit {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub patient_name: String,
    pub stage: String, // 存储为字符串，转换为VisitStage枚举
    pub stage_start_time: DateTime<Utc>,
    pub queue_number: i32,
    pub priority: String,
    pub vitals: Option<serde_json::Value>,
    pub chief_complaint: Option<String>,
    pub diagnosis: Option<String>,
    pub doctor_notes: Option<String>,
    pub lab_orders: serde_json::Value,
    pub prescription: serde_json::Value,
    pub medications_dispensed: bool,
    pub consultation_fee: i64,
    pub total_bill: i64,
    pub payment_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 阶段枚举与存储字符串的映射
pub fn stage_to_str(stage: VisitStage) -> &'static str {
    match stage {
        VisitStage::Vitals => "VITALS",
        VisitStage::Consultation => "CONSULTATION",
        VisitStage::Lab => "LAB",
        VisitStage::Billing => "BILLING",
        VisitStage::Pharmacy => "PHARMACY",
        VisitStage::Clearance => "CLEARANCE",
        VisitStage::Completed => "COMPLETED",
    }
}

fn stage_from_str(s: &str) -> VisitStage {
    match s {
        "VITALS" => VisitStage::Vitals,
        "CONSULTATION" => VisitStage::Consultation,
        "LAB" => VisitStage::Lab,
        "BILLING" => VisitStage::Billing,
        "PHARMACY" => VisitStage::Pharmacy,
        "CLEARANCE" => VisitStage::Clearance,
        "COMPLETED" => VisitStage::Completed,
        _ => VisitStage::Vitals, // 默认阶段
    }
}

pub fn priority_to_str(priority: VisitPriority) -> &'static str {
    match priority {
        VisitPriority::Normal => "NORMAL",
        VisitPriority::Urgent => "URGENT",
        VisitPriority::Emergency => "EMERGENCY",
    }
}

fn priority_from_str(s: &str) -> VisitPriority {
    match s {
        "URGENT" => VisitPriority::Urgent,
        "EMERGENCY" => VisitPriority::Emergency,
        _ => VisitPriority::Normal,
    }
}

pub fn payment_status_to_str(status: PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Pending => "PENDING",
        PaymentStatus::Paid => "PAID",
    }
}

fn payment_status_from_str(s: &str) -> PaymentStatus {
    match s {
        "PAID" => PaymentStatus::Paid,
        _ => PaymentStatus::Pending,
    }
}

impl TryFrom<DbVisit> for Visit {
    type Error = ClinicError;

    fn try_from(db_visit: DbVisit) -> Result<Self, Self::Error> {
        Ok(Visit {
            id: db_visit.id,
            patient_id: db_visit.patient_id,
            patient_name: db_visit.patient_name,
            stage: stage_from_str(&db_visit.stage),
            stage_start_time: db_visit.stage_start_time,
            queue_number: db_visit.queue_number,
            priority: priority_from_str(&db_visit.priority),
            vitals: db_visit
                .vitals
                .map(serde_json::from_value)
                .transpose()?,
            chief_complaint: db_visit.chief_complaint,
            diagnosis: db_visit.diagnosis,
            doctor_notes: db_visit.doctor_notes,
            lab_orders: serde_json::from_value(db_visit.lab_orders)?,
            prescription: serde_json::from_value(db_visit.prescription)?,
            medications_dispensed: db_visit.medications_dispensed,
            consultation_fee: db_visit.consultation_fee,
            total_bill: db_visit.total_bill,
            payment_status: payment_status_from_str(&db_visit.payment_status),
            created_at: db_visit.created_at,
            updated_at: db_visit.updated_at,
        })
    }
}

/// 数据库患者表
#[derive(Debug, FromRow)]
pub struct DbPatient {
    pub id: Uuid,
    pub patient_number: String,
    pub name: String,
    pub history: serde_json::Value, // 就诊摘要JSON数组，最新在前
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbPatient> for Patient {
    type Error = ClinicError;

    fn try_from(db_patient: DbPatient) -> Result<Self, Self::Error> {
        Ok(Patient {
            id: db_patient.id,
            patient_number: db_patient.patient_number,
            name: db_patient.name,
            history: serde_json::from_value(db_patient.history)?,
            created_at: db_patient.created_at,
            updated_at: db_patient.updated_at,
        })
    }
}

/// 数据库库存表
#[derive(Debug, FromRow)]
pub struct DbInventoryItem {
    pub id: Uuid,
    pub name: String,
    pub stock: i32,
    pub unit_price: i64,
    pub updated_at: DateTime<Utc>,
}

impl From<DbInventoryItem> for InventoryItem {
    fn from(db_item: DbInventoryItem) -> Self {
        InventoryItem {
            id: db_item.id,
            name: db_item.name,
            stock: db_item.stock,
            unit_price: db_item.unit_price,
            updated_at: db_item.updated_at,
        }
    }
}
