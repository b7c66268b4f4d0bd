//! 核心数据模型定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 就诊阶段
///
/// 固定流水线: Vitals → Consultation → {Lab|Billing} → Billing →
/// {Pharmacy|Clearance} → Clearance → Completed。
/// Lab → Consultation 是唯一允许的回退边。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum VisitStage {
    Vitals,       // 体征采集
    Consultation, // 医生问诊
    Lab,          // 化验
    Billing,      // 收费
    Pharmacy,     // 药房发药
    Clearance,    // 离院结算
    Completed,    // 已完成
}

impl VisitStage {
    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, VisitStage::Completed)
    }

    /// 进入收费阶段后不再允许回到问诊前的阶段
    pub fn is_past_billing(&self) -> bool {
        matches!(
            self,
            VisitStage::Billing | VisitStage::Pharmacy | VisitStage::Clearance | VisitStage::Completed
        )
    }
}

/// 就诊优先级
///
/// 仅影响候诊队列的排序展示，不改变阶段转换的合法性。
/// 排序依赖声明顺序: Emergency > Urgent > Normal。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VisitPriority {
    Normal,    // 普通
    Urgent,    // 加急
    Emergency, // 急诊
}

/// 支付状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending, // 待支付
    Paid,    // 已支付
}

/// 化验单状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LabOrderStatus {
    Pending,   // 待出结果
    Completed, // 已出结果
}

/// 体征记录
///
/// 所有字段可选，空记录也是合法的体征记录。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vitals {
    pub blood_pressure: Option<String>, // 血压，如 "120/80"
    pub temperature_celsius: Option<f32>,
    pub weight_kg: Option<f32>,
    pub height_cm: Option<f32>,
    pub heart_rate: Option<i32>,
    pub respiratory_rate: Option<i32>,
    pub spo2: Option<i32>, // 血氧饱和度 (%)
}

/// 化验单条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabOrder {
    pub test_id: Uuid,
    pub test_name: String,
    pub price: i64, // 货币最小单位
    pub status: LabOrderStatus,
    pub result: Option<String>,
}

/// 处方条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescriptionLine {
    pub inventory_id: Uuid, // 关联的库存药品
    pub name: String,
    pub dosage: String,
    pub quantity: i32,
    pub price: i64, // 单价
}

impl PrescriptionLine {
    /// 行小计 = 单价 × 数量
    pub fn line_total(&self) -> i64 {
        self.price * self.quantity as i64
    }
}

/// 就诊记录
///
/// 一次患者的完整就诊过程，从挂号到完成。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visit {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub patient_name: String, // 冗余姓名，用于展示
    pub stage: VisitStage,
    pub stage_start_time: DateTime<Utc>, // 每次阶段变化时重置
    pub queue_number: i32,               // 挂号时分配，终生不变
    pub priority: VisitPriority,
    pub vitals: Option<Vitals>,
    pub chief_complaint: Option<String>, // 主诉
    pub diagnosis: Option<String>,       // 诊断
    pub doctor_notes: Option<String>,    // 医嘱
    pub lab_orders: Vec<LabOrder>,
    pub prescription: Vec<PrescriptionLine>,
    pub medications_dispensed: bool, // 发药只执行一次的幂等保护
    pub consultation_fee: i64,
    pub total_bill: i64, // 进入收费阶段时计算的税前小计
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Visit {
    /// 是否存在待出结果的化验单
    pub fn has_pending_lab_orders(&self) -> bool {
        self.lab_orders
            .iter()
            .any(|order| order.status == LabOrderStatus::Pending)
    }

    /// 是否开具了处方
    pub fn has_prescription(&self) -> bool {
        !self.prescription.is_empty()
    }

    /// 是否已支付
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }
}

/// 患者基本信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub patient_number: String, // 诊所内部患者编号
    pub name: String,
    pub history: Vec<String>, // 就诊摘要，最新在前
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 库存药品
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: Uuid,
    pub name: String,
    pub stock: i32, // 发药时扣减，下限为0
    pub unit_price: i64,
    pub updated_at: DateTime<Utc>,
}
