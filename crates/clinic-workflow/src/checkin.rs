//! 挂号台
//!
//! 负责挂号时的队列号与优先级分配，以及候诊队列的展示排序

use chrono::Utc;
use clinic_core::{PaymentStatus, Visit, VisitPriority, VisitStage};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI32, Ordering};
use uuid::Uuid;

/// 挂号请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInRequest {
    pub patient_id: Uuid,
    pub patient_name: String,
    pub priority: VisitPriority,
    /// 跳过体征采集，直接进入问诊
    #[serde(default)]
    pub skip_vitals: bool,
    pub chief_complaint: Option<String>,
    /// 诊查费，挂号时确定
    pub consultation_fee: i64,
}

/// 挂号台
///
/// 队列号单调递增，挂号后终生不变，阶段变化不重新分配。
#[derive(Debug)]
pub struct CheckInDesk {
    next_queue_number: AtomicI32,
}

impl CheckInDesk {
    /// 创建新的挂号台，队列号从1开始
    pub fn new() -> Self {
        Self::starting_from(1)
    }

    /// 从指定队列号继续分配（服务重启后恢复计数用）
    pub fn starting_from(next: i32) -> Self {
        Self {
            next_queue_number: AtomicI32::new(next),
        }
    }

    /// 办理挂号，生成一条新的就诊记录
    pub fn check_in(&self, request: CheckInRequest) -> Visit {
        let now = Utc::now();
        let queue_number = self.next_queue_number.fetch_add(1, Ordering::SeqCst);
        let stage = if request.skip_vitals {
            VisitStage::Consultation
        } else {
            VisitStage::Vitals
        };

        tracing::info!(
            "Checked in patient {} with queue number {} at stage {:?}",
            request.patient_name,
            queue_number,
            stage
        );

        Visit {
            id: Uuid::new_v4(),
            patient_id: request.patient_id,
            patient_name: request.patient_name,
            stage,
            stage_start_time: now,
            queue_number,
            priority: request.priority,
            vitals: None,
            chief_complaint: request.chief_complaint,
            diagnosis: None,
            doctor_notes: None,
            lab_orders: Vec::new(),
            prescription: Vec::new(),
            medications_dispensed: false,
            consultation_fee: request.consultation_fee,
            total_bill: 0,
            payment_status: PaymentStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Default for CheckInDesk {
    fn default() -> Self {
        Self::new()
    }
}

/// 候诊队列排序：优先级高的在前，同级按队列号先来先到
pub fn order_queue(mut visits: Vec<Visit>) -> Vec<Visit> {
    visits.sort_by(|a, b| match b.priority.cmp(&a.priority) {
        std::cmp::Ordering::Equal => a.queue_number.cmp(&b.queue_number),
        other => other,
    });
    visits
}
