//! 就诊阶段状态机
//!
//! 管理一次就诊从挂号到完成的阶段转换合法性

use clinic_core::{ClinicError, Result, Visit, VisitStage};
use serde::{Deserialize, Serialize};

/// 阶段转换事件
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum VisitEvent {
    VitalsRecorded,       // 体征采集完成
    ConsultationFinished, // 问诊结束
    LabResultsEntered,    // 化验结果已录入，回到问诊
    PaymentConfirmed,     // 收费确认
    MedicationsDispensed, // 发药完成
    Cleared,              // 离院结算
}

/// 就诊阶段状态机
///
/// 转换函数对封闭枚举做穷尽匹配，非法阶段在编译期不可表示。
/// 分支目标由就诊记录内容决定：问诊结束时若有待出结果的化验单则进化验，
/// 否则直接收费；收费确认后若开具了处方则进药房，否则直接离院结算。
#[derive(Debug, Default)]
pub struct VisitStateMachine;

impl VisitStateMachine {
    /// 创建新的状态机实例
    pub fn new() -> Self {
        Self
    }

    /// 执行状态转换，返回目标阶段
    ///
    /// 不修改就诊记录本身，副作用由工作流引擎统一应用。
    pub fn transition(&self, visit: &Visit, event: &VisitEvent) -> Result<VisitStage> {
        match (visit.stage, event) {
            (VisitStage::Vitals, VisitEvent::VitalsRecorded) => Ok(VisitStage::Consultation),
            (VisitStage::Consultation, VisitEvent::ConsultationFinished) => {
                if visit.has_pending_lab_orders() {
                    Ok(VisitStage::Lab)
                } else {
                    Ok(VisitStage::Billing)
                }
            }
            // 唯一允许的回退边：化验结果返回医生问诊
            (VisitStage::Lab, VisitEvent::LabResultsEntered) => Ok(VisitStage::Consultation),
            (VisitStage::Billing, VisitEvent::PaymentConfirmed) => {
                if visit.has_prescription() {
                    Ok(VisitStage::Pharmacy)
                } else {
                    Ok(VisitStage::Clearance)
                }
            }
            (VisitStage::Pharmacy, VisitEvent::MedicationsDispensed) => Ok(VisitStage::Clearance),
            (VisitStage::Clearance, VisitEvent::Cleared) => Ok(VisitStage::Completed),
            (from, event) => Err(ClinicError::InvalidStageTransition {
                from: format!("{:?}", from),
                event: format!("{:?}", event),
            }),
        }
    }

    /// 检查状态转换是否有效
    pub fn can_transition(&self, visit: &Visit, event: &VisitEvent) -> bool {
        self.transition(visit, event).is_ok()
    }

    /// 获取所有可能的阶段
    pub fn get_all_stages() -> Vec<VisitStage> {
        vec![
            VisitStage::Vitals,
            VisitStage::Consultation,
            VisitStage::Lab,
            VisitStage::Billing,
            VisitStage::Pharmacy,
            VisitStage::Clearance,
            VisitStage::Completed,
        ]
    }

    /// 获取某阶段的所有可能事件
    pub fn get_possible_events(stage: VisitStage) -> Vec<VisitEvent> {
        match stage {
            VisitStage::Vitals => vec![VisitEvent::VitalsRecorded],
            VisitStage::Consultation => vec![VisitEvent::ConsultationFinished],
            VisitStage::Lab => vec![VisitEvent::LabResultsEntered],
            VisitStage::Billing => vec![VisitEvent::PaymentConfirmed],
            VisitStage::Pharmacy => vec![VisitEvent::MedicationsDispensed],
            VisitStage::Clearance => vec![VisitEvent::Cleared],
            VisitStage::Completed => vec![],
        }
    }

    /// 获取所有事件
    pub fn get_all_events() -> Vec<VisitEvent> {
        vec![
            VisitEvent::VitalsRecorded,
            VisitEvent::ConsultationFinished,
            VisitEvent::LabResultsEntered,
            VisitEvent::PaymentConfirmed,
            VisitEvent::MedicationsDispensed,
            VisitEvent::Cleared,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use clinic_core::{LabOrder, LabOrderStatus, PaymentStatus, PrescriptionLine, VisitPriority};
    use uuid::Uuid;

    fn sample_visit(stage: VisitStage) -> Visit {
        let now = Utc::now();
        Visit {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            patient_name: "测试患者".to_string(),
            stage,
            stage_start_time: now,
            queue_number: 1,
            priority: VisitPriority::Normal,
            vitals: None,
            chief_complaint: None,
            diagnosis: None,
            doctor_notes: None,
            lab_orders: Vec::new(),
            prescription: Vec::new(),
            medications_dispensed: false,
            consultation_fee: 500,
            total_bill: 0,
            payment_status: PaymentStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    fn pending_lab_order() -> LabOrder {
        LabOrder {
            test_id: Uuid::new_v4(),
            test_name: "血常规".to_string(),
            price: 1000,
            status: LabOrderStatus::Pending,
            result: None,
        }
    }

    fn prescription_line() -> PrescriptionLine {
        PrescriptionLine {
            inventory_id: Uuid::new_v4(),
            name: "对乙酰氨基酚".to_string(),
            dosage: "500mg 每日三次".to_string(),
            quantity: 3,
            price: 200,
        }
    }

    #[test]
    fn test_valid_transitions() {
        let sm = VisitStateMachine::new();

        let visit = sample_visit(VisitStage::Vitals);
        assert!(sm.can_transition(&visit, &VisitEvent::VitalsRecorded));

        let visit = sample_visit(VisitStage::Lab);
        assert!(sm.can_transition(&visit, &VisitEvent::LabResultsEntered));

        let visit = sample_visit(VisitStage::Clearance);
        assert!(sm.can_transition(&visit, &VisitEvent::Cleared));
    }

    #[test]
    fn test_invalid_transitions() {
        let sm = VisitStateMachine::new();

        let visit = sample_visit(VisitStage::Completed);
        assert!(!sm.can_transition(&visit, &VisitEvent::Cleared));

        let visit = sample_visit(VisitStage::Vitals);
        assert!(!sm.can_transition(&visit, &VisitEvent::PaymentConfirmed));

        let visit = sample_visit(VisitStage::Billing);
        let result = sm.transition(&visit, &VisitEvent::VitalsRecorded);
        assert!(matches!(
            result,
            Err(ClinicError::InvalidStageTransition { .. })
        ));
    }

    #[test]
    fn test_consultation_branches_on_pending_lab_orders() {
        let sm = VisitStateMachine::new();

        // 无化验单直接收费
        let visit = sample_visit(VisitStage::Consultation);
        assert_eq!(
            sm.transition(&visit, &VisitEvent::ConsultationFinished).unwrap(),
            VisitStage::Billing
        );

        // 有待出结果的化验单先进化验
        let mut visit = sample_visit(VisitStage::Consultation);
        visit.lab_orders.push(pending_lab_order());
        assert_eq!(
            sm.transition(&visit, &VisitEvent::ConsultationFinished).unwrap(),
            VisitStage::Lab
        );

        // 化验单全部出结果则视同无待办，直接收费
        let mut visit = sample_visit(VisitStage::Consultation);
        let mut order = pending_lab_order();
        order.status = LabOrderStatus::Completed;
        order.result = Some("正常".to_string());
        visit.lab_orders.push(order);
        assert_eq!(
            sm.transition(&visit, &VisitEvent::ConsultationFinished).unwrap(),
            VisitStage::Billing
        );
    }

    #[test]
    fn test_billing_branches_on_prescription() {
        let sm = VisitStateMachine::new();

        let visit = sample_visit(VisitStage::Billing);
        assert_eq!(
            sm.transition(&visit, &VisitEvent::PaymentConfirmed).unwrap(),
            VisitStage::Clearance
        );

        let mut visit = sample_visit(VisitStage::Billing);
        visit.prescription.push(prescription_line());
        assert_eq!(
            sm.transition(&visit, &VisitEvent::PaymentConfirmed).unwrap(),
            VisitStage::Pharmacy
        );
    }

    #[test]
    fn test_forward_only_past_billing() {
        // 进入收费阶段后，任何事件都不会回到收费前的阶段
        let sm = VisitStateMachine::new();
        let early_stages = [VisitStage::Vitals, VisitStage::Consultation, VisitStage::Lab];

        for stage in VisitStateMachine::get_all_stages() {
            if !stage.is_past_billing() {
                continue;
            }
            for event in VisitStateMachine::get_all_events() {
                let mut visit = sample_visit(stage);
                visit.prescription.push(prescription_line());
                if let Ok(next) = sm.transition(&visit, &event) {
                    assert!(
                        !early_stages.contains(&next),
                        "{:?} + {:?} 不应回退到 {:?}",
                        stage,
                        event,
                        next
                    );
                }
            }
        }
    }

    #[test]
    fn test_lab_return_edge_is_the_only_regression() {
        let sm = VisitStateMachine::new();
        let visit = sample_visit(VisitStage::Lab);
        assert_eq!(
            sm.transition(&visit, &VisitEvent::LabResultsEntered).unwrap(),
            VisitStage::Consultation
        );
    }
}
