//! 就诊工作流引擎
//!
//! 协调状态机、挂号台、账单计算与发药副作用的核心引擎。
//! 每次转换按 守卫检查 → 状态变更 → 副作用应用 → 持久化 的顺序
//! 一次跑完，引擎内部没有排队或批处理。

use crate::{
    billing::{self, BillSummary},
    checkin::{order_queue, CheckInDesk, CheckInRequest},
    dispensing,
    notify::{NotificationSink, Severity},
    state_machine::{VisitEvent, VisitStateMachine},
    store::RecordStore,
};
use chrono::Utc;
use clinic_core::{
    utils, ClinicError, InventoryItem, LabOrder, LabOrderStatus, Patient, PaymentStatus,
    PrescriptionLine, Result, Visit, VisitStage, Vitals,
};
use std::sync::Arc;
use uuid::Uuid;

/// 新开化验单
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NewLabOrder {
    pub test_name: String,
    pub price: i64,
}

/// 问诊阶段的数据录入，只更新给出的字段
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ConsultationUpdate {
    pub chief_complaint: Option<String>,
    pub diagnosis: Option<String>,
    pub doctor_notes: Option<String>,
    pub consultation_fee: Option<i64>,
}

/// 阶段推进的结果
///
/// 守卫不满足（如未支付时离院结算）不是错误，而是保持原状的拒绝，
/// 操作员通过通知端看到静态提示。
#[derive(Debug, Clone)]
pub enum AdvanceOutcome {
    Advanced(Visit),
    Rejected { visit: Visit, reason: String },
}

/// 就诊工作流引擎
pub struct VisitWorkflow {
    store: Arc<dyn RecordStore>,
    sink: Arc<dyn NotificationSink>,
    state_machine: VisitStateMachine,
    checkin_desk: CheckInDesk,
}

impl VisitWorkflow {
    /// 创建新的工作流引擎
    pub fn new(store: Arc<dyn RecordStore>, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            store,
            sink,
            state_machine: VisitStateMachine::new(),
            checkin_desk: CheckInDesk::new(),
        }
    }

    /// 指定挂号台（服务重启后恢复队列号计数用）
    pub fn with_checkin_desk(mut self, desk: CheckInDesk) -> Self {
        self.checkin_desk = desk;
        self
    }

    /// 获取状态机实例
    pub fn state_machine(&self) -> &VisitStateMachine {
        &self.state_machine
    }

    // ========== 患者与库存 ==========

    /// 登记新患者
    pub async fn register_patient(&self, patient_number: &str, name: &str) -> Result<Patient> {
        let now = Utc::now();
        let patient = Patient {
            id: Uuid::new_v4(),
            patient_number: patient_number.to_string(),
            name: name.to_string(),
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        let saved = self.store.save_patient(&patient).await?;
        tracing::info!("Registered patient {} ({})", saved.name, saved.patient_number);
        Ok(saved)
    }

    /// 录入库存药品
    pub async fn add_inventory_item(
        &self,
        name: &str,
        stock: i32,
        unit_price: i64,
    ) -> Result<InventoryItem> {
        let item = InventoryItem {
            id: Uuid::new_v4(),
            name: name.to_string(),
            stock,
            unit_price,
            updated_at: Utc::now(),
        };
        self.store.save_inventory_item(&item).await
    }

    /// 查询患者就诊历史（最新在前）
    pub async fn patient_history(&self, patient_id: Uuid) -> Result<Vec<String>> {
        let patient = self.store.get_patient(patient_id).await?;
        Ok(patient.history)
    }

    // ========== 挂号与队列 ==========

    /// 办理挂号
    pub async fn check_in(&self, request: CheckInRequest) -> Result<Visit> {
        let visit = self.checkin_desk.check_in(request);
        let saved = self.store.save_visit(&visit).await?;
        self.sink.notify(
            &format!("患者 {} 已挂号，队列号 {}", saved.patient_name, saved.queue_number),
            Severity::Success,
        );
        Ok(saved)
    }

    /// 获取就诊记录
    pub async fn get_visit(&self, visit_id: Uuid) -> Result<Visit> {
        self.store.get_visit(visit_id).await
    }

    /// 候诊队列快照（优先级高的在前，同级先来先到）
    pub async fn queue(&self) -> Result<Vec<Visit>> {
        let active = self.store.list_active_visits().await?;
        Ok(order_queue(active))
    }

    // ========== 阶段数据录入 ==========

    /// 记录体征
    ///
    /// 按约定体征在进入问诊后即视为冻结，但不强制执行，只告警。
    pub async fn record_vitals(&self, visit_id: Uuid, vitals: Vitals) -> Result<Visit> {
        let mut visit = self.store.get_visit(visit_id).await?;
        if visit.stage != VisitStage::Vitals && visit.stage != VisitStage::Consultation {
            tracing::warn!(
                "Recording vitals for visit {} at late stage {:?}",
                visit.id,
                visit.stage
            );
        }
        visit.vitals = Some(vitals);
        visit.updated_at = Utc::now();
        self.store.save_visit(&visit).await
    }

    /// 录入问诊数据
    pub async fn record_consultation(
        &self,
        visit_id: Uuid,
        update: ConsultationUpdate,
    ) -> Result<Visit> {
        let mut visit = self.store.get_visit(visit_id).await?;
        if let Some(chief_complaint) = update.chief_complaint {
            visit.chief_complaint = Some(chief_complaint);
        }
        if let Some(diagnosis) = update.diagnosis {
            visit.diagnosis = Some(diagnosis);
        }
        if let Some(doctor_notes) = update.doctor_notes {
            visit.doctor_notes = Some(doctor_notes);
        }
        if let Some(consultation_fee) = update.consultation_fee {
            visit.consultation_fee = consultation_fee;
        }
        visit.updated_at = Utc::now();
        self.store.save_visit(&visit).await
    }

    /// 开具化验单
    pub async fn order_lab_tests(&self, visit_id: Uuid, orders: Vec<NewLabOrder>) -> Result<Visit> {
        let mut visit = self.store.get_visit(visit_id).await?;
        if visit.stage.is_past_billing() {
            return Err(ClinicError::Validation(format!(
                "就诊 {} 已进入收费流程，不能再开化验单",
                visit.id
            )));
        }
        for order in orders {
            visit.lab_orders.push(LabOrder {
                test_id: Uuid::new_v4(),
                test_name: order.test_name,
                price: order.price,
                status: LabOrderStatus::Pending,
                result: None,
            });
        }
        visit.updated_at = Utc::now();
        self.store.save_visit(&visit).await
    }

    /// 录入化验结果
    ///
    /// 非空结果把该化验单标记为已完成；回到问诊的转换本身不要求
    /// 所有化验单都已出结果（宽松设计）。
    pub async fn enter_lab_result(
        &self,
        visit_id: Uuid,
        test_id: Uuid,
        result: &str,
    ) -> Result<Visit> {
        if result.trim().is_empty() {
            return Err(ClinicError::Validation("化验结果不能为空".to_string()));
        }

        let mut visit = self.store.get_visit(visit_id).await?;
        let order = visit
            .lab_orders
            .iter_mut()
            .find(|order| order.test_id == test_id)
            .ok_or_else(|| ClinicError::NotFound(format!("Lab order {} not found", test_id)))?;
        order.result = Some(result.to_string());
        order.status = LabOrderStatus::Completed;
        visit.updated_at = Utc::now();
        self.store.save_visit(&visit).await
    }

    /// 开具处方
    pub async fn prescribe(&self, visit_id: Uuid, lines: Vec<PrescriptionLine>) -> Result<Visit> {
        let mut visit = self.store.get_visit(visit_id).await?;
        if visit.stage.is_past_billing() {
            return Err(ClinicError::Validation(format!(
                "就诊 {} 已进入收费流程，不能再开处方",
                visit.id
            )));
        }
        visit.prescription.extend(lines);
        visit.updated_at = Utc::now();
        self.store.save_visit(&visit).await
    }

    /// 人工标记已支付
    ///
    /// 外部支付回调与人工补录收敛到同一个字段，守卫只看这一处。
    pub async fn mark_paid(&self, visit_id: Uuid) -> Result<Visit> {
        let mut visit = self.store.get_visit(visit_id).await?;
        visit.payment_status = PaymentStatus::Paid;
        visit.updated_at = Utc::now();
        let saved = self.store.save_visit(&visit).await?;
        self.sink.notify(
            &format!("就诊 {} 已收款", saved.queue_number),
            Severity::Success,
        );
        Ok(saved)
    }

    /// 查询账单明细
    pub async fn bill_summary(&self, visit_id: Uuid) -> Result<BillSummary> {
        let visit = self.store.get_visit(visit_id).await?;
        Ok(billing::summarize(&visit))
    }

    // ========== 阶段推进 ==========

    /// 推进就诊阶段
    pub async fn advance(&self, visit_id: Uuid, event: VisitEvent) -> Result<AdvanceOutcome> {
        let mut visit = self.store.get_visit(visit_id).await?;
        let next = self.state_machine.transition(&visit, &event)?;

        // 支付闸门：收费确认与离院结算都要求已支付
        if matches!(event, VisitEvent::PaymentConfirmed | VisitEvent::Cleared) && !visit.is_paid()
        {
            tracing::info!("Visit {} advance rejected: payment pending", visit.id);
            self.sink.notify("Pending Payment", Severity::Error);
            return Ok(AdvanceOutcome::Rejected {
                visit,
                reason: "Pending Payment".to_string(),
            });
        }

        // 发药副作用先于阶段推进执行
        if event == VisitEvent::MedicationsDispensed {
            dispensing::dispense_prescription(self.store.as_ref(), self.sink.as_ref(), &mut visit)
                .await?;
        }

        let now = Utc::now();
        let previous = visit.stage;
        visit.stage = next;
        visit.stage_start_time = now;
        visit.updated_at = now;

        // 进入收费阶段时计算税前小计；经化验回路再次进入时重算
        if next == VisitStage::Billing {
            visit.total_bill = billing::compute_subtotal(&visit);
        }

        if next == VisitStage::Completed {
            let completed = self.complete_visit(visit).await?;
            return Ok(AdvanceOutcome::Advanced(completed));
        }

        let saved = self.store.save_visit(&visit).await?;
        tracing::info!(
            "Visit {} advanced from {:?} to {:?}",
            saved.id,
            previous,
            saved.stage
        );
        self.sink.notify(
            &format!("队列号 {} 进入 {:?} 阶段", saved.queue_number, saved.stage),
            Severity::Success,
        );
        Ok(AdvanceOutcome::Advanced(saved))
    }

    /// 完成就诊：写回就诊记录并把摘要追加到患者历史
    ///
    /// 两次独立写入，先就诊记录后患者档案，不保证跨实体原子性；
    /// 患者写入失败时就诊记录已是 Completed，与源系统行为一致。
    async fn complete_visit(&self, visit: Visit) -> Result<Visit> {
        let saved = self.store.save_visit(&visit).await?;

        let summary = utils::compose_history_summary(
            Utc::now().date_naive(),
            saved.diagnosis.as_deref(),
            saved.doctor_notes.as_deref(),
        );
        let mut patient = self.store.get_patient(saved.patient_id).await?;
        patient.history.insert(0, summary);
        patient.updated_at = Utc::now();
        self.store.save_patient(&patient).await?;

        tracing::info!(
            "Visit {} completed, history appended for patient {}",
            saved.id,
            patient.id
        );
        self.sink.notify(
            &format!("患者 {} 本次就诊已完成", saved.patient_name),
            Severity::Success,
        );
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MemorySink;
    use crate::store::MemoryStore;
    use clinic_core::VisitPriority;

    struct Harness {
        store: Arc<MemoryStore>,
        sink: Arc<MemorySink>,
        workflow: VisitWorkflow,
    }

    fn harness() -> Harness {
        let store = Arc::new(MemoryStore::new());
        let sink = Arc::new(MemorySink::new());
        let workflow = VisitWorkflow::new(store.clone(), sink.clone());
        Harness {
            store,
            sink,
            workflow,
        }
    }

    fn check_in_request(patient: &Patient, priority: VisitPriority) -> CheckInRequest {
        CheckInRequest {
            patient_id: patient.id,
            patient_name: patient.name.clone(),
            priority,
            skip_vitals: false,
            chief_complaint: Some("发热三天".to_string()),
            consultation_fee: 500,
        }
    }

    fn unwrap_advanced(outcome: AdvanceOutcome) -> Visit {
        match outcome {
            AdvanceOutcome::Advanced(visit) => visit,
            AdvanceOutcome::Rejected { reason, .. } => {
                panic!("expected advance, got rejection: {}", reason)
            }
        }
    }

    #[tokio::test]
    async fn test_full_pipeline_with_labs_and_prescription() {
        let h = harness();
        let patient = h.workflow.register_patient("P0001", "测试患者").await.unwrap();
        let item = h.workflow.add_inventory_item("对乙酰氨基酚", 20, 200).await.unwrap();

        let visit = h
            .workflow
            .check_in(check_in_request(&patient, VisitPriority::Normal))
            .await
            .unwrap();
        assert_eq!(visit.stage, VisitStage::Vitals);

        // 体征 → 问诊
        h.workflow
            .record_vitals(
                visit.id,
                Vitals {
                    temperature_celsius: Some(38.6),
                    heart_rate: Some(92),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let visit = unwrap_advanced(
            h.workflow.advance(visit.id, VisitEvent::VitalsRecorded).await.unwrap(),
        );
        assert_eq!(visit.stage, VisitStage::Consultation);

        // 问诊开化验单，结束问诊进入化验
        h.workflow
            .order_lab_tests(
                visit.id,
                vec![NewLabOrder {
                    test_name: "疟原虫镜检".to_string(),
                    price: 1000,
                }],
            )
            .await
            .unwrap();
        let visit = unwrap_advanced(
            h.workflow
                .advance(visit.id, VisitEvent::ConsultationFinished)
                .await
                .unwrap(),
        );
        assert_eq!(visit.stage, VisitStage::Lab);

        // 录入结果回到问诊
        let test_id = visit.lab_orders[0].test_id;
        h.workflow
            .enter_lab_result(visit.id, test_id, "阳性")
            .await
            .unwrap();
        let visit = unwrap_advanced(
            h.workflow
                .advance(visit.id, VisitEvent::LabResultsEntered)
                .await
                .unwrap(),
        );
        assert_eq!(visit.stage, VisitStage::Consultation);

        // 确诊并开处方，结束问诊直接进入收费
        h.workflow
            .record_consultation(
                visit.id,
                ConsultationUpdate {
                    diagnosis: Some("Malaria".to_string()),
                    doctor_notes: Some("Rest and hydrate".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        h.workflow
            .prescribe(
                visit.id,
                vec![PrescriptionLine {
                    inventory_id: item.id,
                    name: item.name.clone(),
                    dosage: "500mg 每日三次".to_string(),
                    quantity: 3,
                    price: 200,
                }],
            )
            .await
            .unwrap();
        let visit = unwrap_advanced(
            h.workflow
                .advance(visit.id, VisitEvent::ConsultationFinished)
                .await
                .unwrap(),
        );
        assert_eq!(visit.stage, VisitStage::Billing);
        // 500 + 1000 + 200*3 = 2100，落库为税前小计
        assert_eq!(visit.total_bill, 2100);

        let summary = h.workflow.bill_summary(visit.id).await.unwrap();
        assert_eq!(summary.grand_total, 2436);

        // 收款后进入药房
        h.workflow.mark_paid(visit.id).await.unwrap();
        let visit = unwrap_advanced(
            h.workflow
                .advance(visit.id, VisitEvent::PaymentConfirmed)
                .await
                .unwrap(),
        );
        assert_eq!(visit.stage, VisitStage::Pharmacy);

        // 发药扣库存后进入离院结算
        let visit = unwrap_advanced(
            h.workflow
                .advance(visit.id, VisitEvent::MedicationsDispensed)
                .await
                .unwrap(),
        );
        assert_eq!(visit.stage, VisitStage::Clearance);
        assert!(visit.medications_dispensed);
        assert_eq!(h.store.get_inventory_item(item.id).await.unwrap().stock, 17);

        // 离院结算完成，历史摘要落到患者档案
        let visit = unwrap_advanced(
            h.workflow.advance(visit.id, VisitEvent::Cleared).await.unwrap(),
        );
        assert_eq!(visit.stage, VisitStage::Completed);

        let history = h.workflow.patient_history(patient.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0].contains("Dx: Malaria"));
        assert!(history[0].contains("Notes: Rest and hydrate"));

        // 完成后的就诊不再出现在候诊队列
        assert!(h.workflow.queue().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_labs_no_prescription_takes_short_path() {
        let h = harness();
        let patient = h.workflow.register_patient("P0002", "直达患者").await.unwrap();

        let mut request = check_in_request(&patient, VisitPriority::Normal);
        request.skip_vitals = true;
        let visit = h.workflow.check_in(request).await.unwrap();
        assert_eq!(visit.stage, VisitStage::Consultation);

        // 无化验单，问诊结束直接收费
        let visit = unwrap_advanced(
            h.workflow
                .advance(visit.id, VisitEvent::ConsultationFinished)
                .await
                .unwrap(),
        );
        assert_eq!(visit.stage, VisitStage::Billing);
        assert_eq!(visit.total_bill, 500);

        // 无处方，收款后直接离院结算
        h.workflow.mark_paid(visit.id).await.unwrap();
        let visit = unwrap_advanced(
            h.workflow
                .advance(visit.id, VisitEvent::PaymentConfirmed)
                .await
                .unwrap(),
        );
        assert_eq!(visit.stage, VisitStage::Clearance);
    }

    #[tokio::test]
    async fn test_clearance_rejected_while_unpaid() {
        let h = harness();
        let patient = h.workflow.register_patient("P0003", "欠费患者").await.unwrap();

        let mut request = check_in_request(&patient, VisitPriority::Normal);
        request.skip_vitals = true;
        let visit = h.workflow.check_in(request).await.unwrap();
        let visit = unwrap_advanced(
            h.workflow
                .advance(visit.id, VisitEvent::ConsultationFinished)
                .await
                .unwrap(),
        );
        assert_eq!(visit.stage, VisitStage::Billing);

        // 未支付时收费确认被拒绝，阶段不变，历史不追加
        let outcome = h
            .workflow
            .advance(visit.id, VisitEvent::PaymentConfirmed)
            .await
            .unwrap();
        match outcome {
            AdvanceOutcome::Rejected { visit, reason } => {
                assert_eq!(reason, "Pending Payment");
                assert_eq!(visit.stage, VisitStage::Billing);
            }
            AdvanceOutcome::Advanced(_) => panic!("unpaid visit must not advance"),
        }

        let stored = h.store.get_visit(visit.id).await.unwrap();
        assert_eq!(stored.stage, VisitStage::Billing);
        assert!(h.workflow.patient_history(patient.id).await.unwrap().is_empty());

        let messages = h.sink.messages();
        assert!(messages
            .iter()
            .any(|(msg, sev)| msg == "Pending Payment" && *sev == Severity::Error));
    }

    #[tokio::test]
    async fn test_cleared_gate_checks_payment_directly() {
        let h = harness();
        let patient = h.workflow.register_patient("P0009", "结算患者").await.unwrap();

        let mut request = check_in_request(&patient, VisitPriority::Normal);
        request.skip_vitals = true;
        let visit = h.workflow.check_in(request).await.unwrap();

        // 直接构造一个处于离院结算但未支付的就诊记录
        let mut stored = h.store.get_visit(visit.id).await.unwrap();
        stored.stage = VisitStage::Clearance;
        h.store.save_visit(&stored).await.unwrap();

        let outcome = h.workflow.advance(visit.id, VisitEvent::Cleared).await.unwrap();
        assert!(matches!(outcome, AdvanceOutcome::Rejected { .. }));

        let after = h.store.get_visit(visit.id).await.unwrap();
        assert_eq!(after.stage, VisitStage::Clearance);
        assert!(h.workflow.patient_history(patient.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_is_newest_first() {
        let h = harness();
        let patient = h.workflow.register_patient("P0004", "复诊患者").await.unwrap();

        for diagnosis in ["初诊", "复诊"] {
            let mut request = check_in_request(&patient, VisitPriority::Normal);
            request.skip_vitals = true;
            let visit = h.workflow.check_in(request).await.unwrap();
            h.workflow
                .record_consultation(
                    visit.id,
                    ConsultationUpdate {
                        diagnosis: Some(diagnosis.to_string()),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
            let visit = unwrap_advanced(
                h.workflow
                    .advance(visit.id, VisitEvent::ConsultationFinished)
                    .await
                    .unwrap(),
            );
            h.workflow.mark_paid(visit.id).await.unwrap();
            let visit = unwrap_advanced(
                h.workflow
                    .advance(visit.id, VisitEvent::PaymentConfirmed)
                    .await
                    .unwrap(),
            );
            unwrap_advanced(h.workflow.advance(visit.id, VisitEvent::Cleared).await.unwrap());
        }

        let history = h.workflow.patient_history(patient.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].contains("复诊"));
        assert!(history[1].contains("初诊"));
    }

    #[tokio::test]
    async fn test_bill_recomputed_on_second_billing_entry() {
        let h = harness();
        let patient = h.workflow.register_patient("P0005", "回路患者").await.unwrap();

        let mut request = check_in_request(&patient, VisitPriority::Normal);
        request.skip_vitals = true;
        let visit = h.workflow.check_in(request).await.unwrap();

        h.workflow
            .order_lab_tests(
                visit.id,
                vec![NewLabOrder {
                    test_name: "血常规".to_string(),
                    price: 800,
                }],
            )
            .await
            .unwrap();
        let visit = unwrap_advanced(
            h.workflow
                .advance(visit.id, VisitEvent::ConsultationFinished)
                .await
                .unwrap(),
        );
        assert_eq!(visit.stage, VisitStage::Lab);

        let test_id = visit.lab_orders[0].test_id;
        h.workflow
            .enter_lab_result(visit.id, test_id, "偏高")
            .await
            .unwrap();
        let visit = unwrap_advanced(
            h.workflow
                .advance(visit.id, VisitEvent::LabResultsEntered)
                .await
                .unwrap(),
        );

        // 回到问诊后加开化验单，再次进入收费时账单被重算
        h.workflow
            .order_lab_tests(
                visit.id,
                vec![NewLabOrder {
                    test_name: "肝功能".to_string(),
                    price: 1200,
                }],
            )
            .await
            .unwrap();
        let visit = unwrap_advanced(
            h.workflow
                .advance(visit.id, VisitEvent::ConsultationFinished)
                .await
                .unwrap(),
        );
        assert_eq!(visit.stage, VisitStage::Lab);

        let second_test = h.store.get_visit(visit.id).await.unwrap().lab_orders[1].test_id;
        h.workflow
            .enter_lab_result(visit.id, second_test, "正常")
            .await
            .unwrap();
        let visit = unwrap_advanced(
            h.workflow
                .advance(visit.id, VisitEvent::LabResultsEntered)
                .await
                .unwrap(),
        );
        let visit = unwrap_advanced(
            h.workflow
                .advance(visit.id, VisitEvent::ConsultationFinished)
                .await
                .unwrap(),
        );
        assert_eq!(visit.stage, VisitStage::Billing);
        assert_eq!(visit.total_bill, 500 + 800 + 1200);
    }

    #[tokio::test]
    async fn test_empty_lab_result_is_rejected() {
        let h = harness();
        let patient = h.workflow.register_patient("P0006", "化验患者").await.unwrap();

        let mut request = check_in_request(&patient, VisitPriority::Normal);
        request.skip_vitals = true;
        let visit = h.workflow.check_in(request).await.unwrap();
        h.workflow
            .order_lab_tests(
                visit.id,
                vec![NewLabOrder {
                    test_name: "血常规".to_string(),
                    price: 800,
                }],
            )
            .await
            .unwrap();

        let stored = h.store.get_visit(visit.id).await.unwrap();
        let result = h
            .workflow
            .enter_lab_result(visit.id, stored.lab_orders[0].test_id, "   ")
            .await;
        assert!(matches!(result, Err(ClinicError::Validation(_))));
    }

    #[tokio::test]
    async fn test_queue_excludes_completed_and_orders_by_priority() {
        let h = harness();
        let patient = h.workflow.register_patient("P0007", "队列患者").await.unwrap();

        let normal = h
            .workflow
            .check_in(check_in_request(&patient, VisitPriority::Normal))
            .await
            .unwrap();
        let emergency = h
            .workflow
            .check_in(check_in_request(&patient, VisitPriority::Emergency))
            .await
            .unwrap();

        let queue = h.workflow.queue().await.unwrap();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue[0].id, emergency.id);
        assert_eq!(queue[1].id, normal.id);
    }

    #[tokio::test]
    async fn test_invalid_event_surfaces_transition_error() {
        let h = harness();
        let patient = h.workflow.register_patient("P0008", "误操作患者").await.unwrap();
        let visit = h
            .workflow
            .check_in(check_in_request(&patient, VisitPriority::Normal))
            .await
            .unwrap();

        let result = h.workflow.advance(visit.id, VisitEvent::Cleared).await;
        assert!(matches!(
            result,
            Err(ClinicError::InvalidStageTransition { .. })
        ));
    }
}
