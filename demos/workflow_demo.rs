//! 就诊工作流演示程序
//!
//! 展示一位患者从挂号到完成的完整流水线：体征、问诊、化验回路、
//! 收费、药房发药与离院结算

use clinic_core::{PrescriptionLine, VisitPriority, Vitals};
use clinic_workflow::{
    AdvanceOutcome, CheckInRequest, ConsultationUpdate, MemoryStore, NewLabOrder, TracingSink,
    VisitEvent, VisitWorkflow,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志
    tracing_subscriber::fmt::init();

    // 创建工作流引擎（内存存取，便于演示）
    let workflow = VisitWorkflow::new(Arc::new(MemoryStore::new()), Arc::new(TracingSink::new()));

    println!("🏥 诊所就诊工作流演示\n");

    // 1. 准备患者与库存
    let patient = workflow.register_patient("P0001", "王小明").await?;
    let medicine = workflow.add_inventory_item("对乙酰氨基酚", 20, 200).await?;
    println!("✅ 患者 {} 已登记，药品 {} 库存 {}", patient.name, medicine.name, medicine.stock);

    // 2. 挂号
    let visit = workflow
        .check_in(CheckInRequest {
            patient_id: patient.id,
            patient_name: patient.name.clone(),
            priority: VisitPriority::Normal,
            skip_vitals: false,
            chief_complaint: Some("发热三天，伴头痛".to_string()),
            consultation_fee: 500,
        })
        .await?;
    println!("✅ 挂号完成，队列号 {}，当前阶段 {:?}", visit.queue_number, visit.stage);

    // 3. 体征采集
    workflow
        .record_vitals(
            visit.id,
            Vitals {
                blood_pressure: Some("120/80".to_string()),
                temperature_celsius: Some(38.6),
                heart_rate: Some(92),
                ..Default::default()
            },
        )
        .await?;
    let visit = expect_advanced(workflow.advance(visit.id, VisitEvent::VitalsRecorded).await?);
    println!("✅ 体征采集完成，进入 {:?}", visit.stage);

    // 4. 问诊并开化验单
    workflow
        .order_lab_tests(
            visit.id,
            vec![NewLabOrder {
                test_name: "疟原虫镜检".to_string(),
                price: 1000,
            }],
        )
        .await?;
    let visit = expect_advanced(
        workflow
            .advance(visit.id, VisitEvent::ConsultationFinished)
            .await?,
    );
    println!("✅ 问诊结束，有待出结果的化验单，进入 {:?}", visit.stage);

    // 5. 录入化验结果，回到问诊
    let test_id = visit.lab_orders[0].test_id;
    workflow.enter_lab_result(visit.id, test_id, "阳性").await?;
    let visit = expect_advanced(
        workflow
            .advance(visit.id, VisitEvent::LabResultsEntered)
            .await?,
    );
    println!("✅ 化验结果已录入，回到 {:?}", visit.stage);

    // 6. 确诊并开处方
    workflow
        .record_consultation(
            visit.id,
            ConsultationUpdate {
                diagnosis: Some("Malaria".to_string()),
                doctor_notes: Some("Rest and hydrate".to_string()),
                ..Default::default()
            },
        )
        .await?;
    workflow
        .prescribe(
            visit.id,
            vec![PrescriptionLine {
                inventory_id: medicine.id,
                name: medicine.name.clone(),
                dosage: "500mg 每日三次".to_string(),
                quantity: 3,
                price: 200,
            }],
        )
        .await?;
    let visit = expect_advanced(
        workflow
            .advance(visit.id, VisitEvent::ConsultationFinished)
            .await?,
    );
    println!("✅ 化验单已全部出结果，进入 {:?}", visit.stage);

    // 7. 账单
    let bill = workflow.bill_summary(visit.id).await?;
    println!("\n💰 账单明细:");
    println!("   诊查费: {}", bill.consultation_fee);
    println!("   化验费: {}", bill.lab_total);
    println!("   药费: {}", bill.prescription_total);
    println!("   税前小计(落库): {}", bill.subtotal);
    println!("   税额(展示): {}", bill.tax);
    println!("   应收总额: {}", bill.grand_total);

    // 8. 未支付时推进被拒绝
    if let AdvanceOutcome::Rejected { reason, .. } =
        workflow.advance(visit.id, VisitEvent::PaymentConfirmed).await?
    {
        println!("\n⛔ 未支付，推进被拒绝: {}", reason);
    }

    // 9. 收款后进入药房并发药
    workflow.mark_paid(visit.id).await?;
    let visit = expect_advanced(
        workflow
            .advance(visit.id, VisitEvent::PaymentConfirmed)
            .await?,
    );
    println!("✅ 已收款，进入 {:?}", visit.stage);

    let visit = expect_advanced(
        workflow
            .advance(visit.id, VisitEvent::MedicationsDispensed)
            .await?,
    );
    println!("✅ 发药完成，进入 {:?}", visit.stage);

    // 10. 离院结算，历史摘要归档
    let visit = expect_advanced(workflow.advance(visit.id, VisitEvent::Cleared).await?);
    println!("✅ 就诊完成，最终阶段 {:?}", visit.stage);

    let history = workflow.patient_history(patient.id).await?;
    println!("\n📋 患者就诊历史:");
    for entry in history {
        println!("   - {}", entry);
    }

    println!("\n🎉 就诊工作流演示完成!");
    Ok(())
}

fn expect_advanced(outcome: AdvanceOutcome) -> clinic_core::Visit {
    match outcome {
        AdvanceOutcome::Advanced(visit) => visit,
        AdvanceOutcome::Rejected { reason, .. } => panic!("转换被拒绝: {}", reason),
    }
}
