//! 候诊队列演示程序
//!
//! 展示挂号优先级对候诊队列排序的影响

use clinic_core::VisitPriority;
use clinic_workflow::{CheckInRequest, MemoryStore, TracingSink, VisitWorkflow};
use std::sync::Arc;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let workflow = VisitWorkflow::new(Arc::new(MemoryStore::new()), Arc::new(TracingSink::new()));

    println!("🏥 候诊队列演示\n");

    let arrivals = [
        ("张三", VisitPriority::Normal, false),
        ("李四", VisitPriority::Normal, false),
        ("王五", VisitPriority::Emergency, true),
        ("赵六", VisitPriority::Urgent, false),
    ];

    for (name, priority, skip_vitals) in arrivals {
        let patient = workflow.register_patient(&Uuid::new_v4().simple().to_string(), name).await?;
        let visit = workflow
            .check_in(CheckInRequest {
                patient_id: patient.id,
                patient_name: patient.name.clone(),
                priority,
                skip_vitals,
                chief_complaint: None,
                consultation_fee: 500,
            })
            .await?;
        println!(
            "📋 {} 挂号，队列号 {}，优先级 {:?}，起始阶段 {:?}",
            name, visit.queue_number, visit.priority, visit.stage
        );
    }

    let queue = workflow.queue().await?;
    println!("\n📊 候诊队列（优先级高的在前，同级先来先到）:");
    for (position, visit) in queue.iter().enumerate() {
        println!(
            "   {}. {} (队列号 {}, {:?}, {:?})",
            position + 1,
            visit.patient_name,
            visit.queue_number,
            visit.priority,
            visit.stage
        );
    }

    println!("\n🎉 候诊队列演示完成!");
    Ok(())
}
