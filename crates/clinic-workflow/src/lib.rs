//! # 诊所就诊工作流模块
//!
//! 提供一次就诊从挂号到完成的完整生命周期管理，包括：
//! - 阶段状态机：固定流水线内的合法转换判定与分支
//! - 挂号台：队列号与优先级分配、候诊队列排序
//! - 账单计算：税前小计落库，税额只在展示层计算
//! - 药房发药：处方逐行扣减库存，带幂等保护
//! - 工作流引擎：守卫检查、副作用应用与持久化的统一入口

pub mod billing;
pub mod checkin;
pub mod dispensing;
pub mod engine;
pub mod notify;
pub mod state_machine;
pub mod store;

// 重新导出主要类型
pub use billing::BillSummary;
pub use checkin::{order_queue, CheckInDesk, CheckInRequest};
pub use engine::{AdvanceOutcome, ConsultationUpdate, NewLabOrder, VisitWorkflow};
pub use notify::{MemorySink, NotificationSink, Severity, TracingSink};
pub use state_machine::{VisitEvent, VisitStateMachine};
pub use store::{MemoryStore, RecordStore};
