//! 账单计算
//!
//! 税前小计是诊查费、化验费与处方行小计之和，进入收费阶段时落库；
//! 16% 税额只在给付款人展示总额时计算，不单独持久化。

use clinic_core::{utils, Visit};
use serde::{Deserialize, Serialize};

/// 账单明细
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillSummary {
    pub consultation_fee: i64,
    pub lab_total: i64,
    pub prescription_total: i64,
    /// 落库的税前小计
    pub subtotal: i64,
    /// 展示层税额
    pub tax: i64,
    /// 展示给付款人的含税总额
    pub grand_total: i64,
}

/// 计算税前小计
pub fn compute_subtotal(visit: &Visit) -> i64 {
    let lab_total: i64 = visit.lab_orders.iter().map(|order| order.price).sum();
    let prescription_total: i64 = visit
        .prescription
        .iter()
        .map(|line| line.line_total())
        .sum();
    visit.consultation_fee + lab_total + prescription_total
}

/// 生成完整的账单明细
pub fn summarize(visit: &Visit) -> BillSummary {
    let lab_total: i64 = visit.lab_orders.iter().map(|order| order.price).sum();
    let prescription_total: i64 = visit
        .prescription
        .iter()
        .map(|line| line.line_total())
        .sum();
    let subtotal = visit.consultation_fee + lab_total + prescription_total;

    BillSummary {
        consultation_fee: visit.consultation_fee,
        lab_total,
        prescription_total,
        subtotal,
        tax: utils::tax_amount(subtotal),
        grand_total: utils::grand_total(subtotal),
    }
}
