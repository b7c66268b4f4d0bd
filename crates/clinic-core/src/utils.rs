//! 通用工具函数

use chrono::NaiveDate;

/// 展示层税率 (百分比)
pub const TAX_RATE_PERCENT: i64 = 16;

/// 计算展示层税额，四舍五入到货币最小单位
///
/// 税额只出现在给付款人展示的总额中，不落库。
pub fn tax_amount(subtotal: i64) -> i64 {
    (subtotal * TAX_RATE_PERCENT + 50) / 100
}

/// 展示给付款人的含税总额 = 税前小计 + 税额
pub fn grand_total(subtotal: i64) -> i64 {
    subtotal + tax_amount(subtotal)
}

/// 合成一条就诊历史摘要
///
/// 格式: `[日期] Dx: 诊断. Notes: 医嘱`，诊断或医嘱缺失时逐项省略。
pub fn compose_history_summary(
    date: NaiveDate,
    diagnosis: Option<&str>,
    doctor_notes: Option<&str>,
) -> String {
    let diagnosis = diagnosis.map(str::trim).filter(|s| !s.is_empty());
    let doctor_notes = doctor_notes.map(str::trim).filter(|s| !s.is_empty());

    match (diagnosis, doctor_notes) {
        (Some(dx), Some(notes)) => format!("[{}] Dx: {}. Notes: {}", date, dx, notes),
        (Some(dx), None) => format!("[{}] Dx: {}.", date, dx),
        (None, Some(notes)) => format!("[{}] Notes: {}", date, notes),
        (None, None) => format!("[{}] Visit completed.", date),
    }
}
