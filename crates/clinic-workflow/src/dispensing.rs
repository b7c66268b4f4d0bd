//! 药房发药
//!
//! 按处方逐行扣减库存，每个药品单独持久化，无跨行回滚路径

use crate::notify::{NotificationSink, Severity};
use crate::store::RecordStore;
use chrono::Utc;
use clinic_core::{ClinicError, Result, Visit};
use tracing::{info, warn};

/// 对就诊记录应用发药副作用
///
/// medications_dispensed 保证副作用恰好执行一次，重复调用不再扣减。
/// 库存扣减下限为0，不会出现负库存。
/// 处方引用的药品不存在时跳过该行并通知操作员，不使整个转换失败。
pub async fn dispense_prescription(
    store: &dyn RecordStore,
    sink: &dyn NotificationSink,
    visit: &mut Visit,
) -> Result<()> {
    if visit.medications_dispensed {
        info!("Visit {} medications already dispensed, skipping", visit.id);
        return Ok(());
    }

    for line in &visit.prescription {
        match store.get_inventory_item(line.inventory_id).await {
            Ok(mut item) => {
                if item.stock < line.quantity {
                    warn!(
                        "Inventory {} stock {} below prescribed quantity {}",
                        item.name, item.stock, line.quantity
                    );
                }
                item.stock = (item.stock - line.quantity).max(0);
                item.updated_at = Utc::now();
                store.save_inventory_item(&item).await?;

                info!(
                    "Dispensed {} x{} for visit {}, remaining stock {}",
                    line.name, line.quantity, visit.id, item.stock
                );
            }
            Err(ClinicError::NotFound(_)) => {
                warn!(
                    "Prescription line {} references missing inventory item {}, skipped",
                    line.name, line.inventory_id
                );
                sink.notify(
                    &format!("药品 {} 不在库存中，该行未发药", line.name),
                    Severity::Error,
                );
            }
            Err(e) => return Err(e),
        }
    }

    visit.medications_dispensed = true;
    Ok(())
}
