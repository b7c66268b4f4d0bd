//! 记录存取接口
//!
//! 工作流通过窄接口读写完整记录，不提供字段级局部更新。
//! 每个调用在工作流视角下同步完成，失败以错误形式抛出。

use async_trait::async_trait;
use clinic_core::{ClinicError, InventoryItem, Patient, Result, Visit};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// 记录存取接口
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get_visit(&self, id: Uuid) -> Result<Visit>;
    async fn save_visit(&self, visit: &Visit) -> Result<Visit>;
    /// 列出未完成的就诊记录（候诊队列视图的数据源）
    async fn list_active_visits(&self) -> Result<Vec<Visit>>;

    async fn get_patient(&self, id: Uuid) -> Result<Patient>;
    async fn save_patient(&self, patient: &Patient) -> Result<Patient>;

    async fn get_inventory_item(&self, id: Uuid) -> Result<InventoryItem>;
    async fn save_inventory_item(&self, item: &InventoryItem) -> Result<InventoryItem>;
}

/// 内存记录存取实现，用于测试与演示
#[derive(Debug, Default)]
pub struct MemoryStore {
    visits: RwLock<HashMap<Uuid, Visit>>,
    patients: RwLock<HashMap<Uuid, Patient>>,
    inventory: RwLock<HashMap<Uuid, InventoryItem>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get_visit(&self, id: Uuid) -> Result<Visit> {
        self.visits
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| ClinicError::NotFound(format!("Visit {} not found", id)))
    }

    async fn save_visit(&self, visit: &Visit) -> Result<Visit> {
        self.visits.write().await.insert(visit.id, visit.clone());
        Ok(visit.clone())
    }

    async fn list_active_visits(&self) -> Result<Vec<Visit>> {
        Ok(self
            .visits
            .read()
            .await
            .values()
            .filter(|visit| !visit.stage.is_terminal())
            .cloned()
            .collect())
    }

    async fn get_patient(&self, id: Uuid) -> Result<Patient> {
        self.patients
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| ClinicError::NotFound(format!("Patient {} not found", id)))
    }

    async fn save_patient(&self, patient: &Patient) -> Result<Patient> {
        self.patients.write().await.insert(patient.id, patient.clone());
        Ok(patient.clone())
    }

    async fn get_inventory_item(&self, id: Uuid) -> Result<InventoryItem> {
        self.inventory
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| ClinicError::NotFound(format!("Inventory item {} not found", id)))
    }

    async fn save_inventory_item(&self, item: &InventoryItem) -> Result<InventoryItem> {
        self.inventory.write().await.insert(item.id, item.clone());
        Ok(item.clone())
    }
}
