//! 基于 PostgreSQL 的记录存取实现

use crate::connection::DatabasePool;
use crate::queries::DatabaseQueries;
use async_trait::async_trait;
use clinic_core::{ClinicError, InventoryItem, Patient, Result, Visit};
use clinic_workflow::RecordStore;
use uuid::Uuid;

/// PostgreSQL 记录存取
///
/// 每个调用读写整条记录，失败以 ClinicError::Database 抛出；
/// 工作流层没有内建的重试，重试策略（若有）属于这一层。
pub struct PgRecordStore {
    pool: DatabasePool,
}

impl PgRecordStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn queries(&self) -> DatabaseQueries<'_> {
        DatabaseQueries::new(&self.pool)
    }

    /// 初始化数据库结构
    pub async fn init_schema(&self) -> Result<()> {
        self.queries().create_tables().await
    }

    /// 当前最大队列号
    pub async fn max_queue_number(&self) -> Result<i32> {
        self.queries().max_queue_number().await
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn get_visit(&self, id: Uuid) -> Result<Visit> {
        self.queries()
            .get_visit_by_id(&id)
            .await?
            .ok_or_else(|| ClinicError::NotFound(format!("Visit {} not found", id)))
    }

    async fn save_visit(&self, visit: &Visit) -> Result<Visit> {
        self.queries().save_visit(visit).await?;
        Ok(visit.clone())
    }

    async fn list_active_visits(&self) -> Result<Vec<Visit>> {
        self.queries().get_active_visits().await
    }

    async fn get_patient(&self, id: Uuid) -> Result<Patient> {
        self.queries()
            .get_patient_by_id(&id)
            .await?
            .ok_or_else(|| ClinicError::NotFound(format!("Patient {} not found", id)))
    }

    async fn save_patient(&self, patient: &Patient) -> Result<Patient> {
        self.queries().save_patient(patient).await?;
        Ok(patient.clone())
    }

    async fn get_inventory_item(&self, id: Uuid) -> Result<InventoryItem> {
        self.queries()
            .get_inventory_item_by_id(&id)
            .await?
            .ok_or_else(|| ClinicError::NotFound(format!("Inventory item {} not found", id)))
    }

    async fn save_inventory_item(&self, item: &InventoryItem) -> Result<InventoryItem> {
        self.queries().save_inventory_item(item).await?;
        Ok(item.clone())
    }
}
