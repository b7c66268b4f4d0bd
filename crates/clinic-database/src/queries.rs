//! 数据库查询操作

use crate::connection::DatabasePool;
use crate::models::*;
use clinic_core::{ClinicError, InventoryItem, Patient, Result, Visit};
use uuid::Uuid;

/// 数据库查询操作接口
pub struct DatabaseQueries<'a> {
    pool: &'a DatabasePool,
}

impl<'a> DatabaseQueries<'a> {
    pub fn new(pool: &'a DatabasePool) -> Self {
        Self { pool }
    }

    /// 创建数据库表
    pub async fn create_tables(&self) -> Result<()> {
        let pool = self.pool.pool();

        // 创建患者表
        sqlx::query(r#"
            CREATE TABLE IF NOT EXISTS patients (
                id UUID PRIMARY KEY,
                patient_number VARCHAR(64) UNIQUE NOT NULL,
                name VARCHAR(255) NOT NULL,
                history JSONB NOT NULL DEFAULT '[]',
                created_at TIMESTAMP WITH TIME ZONE DEFAULT NOW(),
                updated_at TIMESTAMP WITH TIME ZONE DEFAULT NOW()
            )
        "#).execute(pool).await.map_err(|e| ClinicError::Database(e.to_string()))?;

        // 创建就诊表
        sqlx::query(r#"
            CREATE TABLE IF NOT EXISTS visits (
                id UUID PRIMARY KEY,
                patient_id UUID NOT NULL REFERENCES patients(id),
                patient_name VARCHAR(255) NOT NULL,
                stage VARCHAR(20) NOT NULL DEFAULT 'VITALS',
                stage_start_time TIMESTAMP WITH TIME ZONE NOT NULL,
                queue_number INTEGER NOT NULL,
                priority VARCHAR(16) NOT NULL DEFAULT 'NORMAL',
                vitals JSONB,
                chief_complaint TEXT,
                diagnosis TEXT,
                doctor_notes TEXT,
                lab_orders JSONB NOT NULL DEFAULT '[]',
                prescription JSONB NOT NULL DEFAULT '[]',
                medications_dispensed BOOLEAN NOT NULL DEFAULT FALSE,
                consultation_fee BIGINT NOT NULL DEFAULT 0,
                total_bill BIGINT NOT NULL DEFAULT 0,
                payment_status VARCHAR(16) NOT NULL DEFAULT 'PENDING',
                created_at TIMESTAMP WITH TIME ZONE DEFAULT NOW(),
                updated_at TIMESTAMP WITH TIME ZONE DEFAULT NOW()
            )
        "#).execute(pool).await.map_err(|e| ClinicError::Database(e.to_string()))?;

        // 创建库存表
        sqlx::query(r#"
            CREATE TABLE IF NOT EXISTS inventory_items (
                id UUID PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                stock INTEGER NOT NULL DEFAULT 0,
                unit_price BIGINT NOT NULL DEFAULT 0,
                updated_at TIMESTAMP WITH TIME ZONE DEFAULT NOW()
            )
        "#).execute(pool).await.map_err(|e| ClinicError::Database(e.to_string()))?;

        // 创建索引以优化查询性能
        self.create_indexes().await?;

        tracing::info!("Database tables created successfully");
        Ok(())
    }

    /// 创建数据库索引
    async fn create_indexes(&self) -> Result<()> {
        let pool = self.pool.pool();

        let indexes = vec![
            "CREATE INDEX IF NOT EXISTS idx_patients_patient_number ON patients(patient_number)",
            "CREATE INDEX IF NOT EXISTS idx_visits_patient_id ON visits(patient_id)",
            "CREATE INDEX IF NOT EXISTS idx_visits_stage ON visits(stage)",
            "CREATE INDEX IF NOT EXISTS idx_visits_queue_number ON visits(queue_number)",
            "CREATE INDEX IF NOT EXISTS idx_inventory_items_name ON inventory_items(name)",
        ];

        for index_sql in indexes {
            sqlx::query(index_sql)
                .execute(pool)
                .await
                .map_err(|e| ClinicError::Database(e.to_string()))?;
        }

        tracing::info!("Database indexes created successfully");
        Ok(())
    }

    // ========== 就诊相关操作 ==========

    /// 整条写入就诊记录（存在则整条替换，无字段级局部更新）
    pub async fn save_visit(&self, visit: &Visit) -> Result<()> {
        let pool = self.pool.pool();

        let vitals = visit
            .vitals
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;
        let lab_orders = serde_json::to_value(&visit.lab_orders)?;
        let prescription = serde_json::to_value(&visit.prescription)?;

        sqlx::query(r#"
            INSERT INTO visits (
                id, patient_id, patient_name, stage, stage_start_time, queue_number,
                priority, vitals, chief_complaint, diagnosis, doctor_notes,
                lab_orders, prescription, medications_dispensed,
                consultation_fee, total_bill, payment_status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            ON CONFLICT (id) DO UPDATE SET
                patient_name = EXCLUDED.patient_name,
                stage = EXCLUDED.stage,
                stage_start_time = EXCLUDED.stage_start_time,
                priority = EXCLUDED.priority,
                vitals = EXCLUDED.vitals,
                chief_complaint = EXCLUDED.chief_complaint,
                diagnosis = EXCLUDED.diagnosis,
                doctor_notes = EXCLUDED.doctor_notes,
                lab_orders = EXCLUDED.lab_orders,
                prescription = EXCLUDED.prescription,
                medications_dispensed = EXCLUDED.medications_dispensed,
                consultation_fee = EXCLUDED.consultation_fee,
                total_bill = EXCLUDED.total_bill,
                payment_status = EXCLUDED.payment_status,
                updated_at = EXCLUDED.updated_at
        "#)
        .bind(visit.id)
        .bind(visit.patient_id)
        .bind(&visit.patient_name)
        .bind(stage_to_str(visit.stage))
        .bind(visit.stage_start_time)
        .bind(visit.queue_number)
        .bind(priority_to_str(visit.priority))
        .bind(vitals)
        .bind(&visit.chief_complaint)
        .bind(&visit.diagnosis)
        .bind(&visit.doctor_notes)
        .bind(lab_orders)
        .bind(prescription)
        .bind(visit.medications_dispensed)
        .bind(visit.consultation_fee)
        .bind(visit.total_bill)
        .bind(payment_status_to_str(visit.payment_status))
        .bind(visit.created_at)
        .bind(visit.updated_at)
        .execute(pool)
        .await
        .map_err(|e| ClinicError::Database(e.to_string()))?;

        Ok(())
    }

    /// 根据ID查找就诊记录
    pub async fn get_visit_by_id(&self, id: &Uuid) -> Result<Option<Visit>> {
        let pool = self.pool.pool();

        let result = sqlx::query_as::<_, DbVisit>("SELECT * FROM visits WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| ClinicError::Database(e.to_string()))?;

        result.map(Visit::try_from).transpose()
    }

    /// 获取所有未完成的就诊记录
    pub async fn get_active_visits(&self) -> Result<Vec<Visit>> {
        let pool = self.pool.pool();

        let results = sqlx::query_as::<_, DbVisit>(
            "SELECT * FROM visits WHERE stage != 'COMPLETED' ORDER BY queue_number",
        )
        .fetch_all(pool)
        .await
        .map_err(|e| ClinicError::Database(e.to_string()))?;

        results.into_iter().map(Visit::try_from).collect()
    }

    /// 当前最大队列号（服务重启后恢复挂号台计数用）
    pub async fn max_queue_number(&self) -> Result<i32> {
        let pool = self.pool.pool();

        let max: (i32,) =
            sqlx::query_as("SELECT COALESCE(MAX(queue_number), 0) FROM visits")
                .fetch_one(pool)
                .await
                .map_err(|e| ClinicError::Database(e.to_string()))?;

        Ok(max.0)
    }

    // ========== 患者相关操作 ==========

    /// 整条写入患者档案
    pub async fn save_patient(&self, patient: &Patient) -> Result<()> {
        let pool = self.pool.pool();
        let history = serde_json::to_value(&patient.history)?;

        sqlx::query(r#"
            INSERT INTO patients (id, patient_number, name, history, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                history = EXCLUDED.history,
                updated_at = EXCLUDED.updated_at
        "#)
        .bind(patient.id)
        .bind(&patient.patient_number)
        .bind(&patient.name)
        .bind(history)
        .bind(patient.created_at)
        .bind(patient.updated_at)
        .execute(pool)
        .await
        .map_err(|e| ClinicError::Database(e.to_string()))?;

        Ok(())
    }

    /// 根据ID查找患者
    pub async fn get_patient_by_id(&self, id: &Uuid) -> Result<Option<Patient>> {
        let pool = self.pool.pool();

        let result = sqlx::query_as::<_, DbPatient>("SELECT * FROM patients WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| ClinicError::Database(e.to_string()))?;

        result.map(Patient::try_from).transpose()
    }

    /// 根据患者编号查找患者
    pub async fn get_patient_by_number(&self, patient_number: &str) -> Result<Option<Patient>> {
        let pool = self.pool.pool();

        let result =
            sqlx::query_as::<_, DbPatient>("SELECT * FROM patients WHERE patient_number = $1")
                .bind(patient_number)
                .fetch_optional(pool)
                .await
                .map_err(|e| ClinicError::Database(e.to_string()))?;

        result.map(Patient::try_from).transpose()
    }

    // ========== 库存相关操作 ==========

    /// 整条写入库存药品
    pub async fn save_inventory_item(&self, item: &InventoryItem) -> Result<()> {
        let pool = self.pool.pool();

        sqlx::query(r#"
            INSERT INTO inventory_items (id, name, stock, unit_price, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                stock = EXCLUDED.stock,
                unit_price = EXCLUDED.unit_price,
                updated_at = EXCLUDED.updated_at
        "#)
        .bind(item.id)
        .bind(&item.name)
        .bind(item.stock)
        .bind(item.unit_price)
        .bind(item.updated_at)
        .execute(pool)
        .await
        .map_err(|e| ClinicError::Database(e.to_string()))?;

        Ok(())
    }

    /// 根据ID查找库存药品
    pub async fn get_inventory_item_by_id(&self, id: &Uuid) -> Result<Option<InventoryItem>> {
        let pool = self.pool.pool();

        let result =
            sqlx::query_as::<_, DbInventoryItem>("SELECT * FROM inventory_items WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await
                .map_err(|e| ClinicError::Database(e.to_string()))?;

        Ok(result.map(InventoryItem::from))
    }
}
