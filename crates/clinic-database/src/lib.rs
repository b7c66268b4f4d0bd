//! # 诊所数据库模块
//!
//! 负责就诊、患者与库存记录的存储，提供PostgreSQL连接池、
//! 完整的整条读写操作以及 RecordStore 接口实现。

pub mod connection;
pub mod models;
pub mod queries;
pub mod store;

// 重新导出主要类型
pub use connection::DatabasePool;
pub use queries::DatabaseQueries;
pub use store::PgRecordStore;
