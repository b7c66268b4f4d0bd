//! 错误定义模块

use thiserror::Error;

/// 诊所系统统一错误类型
#[derive(Error, Debug)]
pub enum ClinicError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("数据库错误: {0}")]
    Database(String),

    #[error("网络错误: {0}")]
    Network(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("验证错误: {0}")]
    Validation(String),

    #[error("系统内部错误: {0}")]
    Internal(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("工作流错误: {0}")]
    Workflow(String),

    #[error("无效阶段转换: 从 {from} 触发 {event}")]
    InvalidStageTransition { from: String, event: String },
}

/// 诊所系统统一结果类型
pub type Result<T> = std::result::Result<T, ClinicError>;
