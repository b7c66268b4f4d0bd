//! 配置管理
//!
//! 默认值 < 配置文件 < 环境变量 (CLINIC_ 前缀)，命令行参数最后覆盖

use clinic_core::{ClinicError, Result};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 诊所服务器完整配置
#[derive(Debug, Clone, Deserialize)]
pub struct ClinicConfig {
    /// 服务器配置
    pub server: ServerConfig,
    /// 数据库配置
    pub database: DatabaseConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听主机
    pub host: String,
    /// 监听端口
    pub port: u16,
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 连接字符串
    pub url: String,
    /// 最大连接数
    pub max_connections: u32,
}

impl ClinicConfig {
    /// 加载配置
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        Self::build(config_path).map_err(|e| ClinicError::Config(e.to_string()))
    }

    fn build(config_path: Option<&str>) -> std::result::Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080i64)?
            .set_default("database.url", "postgres://localhost/clinic")?
            .set_default("database.max_connections", 5i64)?;

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path));
        }
        builder = builder.add_source(Environment::with_prefix("CLINIC").separator("__"));

        builder.build()?.try_deserialize()
    }
}
