//! 诊所服务器主程序

use clap::Parser;
use clinic_core::{ClinicError, Result};
use clinic_database::{DatabasePool, PgRecordStore};
use clinic_web::WebServer;
use clinic_workflow::{CheckInDesk, TracingSink, VisitWorkflow};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

mod config;
use config::ClinicConfig;

/// 诊所服务器命令行参数
#[derive(Parser, Debug)]
#[command(name = "clinic-server")]
#[command(about = "诊所就诊流程管理服务器")]
struct Args {
    /// 监听端口（覆盖配置文件）
    #[arg(short, long)]
    port: Option<u16>,

    /// 数据库连接串（覆盖配置文件）
    #[arg(short, long)]
    database_url: Option<String>,

    /// 配置文件路径
    #[arg(short, long)]
    config: Option<String>,

    /// 日志级别
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(args.log_level.as_str())
        .init();

    info!("启动诊所服务器...");

    let mut config = ClinicConfig::load(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(database_url) = args.database_url {
        config.database.url = database_url;
    }

    info!("诊所服务器配置:");
    info!("  监听地址: {}:{}", config.server.host, config.server.port);
    info!("  数据库最大连接数: {}", config.database.max_connections);

    // 连接数据库并初始化表结构
    let pool =
        DatabasePool::connect(&config.database.url, config.database.max_connections).await?;
    let store = PgRecordStore::new(pool);
    store.init_schema().await?;

    // 服务重启后从数据库恢复挂号台队列号计数
    let next_queue_number = store.max_queue_number().await? + 1;
    info!("  下一个队列号: {}", next_queue_number);

    let workflow = VisitWorkflow::new(Arc::new(store), Arc::new(TracingSink::new()))
        .with_checkin_desk(CheckInDesk::starting_from(next_queue_number));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| ClinicError::Config(format!("无效监听地址: {}", e)))?;

    // 创建并启动Web服务器
    let server = WebServer::new(addr, Arc::new(workflow));
    if let Err(e) = server.run().await {
        error!("服务器启动失败: {}", e);
        return Err(e);
    }

    Ok(())
}
