//! # 诊所Web模块
//!
//! 面向操作员的轻量HTTP接口，覆盖挂号、阶段数据录入、阶段推进、
//! 候诊队列与账单查询。不含认证会话与页面渲染。

pub mod handlers;
pub mod server;

pub use handlers::AppState;
pub use server::WebServer;
