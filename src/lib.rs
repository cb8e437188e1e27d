// ==========================================
// 文件编码管理 - 核心库
// ==========================================
// 范围: 父/子编码的表格批量导入、对账、批量执行与导出
// 技术栈: Rust + SQLite（本地配置/审计）+ 远程 HTTP API（编码持久化）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "es");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 远程 API 与本地审计
pub mod repository;

// 引擎层 - 对账与批量执行
pub mod engine;

// 导入层 - 表格解析 / 导出 / 报告
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 共享状态与导入向导
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::CodeStatus;

// 领域实体
pub use domain::{ChildCode, ImportPlan, ImportRow, ImportSummary, ParentCode};

// 引擎
pub use engine::{BulkApplyOrchestrator, Reconciler};

// API
pub use api::{ApiError, ImportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "文件编码管理";
