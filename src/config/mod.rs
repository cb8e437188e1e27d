// ==========================================
// 文件编码管理 - 配置层
// ==========================================
// 职责: 系统配置管理（远程地址、超时、输出目录、语言）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod import_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use import_config_trait::ImportConfigReader;
