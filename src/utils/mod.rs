//! 工具模块
//!
//! 包含配置、日志与本地化等辅助功能

pub mod config;
pub mod localization;
pub mod logger;

// 重新导出常用功能
pub use config::ConfigManager;
pub use localization::Localization;
pub use logger::{init_default_logger, init_logger};
