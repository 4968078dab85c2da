//! OffTimer - 一键定时关机小工具
//!
//! 为普通用户设计的定时关机工具：选一个档位或输入分钟数，
//! 倒计时交给操作系统，执行之前可以随时取消。

// 发布版本在Windows上不显示控制台窗口
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use anyhow::{anyhow, Result};
use log::{error, info};

mod app;
mod core;
mod ui;
mod utils;

use crate::app::App;
use crate::utils::logger::LogLevelConverter;
use crate::utils::{init_default_logger, init_logger, ConfigManager};

/// 应用程序入口点
///
/// 配置先于日志加载，因为日志参数来自配置文件
#[tokio::main]
async fn main() -> Result<()> {
    let config_manager = match ConfigManager::new() {
        Ok(manager) => manager,
        Err(e) => {
            // 配置加载失败时退回默认日志参数，保证失败原因能落盘
            let _ = init_default_logger();
            error!("加载配置失败: {}", e);
            return Err(anyhow!("加载配置失败: {}", e));
        }
    };

    let logger = init_logger(&config_manager.get_config().logging)
        .map_err(|e| anyhow!("初始化日志失败: {}", e))?;

    info!("OffTimer v{} 启动中...", env!("CARGO_PKG_VERSION"));
    info!("配置文件: {}", config_manager.get_config_path().display());
    info!(
        "日志级别: {}",
        LogLevelConverter::to_string(logger.get_log_level())
    );
    if let Some(path) = logger.get_log_file_path() {
        let stats = logger.get_log_stats();
        info!(
            "日志文件: {}（当前{}字节，历史{}个，合计{}字节）",
            path.display(),
            stats.current_file_size,
            stats.rotated_files,
            stats.total_size
        );
    }

    let app = App::new(config_manager).await?;
    if let Err(e) = app.run().await {
        error!("应用程序异常退出: {:#}", e);
        return Err(e);
    }

    info!("OffTimer 正常退出");
    Ok(())
}
