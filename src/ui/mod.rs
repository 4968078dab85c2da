//! 用户界面模块
//!
//! 包含GUI窗口、界面组件和主题相关的所有组件

pub mod components;
pub mod manager;
pub mod theme;

// 重新导出主要组件
pub use manager::run_with_params;
