//! 核心业务逻辑模块
//!
//! 包含调度、校验与共享类型定义

pub mod scheduler;
pub mod types;
pub mod validation;

// 重新导出常用类型
pub use scheduler::{CancelOutcome, ShutdownScheduler};
pub use types::{ScheduleState, ScheduleUpdate, UIEvent, PRESET_DELAY_MINUTES};
pub use validation::DelayInputError;
