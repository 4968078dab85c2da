//! 核心类型定义
//!
//! 定义应用层与界面层共享的事件、结果与展示状态类型

use std::fmt;

use crate::ui::theme::ThemeType;

/// 预设的延时档位（分钟）
///
/// 主界面上的快捷按钮按此顺序排成网格
pub const PRESET_DELAY_MINUTES: [u32; 12] = [10, 20, 30, 40, 50, 60, 90, 120, 150, 180, 210, 240];

/// UI事件类型
///
/// 界面层发往后台事件循环的请求
#[derive(Debug, Clone, PartialEq)]
pub enum UIEvent {
    /// 设定定时关机（分钟数）
    ScheduleShutdown(u32),
    /// 取消已设定的关机
    CancelShutdown,
    /// 切换界面语言并写入配置
    ChangeLanguage(String),
    /// 切换主题并写入配置
    ChangeTheme(ThemeType),
    /// 退出应用
    Exit,
}

/// 计划执行结果
///
/// 后台事件循环通过广播通道回传给界面层
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleUpdate {
    /// 已设定定时关机
    Scheduled {
        /// 延时分钟数
        minutes: u32,
    },
    /// 设定失败
    ScheduleFailed(String),
    /// 已取消定时关机
    Cancelled,
    /// 取消时系统中没有待执行的计划
    NothingScheduled,
    /// 取消失败
    CancelFailed(String),
}

/// 界面展示用的计划状态
///
/// 结果栏根据该状态渲染本地化文本，切换语言后会重新翻译
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ScheduleState {
    /// 尚未设定任何计划
    #[default]
    Idle,
    /// 已设定，到时由系统执行关机
    Scheduled {
        /// 延时分钟数
        minutes: u32,
    },
    /// 计划已取消
    Cancelled,
    /// 取消时没有可取消的计划
    NothingScheduled,
}

impl ScheduleState {
    /// 当前是否存在已设定的关机计划
    pub fn is_scheduled(&self) -> bool {
        matches!(self, ScheduleState::Scheduled { .. })
    }
}

impl fmt::Display for ScheduleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleState::Idle => write!(f, "空闲"),
            ScheduleState::Scheduled { minutes } => write!(f, "已设定{}分钟后关机", minutes),
            ScheduleState::Cancelled => write!(f, "已取消"),
            ScheduleState::NothingScheduled => write!(f, "无可取消的计划"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_delays_ascending_and_unique() {
        for pair in PRESET_DELAY_MINUTES.windows(2) {
            assert!(pair[0] < pair[1], "档位应严格递增: {:?}", pair);
        }
        assert_eq!(PRESET_DELAY_MINUTES.len(), 12);
        assert_eq!(PRESET_DELAY_MINUTES[0], 10);
        assert_eq!(PRESET_DELAY_MINUTES[11], 240);
    }

    #[test]
    fn test_schedule_state_is_scheduled() {
        assert!(!ScheduleState::Idle.is_scheduled());
        assert!(ScheduleState::Scheduled { minutes: 30 }.is_scheduled());
        assert!(!ScheduleState::Cancelled.is_scheduled());
        assert!(!ScheduleState::NothingScheduled.is_scheduled());
    }

    #[test]
    fn test_schedule_state_default() {
        assert_eq!(ScheduleState::default(), ScheduleState::Idle);
    }

    #[test]
    fn test_schedule_state_display() {
        assert_eq!(ScheduleState::Idle.to_string(), "空闲");
        assert_eq!(
            ScheduleState::Scheduled { minutes: 45 }.to_string(),
            "已设定45分钟后关机"
        );
        assert_eq!(ScheduleState::Cancelled.to_string(), "已取消");
    }

    #[test]
    fn test_ui_event_equality() {
        assert_eq!(
            UIEvent::ScheduleShutdown(30),
            UIEvent::ScheduleShutdown(30)
        );
        assert_ne!(UIEvent::ScheduleShutdown(30), UIEvent::CancelShutdown);
    }
}
