//! 输入校验模块
//!
//! 负责校验自定义分钟数输入，保证交给调度器的永远是合法的正整数

use log::debug;
use thiserror::Error;

/// Windows shutdown命令 /t 参数允许的最大秒数（10年）
const MAX_DELAY_SECONDS: u64 = 315_360_000;

/// 允许设定的最大延时（分钟）
pub const MAX_DELAY_MINUTES: u32 = (MAX_DELAY_SECONDS / 60) as u32;

/// 输入框允许的最大位数
pub const ENTRY_MAX_DIGITS: usize = 4;

/// 自定义分钟数的校验错误
///
/// 界面层把每个变体映射为对应的本地化提示文本
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DelayInputError {
    /// 输入为空
    #[error("输入为空")]
    Empty,
    /// 输入不是有效的整数
    #[error("输入不是有效的整数")]
    NotANumber,
    /// 输入不是正数
    #[error("分钟数必须大于0")]
    NotPositive,
    /// 超过允许的最大延时
    #[error("分钟数超过上限{max}")]
    TooLarge {
        /// 允许的上限（分钟）
        max: u32,
    },
}

/// 解析并校验自定义分钟数
///
/// # 参数
///
/// * `input` - 输入框中的原始文本
///
/// # 返回值
///
/// 校验通过返回分钟数，否则返回对应的校验错误
pub fn parse_delay_minutes(input: &str) -> Result<u32, DelayInputError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DelayInputError::Empty);
    }

    let minutes: i64 = match trimmed.parse() {
        Ok(value) => value,
        Err(_) => {
            // 纯数字串解析失败只可能是超出i64范围，按超限处理；其余情况属于非法数字
            let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
            if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                return Err(DelayInputError::TooLarge {
                    max: MAX_DELAY_MINUTES,
                });
            }
            return Err(DelayInputError::NotANumber);
        }
    };

    if minutes <= 0 {
        return Err(DelayInputError::NotPositive);
    }

    if minutes > i64::from(MAX_DELAY_MINUTES) {
        return Err(DelayInputError::TooLarge {
            max: MAX_DELAY_MINUTES,
        });
    }

    debug!("自定义分钟数校验通过: {}", minutes);
    Ok(minutes as u32)
}

/// 过滤输入框文本
///
/// 只保留ASCII数字并截断到允许的最大位数，
/// 用于输入回调中拦截粘贴进来的非法字符
///
/// # 参数
///
/// * `raw` - 输入回调传入的完整文本
///
/// # 返回值
///
/// 过滤后可以写回输入框的文本
pub fn sanitize_entry(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit())
        .take(ENTRY_MAX_DIGITS)
        .collect()
}
