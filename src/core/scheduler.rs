//! 关机调度模块
//!
//! 负责把用户选择的分钟数翻译成系统shutdown命令并跟踪当前是否已有计划。
//! 倒计时本身由操作系统负责，应用不做任何持久化。

use anyhow::{anyhow, bail, Result};
use log::{error, info, warn};
use tokio::process::Command as AsyncCommand;

/// 系统关机命令的程序名
const SHUTDOWN_PROGRAM: &str = "shutdown";

/// 取消关机计划的参数
const CANCEL_ARGS: [&str; 1] = ["-a"];

/// 构造设定关机的参数列表
///
/// # 参数
///
/// * `minutes` - 延时分钟数
///
/// # 返回值
///
/// 返回`shutdown`命令的完整参数，延时按秒传入
pub fn schedule_args(minutes: u32) -> [String; 3] {
    let seconds = u64::from(minutes) * 60;
    ["-s".to_string(), "-t".to_string(), seconds.to_string()]
}

/// 取消操作的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// 已向系统发出取消命令
    Cancelled,
    /// 当前没有已设定的计划，无需取消
    NothingScheduled,
}

/// 关机调度器
///
/// 只维护一个布尔状态：是否已向系统提交过关机计划
#[derive(Debug)]
pub struct ShutdownScheduler {
    /// 是否已设定关机计划
    scheduled: bool,
    /// 演练模式：只记录命令行而不真正执行
    dry_run: bool,
}

impl Default for ShutdownScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownScheduler {
    /// 创建新的关机调度器
    pub fn new() -> Self {
        Self {
            scheduled: false,
            dry_run: false,
        }
    }

    /// 创建演练模式的调度器
    ///
    /// 演练模式下所有命令只写入日志，状态变化与真实模式一致，
    /// 供测试和排查问题时使用
    pub fn with_dry_run() -> Self {
        Self {
            scheduled: false,
            dry_run: true,
        }
    }

    /// 当前是否存在已设定的关机计划
    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    /// 设定定时关机
    ///
    /// 把分钟数换算成秒后执行`shutdown -s -t <秒数>`。
    /// 如果已有计划，先取消旧计划再设定新的，保证重新设定真正生效。
    /// 已设定标志只跟随成功的命令变化，命令失败时保持原值。
    ///
    /// # 参数
    ///
    /// * `minutes` - 延时分钟数，必须大于0
    pub async fn schedule(&mut self, minutes: u32) -> Result<()> {
        if minutes == 0 {
            bail!("延时分钟数必须大于0");
        }

        if self.scheduled {
            info!("已存在关机计划，重新设定前先取消旧计划");
            if self.dry_run {
                info!("演练模式，跳过取消命令");
                self.scheduled = false;
            } else if let Err(e) = self.invoke_cancel().await {
                // 取消失败说明旧计划可能还在生效，保留标志再尝试设定，
                // 设定也失败时取消入口仍然能发出取消命令
                warn!("取消旧计划失败: {}", e);
            } else {
                self.scheduled = false;
            }
        }

        let args = schedule_args(minutes);
        info!(
            "设定定时关机: {}分钟后执行 ({} {})",
            minutes,
            SHUTDOWN_PROGRAM,
            args.join(" ")
        );

        if self.dry_run {
            info!("演练模式，跳过真实执行");
            self.scheduled = true;
            return Ok(());
        }

        let output = AsyncCommand::new(SHUTDOWN_PROGRAM)
            .args(&args)
            .output()
            .await
            .map_err(|e| anyhow!("执行shutdown命令失败: {}", e))?;

        if output.status.success() {
            self.scheduled = true;
            info!("关机计划已提交给系统");
            Ok(())
        } else {
            let error_msg = String::from_utf8_lossy(&output.stderr);
            error!("shutdown命令返回失败: {}", error_msg);
            Err(anyhow!("设定关机失败: {}", error_msg))
        }
    }

    /// 取消定时关机
    ///
    /// 没有已设定的计划时不执行任何命令，直接视为成功
    pub async fn cancel(&mut self) -> Result<CancelOutcome> {
        if !self.scheduled {
            info!("当前没有关机计划，无需取消");
            return Ok(CancelOutcome::NothingScheduled);
        }

        if self.dry_run {
            info!(
                "演练模式，跳过真实执行 ({} {})",
                SHUTDOWN_PROGRAM,
                CANCEL_ARGS.join(" ")
            );
            self.scheduled = false;
            return Ok(CancelOutcome::Cancelled);
        }

        self.invoke_cancel().await?;
        self.scheduled = false;
        info!("关机计划已取消");
        Ok(CancelOutcome::Cancelled)
    }

    /// 执行取消命令
    async fn invoke_cancel(&self) -> Result<()> {
        let output = AsyncCommand::new(SHUTDOWN_PROGRAM)
            .args(CANCEL_ARGS)
            .output()
            .await
            .map_err(|e| anyhow!("执行取消命令失败: {}", e))?;

        if output.status.success() {
            Ok(())
        } else {
            let error_msg = String::from_utf8_lossy(&output.stderr);
            Err(anyhow!("取消关机失败: {}", error_msg))
        }
    }

    /// 验证shutdown命令是否可用
    ///
    /// 只确认命令能够启动，参数不被识别时仅记录警告，
    /// 启动阶段调用一次，失败不阻止程序继续运行
    pub async fn validate_capability(&self) -> Result<()> {
        let output = AsyncCommand::new(SHUTDOWN_PROGRAM)
            .args(["-?"])
            .output()
            .await;

        match output {
            Ok(result) if result.status.success() => {
                info!("shutdown命令可用");
                Ok(())
            }
            Ok(_) => {
                warn!("shutdown命令存在但帮助参数不被识别");
                Ok(())
            }
            Err(e) => {
                error!("shutdown命令不可用: {}", e);
                Err(anyhow!("系统不支持shutdown命令: {}", e))
            }
        }
    }
}
