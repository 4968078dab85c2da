//! 应用程序主模块
//!
//! 负责协调各个子模块，管理应用程序的整体生命周期。
//! 关机命令的执行与配置写盘都发生在后台事件循环里，界面线程不碰磁盘

use anyhow::Result;
use log::{error, info, warn};
use tokio::sync::{broadcast, mpsc};

use crate::core::{CancelOutcome, ScheduleUpdate, ShutdownScheduler, UIEvent};
use crate::ui::run_with_params;
use crate::utils::{ConfigManager, Localization};

/// 后台结果广播通道的容量
///
/// 界面每500毫秒清空一次队列，正常情况下积压不会超过个位数
const UPDATE_CHANNEL_CAPACITY: usize = 32;

/// 应用程序主结构体
///
/// 管理所有核心组件和它们之间的通信
pub struct App {
    /// 配置管理器
    config_manager: ConfigManager,
    /// 本地化词典
    localization: Localization,
    /// 关机调度器
    scheduler: ShutdownScheduler,
}

impl App {
    /// 创建新的应用实例
    ///
    /// # 参数
    ///
    /// * `config_manager` - 已加载的配置管理器
    ///
    /// # 返回值
    ///
    /// 返回初始化完成的应用实例或错误
    pub async fn new(config_manager: ConfigManager) -> Result<Self> {
        info!("初始化应用组件...");

        // 配置问题不阻止启动，用默认值补齐并提醒用户
        let (valid, problems) = config_manager.validate_config();
        if !valid {
            for problem in &problems {
                warn!("配置问题: {}", problem);
            }
        }

        let config = config_manager.get_config();
        let localization =
            Localization::load(&config.app.language, config.app.lang_dir.as_deref());
        info!("界面语言: {}", localization.language());

        // shutdown命令不可用时仍然允许启动，真正设定时会把错误反馈给用户
        let scheduler = ShutdownScheduler::new();
        if let Err(e) = scheduler.validate_capability().await {
            warn!("shutdown命令检查未通过: {:#}", e);
        }

        Ok(Self {
            config_manager,
            localization,
            scheduler,
        })
    }

    /// 运行应用程序
    ///
    /// 先启动后台事件循环，再进入GUI主循环直到窗口关闭
    pub async fn run(self) -> Result<()> {
        info!("启动用户界面...");

        // GUI到后台的事件通道与回程的结果广播
        let (ui_event_sender, ui_event_receiver) = mpsc::unbounded_channel::<UIEvent>();
        let (update_sender, update_receiver) =
            broadcast::channel::<ScheduleUpdate>(UPDATE_CHANNEL_CAPACITY);

        let config = self.config_manager.get_config();
        let lang_dir = config.app.lang_dir.clone();
        let theme_type = config.ui.theme_type;

        tokio::spawn(backend_event_loop(
            self.scheduler,
            self.config_manager,
            ui_event_receiver,
            update_sender,
        ));

        // GUI主循环会一直阻塞到窗口关闭
        run_with_params(
            self.localization,
            lang_dir,
            theme_type,
            Some(update_receiver),
            Some(ui_event_sender),
        )?;

        Ok(())
    }
}

/// 后台事件处理循环
///
/// 依次消费界面发来的事件：关机请求交给调度器并把结果广播回去，
/// 设置变更直接写进配置文件
async fn backend_event_loop(
    mut scheduler: ShutdownScheduler,
    mut config_manager: ConfigManager,
    mut events: mpsc::UnboundedReceiver<UIEvent>,
    updates: broadcast::Sender<ScheduleUpdate>,
) {
    info!("启动后台事件处理循环");

    while let Some(event) = events.recv().await {
        info!("收到UI事件: {:?}", event);
        match event {
            UIEvent::ScheduleShutdown(minutes) => {
                let update = match scheduler.schedule(minutes).await {
                    Ok(()) => ScheduleUpdate::Scheduled { minutes },
                    Err(e) => {
                        error!("设定关机失败: {:#}", e);
                        ScheduleUpdate::ScheduleFailed(format!("{:#}", e))
                    }
                };
                if let Err(e) = updates.send(update) {
                    warn!("回传结果失败: {}", e);
                }
            }
            UIEvent::CancelShutdown => {
                let update = match scheduler.cancel().await {
                    Ok(CancelOutcome::Cancelled) => ScheduleUpdate::Cancelled,
                    Ok(CancelOutcome::NothingScheduled) => ScheduleUpdate::NothingScheduled,
                    Err(e) => {
                        error!("取消关机失败: {:#}", e);
                        ScheduleUpdate::CancelFailed(format!("{:#}", e))
                    }
                };
                if let Err(e) = updates.send(update) {
                    warn!("回传结果失败: {}", e);
                }
            }
            UIEvent::ChangeLanguage(language) => {
                config_manager.get_config_mut().app.language = language;
                if let Err(e) = config_manager.save_config() {
                    error!("保存语言设置失败: {}", e);
                }
            }
            UIEvent::ChangeTheme(theme_type) => {
                config_manager.get_config_mut().ui.theme_type = theme_type;
                if let Err(e) = config_manager.save_config() {
                    error!("保存主题设置失败: {}", e);
                }
            }
            UIEvent::Exit => {
                // 界面线程随后就会结束进程，这里只负责干净地收尾
                info!("后台事件循环收到退出请求");
                break;
            }
        }
    }

    info!("后台事件处理循环结束");
}
