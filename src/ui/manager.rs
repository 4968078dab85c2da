//! UI管理器模块
//!
//! 负责管理整个用户界面，使用iced框架实现跨平台GUI。
//! 关机请求通过通道交给后台处理，结果由定时轮询收回来

use std::path::PathBuf;

use iced::keyboard::{self, key};
use iced::widget::{column, container, text, Space};
use iced::{
    executor, window, Alignment, Application, Command, Element, Font, Length, Settings,
    Theme as IcedTheme,
};
use log::{error, info, warn};
use tokio::sync::{broadcast, mpsc};

use crate::core::{validation, DelayInputError, ScheduleState, ScheduleUpdate, UIEvent};
use crate::ui::components::{self, LanguageChoice};
use crate::ui::theme::{Theme, ThemeType};
use crate::utils::Localization;

/// 应用程序消息类型
///
/// 定义了应用程序中所有可能的用户交互和系统事件
#[derive(Debug, Clone)]
pub enum Message {
    /// 输入框内容改变
    EntryChanged(String),
    /// 点击设定按钮或在输入框中回车
    ProgramPressed,
    /// 点击预设档位按钮
    PresetPressed(u32),
    /// 点击取消关机按钮
    CancelPressed,
    /// 点击退出按钮
    ExitPressed,
    /// 打开关于弹窗
    ShowAbout,
    /// 打开设置弹窗
    ShowSettings,
    /// 关闭当前弹窗
    CloseDialog,
    /// 在设置中选择语言
    LanguageSelected(LanguageChoice),
    /// 在设置中切换主题
    ToggleTheme,
    /// 轮询后台结果
    PollUpdates,
    /// 全局回车
    EnterPressed,
    /// 全局Escape
    EscapePressed,
}

/// 当前打开的模态弹窗
#[derive(Debug, Clone, PartialEq)]
pub enum ActiveDialog {
    /// 关于弹窗
    Info,
    /// 错误弹窗
    Error {
        /// 弹窗标题
        title: String,
        /// 展示给用户的提示文本
        body: String,
    },
    /// 设置弹窗
    Settings,
}

/// UI管理器应用程序状态
///
/// 使用iced的Application trait实现GUI应用程序
#[derive(Debug)]
pub struct UIManager {
    /// 输入框文本
    entry: String,
    /// 结果栏展示的计划状态
    schedule_state: ScheduleState,
    /// 输入校验错误
    entry_error: Option<DelayInputError>,
    /// 当前打开的弹窗
    dialog: Option<ActiveDialog>,
    /// 当前主题
    theme: Theme,
    /// 本地化词典
    localization: Localization,
    /// 外部词典目录，切换语言时重新加载用
    lang_dir: Option<PathBuf>,
    /// UI事件发送器
    ui_event_sender: Option<mpsc::UnboundedSender<UIEvent>>,
    /// 后台结果接收器
    update_receiver: Option<broadcast::Receiver<ScheduleUpdate>>,
}

impl UIManager {
    /// 发送UI事件
    ///
    /// # 参数
    ///
    /// * `event` - UI事件
    fn send_ui_event(&self, event: UIEvent) {
        if let Some(sender) = &self.ui_event_sender {
            if let Err(e) = sender.send(event) {
                error!("发送UI事件失败: {}", e);
            }
        }
    }

    /// 校验输入框内容并发起设定
    ///
    /// 校验失败只在输入框下方提示，不打扰后台
    fn submit_custom_entry(&mut self) {
        match validation::parse_delay_minutes(&self.entry) {
            Ok(minutes) => {
                info!("自定义延时通过校验: {}分钟", minutes);
                self.entry_error = None;
                self.send_ui_event(UIEvent::ScheduleShutdown(minutes));
            }
            Err(e) => {
                info!("自定义延时校验失败: {}", e);
                self.entry_error = Some(e);
            }
        }
    }

    /// 应用后台回传的结果
    ///
    /// # 参数
    ///
    /// * `update` - 后台结果消息
    fn handle_schedule_update(&mut self, update: ScheduleUpdate) {
        info!("收到后台结果: {:?}", update);
        match update {
            ScheduleUpdate::Scheduled { minutes } => {
                self.schedule_state = ScheduleState::Scheduled { minutes };
                // 设定成功后清空输入框
                self.entry.clear();
            }
            ScheduleUpdate::ScheduleFailed(detail) => {
                error!("设定关机失败: {}", detail);
                self.dialog = Some(ActiveDialog::Error {
                    title: self.localization.text("error-title"),
                    body: self.localization.text("schedule-error"),
                });
            }
            ScheduleUpdate::Cancelled => {
                self.schedule_state = ScheduleState::Cancelled;
                self.entry.clear();
            }
            ScheduleUpdate::NothingScheduled => {
                self.schedule_state = ScheduleState::NothingScheduled;
            }
            ScheduleUpdate::CancelFailed(detail) => {
                error!("取消关机失败: {}", detail);
                self.dialog = Some(ActiveDialog::Error {
                    title: self.localization.text("error-title"),
                    body: self.localization.text("cancel-error"),
                });
            }
        }
    }

    /// 把广播通道中积压的结果全部取出
    fn drain_updates(&mut self) -> Vec<ScheduleUpdate> {
        let mut updates = Vec::new();
        if let Some(receiver) = &mut self.update_receiver {
            loop {
                match receiver.try_recv() {
                    Ok(update) => updates.push(update),
                    Err(broadcast::error::TryRecvError::Empty) => break,
                    Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                        warn!("后台结果滞后，跳过了{}条消息", skipped);
                        continue;
                    }
                    Err(broadcast::error::TryRecvError::Closed) => {
                        warn!("后台结果通道已关闭");
                        break;
                    }
                }
            }
        }
        updates
    }
}

/// 运行UI应用程序
///
/// # 参数
///
/// * `localization` - 按配置加载好的本地化词典
/// * `lang_dir` - 外部词典目录
/// * `theme_type` - 配置中记录的主题类型
/// * `update_receiver` - 后台结果接收器
/// * `ui_event_sender` - UI事件发送器
///
/// # 返回值
///
/// 返回iced应用程序的运行结果
pub fn run_with_params(
    localization: Localization,
    lang_dir: Option<PathBuf>,
    theme_type: ThemeType,
    update_receiver: Option<broadcast::Receiver<ScheduleUpdate>>,
    ui_event_sender: Option<mpsc::UnboundedSender<UIEvent>>,
) -> iced::Result {
    let flags = (
        localization,
        lang_dir,
        theme_type,
        update_receiver,
        ui_event_sender,
    );
    let settings = Settings {
        id: None,
        window: window::Settings {
            size: iced::Size::new(560.0, 700.0),
            position: window::Position::Centered,
            min_size: None,
            max_size: None,
            visible: true,
            resizable: false,
            decorations: true,
            transparent: false,
            level: window::Level::Normal,
            icon: None,
            platform_specific: Default::default(),
            exit_on_close_request: true,
        },
        flags,
        fonts: vec![],
        default_font: Font::with_name("Microsoft YaHei"),
        default_text_size: iced::Pixels(16.0),
        antialiasing: false,
    };
    UIManager::run(settings)
}

/// 全局快捷键映射
///
/// 只在没有控件消费按键时触发，输入框里的回车由输入框自己处理
fn handle_hotkey(key: keyboard::Key, _modifiers: keyboard::Modifiers) -> Option<Message> {
    match key {
        keyboard::Key::Named(key::Named::Enter) => Some(Message::EnterPressed),
        keyboard::Key::Named(key::Named::Escape) => Some(Message::EscapePressed),
        _ => None,
    }
}

impl Application for UIManager {
    type Message = Message;
    type Theme = IcedTheme;
    type Executor = executor::Default;
    type Flags = (
        Localization,
        Option<PathBuf>,
        ThemeType,
        Option<broadcast::Receiver<ScheduleUpdate>>,
        Option<mpsc::UnboundedSender<UIEvent>>,
    );

    /// 订阅外部事件
    ///
    /// 定时器轮询后台结果，键盘订阅处理全局快捷键
    fn subscription(&self) -> iced::Subscription<Self::Message> {
        iced::Subscription::batch([
            iced::time::every(std::time::Duration::from_millis(500)).map(|_| Message::PollUpdates),
            keyboard::on_key_press(handle_hotkey),
        ])
    }

    /// 创建应用程序实例
    fn new(flags: Self::Flags) -> (Self, Command<Self::Message>) {
        let (localization, lang_dir, theme_type, update_receiver, ui_event_sender) = flags;
        info!(
            "创建UIManager实例，语言: {}，后台接收器: {}",
            localization.language(),
            if update_receiver.is_some() {
                "已设置"
            } else {
                "未设置"
            }
        );

        let ui_manager = Self {
            entry: String::new(),
            schedule_state: ScheduleState::Idle,
            entry_error: None,
            dialog: None,
            theme: Theme::apply_theme(theme_type),
            localization,
            lang_dir,
            ui_event_sender,
            update_receiver,
        };

        (ui_manager, Command::none())
    }

    /// 应用程序标题
    fn title(&self) -> String {
        self.localization.text("app-title")
    }

    /// 处理消息更新
    fn update(&mut self, message: Self::Message) -> Command<Self::Message> {
        match message {
            Message::EntryChanged(raw) => {
                // 粘贴进来的非法字符也在这里被过滤掉
                self.entry = validation::sanitize_entry(&raw);
                self.entry_error = None;
                Command::none()
            }
            Message::ProgramPressed => {
                self.submit_custom_entry();
                Command::none()
            }
            Message::PresetPressed(minutes) => {
                info!("选择预设档位: {}分钟", minutes);
                self.entry_error = None;
                self.send_ui_event(UIEvent::ScheduleShutdown(minutes));
                Command::none()
            }
            Message::CancelPressed => {
                info!("用户请求取消关机");
                self.entry_error = None;
                self.send_ui_event(UIEvent::CancelShutdown);
                Command::none()
            }
            Message::ExitPressed => {
                info!("用户请求退出应用程序");
                self.send_ui_event(UIEvent::Exit);
                std::process::exit(0);
            }
            Message::ShowAbout => {
                info!("打开关于弹窗");
                self.dialog = Some(ActiveDialog::Info);
                Command::none()
            }
            Message::ShowSettings => {
                info!("打开设置弹窗");
                self.dialog = Some(ActiveDialog::Settings);
                Command::none()
            }
            Message::CloseDialog => {
                self.dialog = None;
                Command::none()
            }
            Message::LanguageSelected(choice) => {
                info!("切换界面语言: {}", choice.code);
                self.localization = Localization::load(choice.code, self.lang_dir.as_deref());
                self.send_ui_event(UIEvent::ChangeLanguage(choice.code.to_string()));
                Command::none()
            }
            Message::ToggleTheme => {
                self.theme = Theme::toggle_theme(self.theme.theme_type);
                info!("切换主题: {}", self.theme.name);
                self.send_ui_event(UIEvent::ChangeTheme(self.theme.theme_type));
                Command::none()
            }
            Message::PollUpdates => {
                // 先收集再处理，避免同时持有接收器和状态的可变借用
                let updates = self.drain_updates();
                for update in updates {
                    self.handle_schedule_update(update);
                }
                Command::none()
            }
            Message::EnterPressed => {
                // 弹窗打开时回车只用来关闭弹窗
                if self.dialog.is_some() {
                    self.dialog = None;
                } else {
                    self.submit_custom_entry();
                }
                Command::none()
            }
            Message::EscapePressed => {
                if self.dialog.is_some() {
                    self.dialog = None;
                } else {
                    info!("Escape请求取消关机");
                    self.entry_error = None;
                    self.send_ui_event(UIEvent::CancelShutdown);
                }
                Command::none()
            }
        }
    }

    /// 构建用户界面
    ///
    /// 弹窗打开时整个视图替换为弹窗内容
    fn view(&self) -> Element<Self::Message> {
        if let Some(dialog) = &self.dialog {
            return match dialog {
                ActiveDialog::Info => components::info_dialog(&self.localization, &self.theme),
                ActiveDialog::Error { title, body } => components::error_dialog(
                    &self.localization,
                    &self.theme,
                    title.clone(),
                    body.clone(),
                ),
                ActiveDialog::Settings => components::settings_dialog(
                    &self.localization,
                    &self.theme,
                    self.theme.theme_type,
                ),
            };
        }

        let mut content = column![
            components::title_bar(&self.localization, &self.theme),
            Space::with_height(20),
            text(self.localization.text("choose-delay-label"))
                .size(17)
                .style(self.theme.text_color()),
            Space::with_height(12),
            components::preset_grid(&self.localization),
            Space::with_height(20),
            components::entry_row(
                &self.localization,
                &self.entry,
                self.schedule_state.is_scheduled(),
            ),
        ]
        .padding(24)
        .align_items(Alignment::Center);

        if let Some(error) = &self.entry_error {
            content = content.push(Space::with_height(8));
            content = content.push(components::entry_error_line(
                &self.localization,
                &self.theme,
                error,
            ));
        }

        content = content.push(Space::with_height(20));
        content = content.push(components::result_panel(
            &self.localization,
            &self.theme,
            &self.schedule_state,
        ));
        content = content.push(Space::with_height(24));
        content = content.push(components::bottom_row(&self.localization));

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x()
            .style(self.theme.root_appearance())
            .into()
    }

    /// 应用程序主题
    fn theme(&self) -> Self::Theme {
        self.theme.iced_theme()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_manager(
        ui_event_sender: Option<mpsc::UnboundedSender<UIEvent>>,
        update_receiver: Option<broadcast::Receiver<ScheduleUpdate>>,
    ) -> UIManager {
        UIManager {
            entry: String::new(),
            schedule_state: ScheduleState::Idle,
            entry_error: None,
            dialog: None,
            theme: Theme::light_theme(),
            localization: Localization::load("en", None),
            lang_dir: None,
            ui_event_sender,
            update_receiver,
        }
    }

    #[test]
    fn test_entry_input_is_sanitized() {
        let mut manager = test_manager(None, None);

        let _command = manager.update(Message::EntryChanged("12ab345".to_string()));
        assert_eq!(manager.entry, "1234");

        let _command = manager.update(Message::EntryChanged("abc".to_string()));
        assert_eq!(manager.entry, "");
    }

    #[test]
    fn test_program_with_empty_entry_shows_error() {
        let mut manager = test_manager(None, None);

        let _command = manager.update(Message::ProgramPressed);
        assert_eq!(manager.entry_error, Some(DelayInputError::Empty));

        // 重新输入后错误提示消失
        let _command = manager.update(Message::EntryChanged("3".to_string()));
        assert!(manager.entry_error.is_none());
    }

    #[test]
    fn test_valid_entry_sends_schedule_event() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let mut manager = test_manager(Some(sender), None);

        let _command = manager.update(Message::EntryChanged("45".to_string()));
        let _command = manager.update(Message::ProgramPressed);

        assert!(manager.entry_error.is_none());
        assert_eq!(receiver.try_recv().unwrap(), UIEvent::ScheduleShutdown(45));
    }

    #[test]
    fn test_preset_press_sends_event_and_clears_error() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let mut manager = test_manager(Some(sender), None);
        manager.entry_error = Some(DelayInputError::Empty);

        let _command = manager.update(Message::PresetPressed(90));

        assert!(manager.entry_error.is_none());
        assert_eq!(receiver.try_recv().unwrap(), UIEvent::ScheduleShutdown(90));
    }

    #[test]
    fn test_scheduled_update_sets_state_and_clears_entry() {
        let mut manager = test_manager(None, None);
        manager.entry = "30".to_string();

        manager.handle_schedule_update(ScheduleUpdate::Scheduled { minutes: 30 });

        assert!(manager.schedule_state.is_scheduled());
        assert_eq!(
            manager.schedule_state,
            ScheduleState::Scheduled { minutes: 30 }
        );
        assert!(manager.entry.is_empty());
    }

    #[test]
    fn test_failure_update_opens_error_dialog() {
        let mut manager = test_manager(None, None);

        manager.handle_schedule_update(ScheduleUpdate::ScheduleFailed("拒绝访问".to_string()));

        match &manager.dialog {
            Some(ActiveDialog::Error { title, body }) => {
                assert_eq!(title, "Error");
                // 弹窗只展示概括提示，命令输出的细节只进日志
                assert!(!body.contains("拒绝访问"));
            }
            other => panic!("应当打开错误弹窗: {:?}", other),
        }
    }

    #[test]
    fn test_poll_updates_drains_broadcast_queue() {
        let (update_sender, update_receiver) = broadcast::channel(16);
        let mut manager = test_manager(None, Some(update_receiver));

        update_sender
            .send(ScheduleUpdate::Scheduled { minutes: 10 })
            .unwrap();
        update_sender.send(ScheduleUpdate::Cancelled).unwrap();

        let _command = manager.update(Message::PollUpdates);

        // 两条结果按顺序应用，最终停在取消状态
        assert_eq!(manager.schedule_state, ScheduleState::Cancelled);
    }

    #[test]
    fn test_enter_closes_dialog_before_submitting() {
        let mut manager = test_manager(None, None);
        manager.dialog = Some(ActiveDialog::Info);

        let _command = manager.update(Message::EnterPressed);

        assert!(manager.dialog.is_none());
        // 输入为空，如果回车落到了输入处理上会产生错误提示
        assert!(manager.entry_error.is_none());
    }

    #[test]
    fn test_escape_closes_dialog_or_cancels() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let mut manager = test_manager(Some(sender), None);
        manager.dialog = Some(ActiveDialog::Settings);

        let _command = manager.update(Message::EscapePressed);
        assert!(manager.dialog.is_none());
        assert!(receiver.try_recv().is_err());

        let _command = manager.update(Message::EscapePressed);
        assert_eq!(receiver.try_recv().unwrap(), UIEvent::CancelShutdown);
    }

    #[test]
    fn test_language_switch_reloads_dictionary_and_notifies_backend() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let mut manager = test_manager(Some(sender), None);

        let choice = LanguageChoice {
            code: "es",
            label: "Español",
        };
        let _command = manager.update(Message::LanguageSelected(choice));

        assert_eq!(manager.localization.language(), "es");
        assert_eq!(
            receiver.try_recv().unwrap(),
            UIEvent::ChangeLanguage("es".to_string())
        );
    }

    #[test]
    fn test_theme_toggle_sends_change_event() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let mut manager = test_manager(Some(sender), None);

        let _command = manager.update(Message::ToggleTheme);

        assert_eq!(manager.theme.theme_type, ThemeType::Dark);
        assert_eq!(
            receiver.try_recv().unwrap(),
            UIEvent::ChangeTheme(ThemeType::Dark)
        );
    }

    #[test]
    fn test_hotkey_mapping() {
        assert!(matches!(
            handle_hotkey(
                keyboard::Key::Named(key::Named::Enter),
                keyboard::Modifiers::empty()
            ),
            Some(Message::EnterPressed)
        ));
        assert!(matches!(
            handle_hotkey(
                keyboard::Key::Named(key::Named::Escape),
                keyboard::Modifiers::empty()
            ),
            Some(Message::EscapePressed)
        ));
        assert!(handle_hotkey(
            keyboard::Key::Named(key::Named::Space),
            keyboard::Modifiers::empty()
        )
        .is_none());
    }
}
