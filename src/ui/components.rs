//! UI组件模块
//!
//! 提供主窗口各个区块与模态弹窗的纯构造函数，
//! 所有状态由管理器持有，这里只负责把状态翻译成控件树

use std::fmt;

use iced::alignment::Horizontal;
use iced::widget::{button, column, container, pick_list, row, text, text_input, Space};
use iced::{Alignment, Element, Length};

use crate::core::{DelayInputError, ScheduleState, PRESET_DELAY_MINUTES};
use crate::ui::manager::Message;
use crate::ui::theme::{Theme, ThemeType};
use crate::utils::Localization;

/// 设置弹窗中可选的界面语言
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageChoice {
    /// 词典代码
    pub code: &'static str,
    /// 下拉框中显示的名称
    pub label: &'static str,
}

impl fmt::Display for LanguageChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// 语言下拉框的选项，与内置词典一一对应
pub const LANGUAGE_CHOICES: [LanguageChoice; 3] = [
    LanguageChoice {
        code: "en",
        label: "English",
    },
    LanguageChoice {
        code: "es",
        label: "Español",
    },
    LanguageChoice {
        code: "zh-CN",
        label: "简体中文",
    },
];

/// 构建标题栏
///
/// 左侧是应用标题，右侧是关于与设置按钮
pub fn title_bar(localization: &Localization, theme: &Theme) -> Element<'static, Message> {
    let title = text(localization.text("app-title"))
        .size(24)
        .style(theme.text_color());

    let about_button = button(text(localization.text("about-button")).size(14))
        .on_press(Message::ShowAbout)
        .padding(8)
        .style(iced::theme::Button::Secondary);

    let settings_button = button(text(localization.text("settings-button")).size(14))
        .on_press(Message::ShowSettings)
        .padding(8)
        .style(iced::theme::Button::Secondary);

    row![
        title,
        Space::with_width(Length::Fill),
        about_button,
        settings_button,
    ]
    .spacing(8)
    .width(Length::Fill)
    .align_items(Alignment::Center)
    .into()
}

/// 构建预设档位网格
///
/// 档位来自`PRESET_DELAY_MINUTES`，每行四个按钮
pub fn preset_grid(localization: &Localization) -> Element<'static, Message> {
    let mut grid = column![].spacing(12).align_items(Alignment::Center);

    for presets in PRESET_DELAY_MINUTES.chunks(4) {
        let mut buttons = row![].spacing(12);
        for &minutes in presets {
            let caption =
                localization.format("preset-minutes", &[("minutes", minutes.to_string())]);
            buttons = buttons.push(
                button(
                    text(caption)
                        .size(14)
                        .horizontal_alignment(Horizontal::Center),
                )
                .on_press(Message::PresetPressed(minutes))
                .padding(10)
                .width(Length::Fixed(96.0))
                .style(iced::theme::Button::Primary),
            );
        }
        grid = grid.push(buttons);
    }

    grid.into()
}

/// 构建自定义分钟数输入行
///
/// 输入框只接受数字，回车与右侧按钮都会触发设定
pub fn entry_row(
    localization: &Localization,
    entry: &str,
    is_scheduled: bool,
) -> Element<'static, Message> {
    let input = text_input(&localization.text("entry-placeholder"), entry)
        .on_input(Message::EntryChanged)
        .on_submit(Message::ProgramPressed)
        .padding(10)
        .size(16)
        .width(Length::Fixed(170.0));

    let program_button = button(
        text(program_button_caption(localization, is_scheduled))
            .size(14)
            .horizontal_alignment(Horizontal::Center),
    )
    .on_press(Message::ProgramPressed)
    .padding(10)
    .width(Length::Fixed(130.0))
    .style(iced::theme::Button::Primary);

    row![input, program_button]
        .spacing(12)
        .align_items(Alignment::Center)
        .into()
}

/// 设定按钮的文字
///
/// 已有计划时改为“重新设定”
pub fn program_button_caption(localization: &Localization, is_scheduled: bool) -> String {
    if is_scheduled {
        localization.text("reprogram-button")
    } else {
        localization.text("program-button")
    }
}

/// 构建输入校验错误提示行
pub fn entry_error_line(
    localization: &Localization,
    theme: &Theme,
    error: &DelayInputError,
) -> Element<'static, Message> {
    text(validation_message(localization, error))
        .size(13)
        .style(theme.error_color())
        .into()
}

/// 校验错误对应的本地化提示
pub fn validation_message(localization: &Localization, error: &DelayInputError) -> String {
    match error {
        DelayInputError::Empty => localization.text("error-empty"),
        DelayInputError::NotANumber => localization.text("error-not-a-number"),
        DelayInputError::NotPositive => localization.text("error-not-positive"),
        DelayInputError::TooLarge { max } => {
            localization.format("error-too-large", &[("max", max.to_string())])
        }
    }
}

/// 构建结果栏
///
/// 文案每帧根据计划状态重新查词典，切换语言后立即重新翻译
pub fn result_panel(
    localization: &Localization,
    theme: &Theme,
    state: &ScheduleState,
) -> Element<'static, Message> {
    let message = text(result_message(localization, state))
        .size(15)
        .style(theme.surface_text_color())
        .horizontal_alignment(Horizontal::Center);

    container(message)
        .width(Length::Fill)
        .padding(14)
        .center_x()
        .style(theme.result_panel_appearance())
        .into()
}

/// 计划状态对应的本地化文案
pub fn result_message(localization: &Localization, state: &ScheduleState) -> String {
    match state {
        ScheduleState::Idle => localization.text("result-waiting"),
        ScheduleState::Scheduled { minutes } => {
            localization.format("result-scheduled", &[("minutes", minutes.to_string())])
        }
        ScheduleState::Cancelled => localization.text("result-cancelled"),
        ScheduleState::NothingScheduled => localization.text("result-none-scheduled"),
    }
}

/// 构建底部的取消与退出按钮行
pub fn bottom_row(localization: &Localization) -> Element<'static, Message> {
    let cancel_button = button(
        text(localization.text("cancel-button"))
            .size(14)
            .horizontal_alignment(Horizontal::Center),
    )
    .on_press(Message::CancelPressed)
    .padding(10)
    .width(Length::Fixed(150.0))
    .style(iced::theme::Button::Destructive);

    let exit_button = button(
        text(localization.text("exit-button"))
            .size(14)
            .horizontal_alignment(Horizontal::Center),
    )
    .on_press(Message::ExitPressed)
    .padding(10)
    .width(Length::Fixed(150.0))
    .style(iced::theme::Button::Secondary);

    row![cancel_button, exit_button]
        .spacing(20)
        .align_items(Alignment::Center)
        .into()
}

/// 模态弹窗的外框
///
/// 标题、正文与关闭按钮。弹窗替换整个视图渲染，
/// 关闭按钮与Enter/Escape都会回到主界面
fn dialog_frame(
    localization: &Localization,
    theme: &Theme,
    title: String,
    body: Element<'static, Message>,
) -> Element<'static, Message> {
    let close_button = button(
        text(localization.text("close-button"))
            .size(14)
            .horizontal_alignment(Horizontal::Center),
    )
    .on_press(Message::CloseDialog)
    .padding(10)
    .width(Length::Fixed(120.0))
    .style(iced::theme::Button::Primary);

    let content = column![
        text(title).size(20).style(theme.surface_text_color()),
        Space::with_height(12),
        body,
        Space::with_height(16),
        close_button,
    ]
    .align_items(Alignment::Center);

    let dialog = container(content)
        .width(Length::Fixed(380.0))
        .padding(24)
        .style(theme.dialog_appearance());

    container(dialog)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x()
        .center_y()
        .style(theme.root_appearance())
        .into()
}

/// 构建关于弹窗
pub fn info_dialog(localization: &Localization, theme: &Theme) -> Element<'static, Message> {
    let version = localization.format(
        "about-version",
        &[("version", env!("CARGO_PKG_VERSION").to_string())],
    );

    let body = column![
        text(localization.text("about-description"))
            .size(14)
            .style(theme.surface_text_color())
            .horizontal_alignment(Horizontal::Center),
        Space::with_height(8),
        text(version).size(13).style(theme.secondary_text_color()),
        Space::with_height(8),
        text(localization.text("about-usage"))
            .size(13)
            .style(theme.surface_text_color())
            .horizontal_alignment(Horizontal::Center),
    ]
    .width(Length::Fixed(320.0))
    .align_items(Alignment::Center);

    dialog_frame(
        localization,
        theme,
        localization.text("about-title"),
        body.into(),
    )
}

/// 构建错误弹窗
///
/// 正文只给出概括性的提示，具体原因在日志里
pub fn error_dialog(
    localization: &Localization,
    theme: &Theme,
    title: String,
    body: String,
) -> Element<'static, Message> {
    let message = text(body)
        .size(14)
        .style(theme.surface_text_color())
        .horizontal_alignment(Horizontal::Center)
        .width(Length::Fixed(320.0));

    dialog_frame(localization, theme, title, message.into())
}

/// 构建设置弹窗
///
/// 语言下拉框与主题切换按钮，修改立即生效并回传给后台持久化
pub fn settings_dialog(
    localization: &Localization,
    theme: &Theme,
    theme_type: ThemeType,
) -> Element<'static, Message> {
    let selected = LANGUAGE_CHOICES
        .iter()
        .find(|choice| choice.code == localization.language())
        .cloned();

    let language_row = row![
        text(localization.text("language-label"))
            .size(14)
            .style(theme.surface_text_color()),
        pick_list(LANGUAGE_CHOICES.to_vec(), selected, Message::LanguageSelected)
            .padding(8)
            .text_size(14)
            .width(Length::Fixed(160.0)),
    ]
    .spacing(12)
    .align_items(Alignment::Center);

    // 按钮上显示的是切换之后的主题
    let target_caption = match theme_type {
        ThemeType::Light => localization.text("theme-dark"),
        ThemeType::Dark => localization.text("theme-light"),
    };

    let theme_row = row![
        text(localization.text("theme-label"))
            .size(14)
            .style(theme.surface_text_color()),
        button(
            text(target_caption)
                .size(14)
                .horizontal_alignment(Horizontal::Center)
        )
        .on_press(Message::ToggleTheme)
        .padding(8)
        .width(Length::Fixed(160.0))
        .style(iced::theme::Button::Secondary),
    ]
    .spacing(12)
    .align_items(Alignment::Center);

    let body = column![language_row, Space::with_height(8), theme_row]
        .align_items(Alignment::Center);

    dialog_frame(
        localization,
        theme,
        localization.text("settings-title"),
        body.into(),
    )
}
