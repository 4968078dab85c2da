//! UI主题模块
//!
//! 定义应用程序的浅色与深色配色，并提供iced样式的构造方法

use iced::theme::Palette;
use iced::widget::container::Appearance as ContainerAppearance;
use iced::{Background, Border, Color, Theme as IcedTheme};
use serde::{Deserialize, Serialize};

/// 主题类型
///
/// 随配置文件一起序列化
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeType {
    /// 浅色主题
    Light,
    /// 深色主题
    Dark,
}

/// 主题颜色配置
///
/// 颜色统一存为RGB字节三元组
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeColors {
    /// 窗口背景色
    pub background: [u8; 3],
    /// 面板背景色（结果栏与弹窗）
    pub surface: [u8; 3],
    /// 窗口背景上的文本色
    pub text: [u8; 3],
    /// 面板背景上的文本色
    pub surface_text: [u8; 3],
    /// 次要文本色
    pub text_secondary: [u8; 3],
    /// 强调色
    pub accent: [u8; 3],
    /// 成功色
    pub success: [u8; 3],
    /// 错误色
    pub error: [u8; 3],
    /// 边框色
    pub border: [u8; 3],
}

/// 应用主题
///
/// 界面层所有手动着色都从这里取颜色
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// 主题名称
    pub name: String,
    /// 主题类型
    pub theme_type: ThemeType,
    /// 颜色配置
    pub colors: ThemeColors,
}

impl Default for Theme {
    /// 默认使用浅色主题
    fn default() -> Self {
        Self::light_theme()
    }
}

impl Theme {
    /// 创建浅色主题
    pub fn light_theme() -> Self {
        Self {
            name: "Light".to_string(),
            theme_type: ThemeType::Light,
            colors: ThemeColors {
                background: [248, 249, 250],
                surface: [255, 255, 255],
                text: [33, 37, 41],
                surface_text: [33, 37, 41],
                text_secondary: [108, 117, 125],
                accent: [13, 110, 253],
                success: [25, 135, 84],
                error: [220, 53, 69],
                border: [222, 226, 230],
            },
        }
    }

    /// 创建深色主题
    ///
    /// 深蓝底配琥珀色强调
    pub fn dark_theme() -> Self {
        Self {
            name: "Dark".to_string(),
            theme_type: ThemeType::Dark,
            colors: ThemeColors {
                background: [2, 48, 71],
                surface: [255, 255, 255],
                text: [255, 255, 255],
                surface_text: [33, 37, 41],
                text_secondary: [173, 181, 189],
                accent: [252, 191, 73],
                success: [25, 135, 84],
                error: [220, 53, 69],
                border: [252, 191, 73],
            },
        }
    }

    /// 获取窗口背景颜色
    pub fn background_color(&self) -> Color {
        let [r, g, b] = self.colors.background;
        Color::from_rgb8(r, g, b)
    }

    /// 获取面板背景颜色
    pub fn surface_color(&self) -> Color {
        let [r, g, b] = self.colors.surface;
        Color::from_rgb8(r, g, b)
    }

    /// 获取窗口背景上的文本颜色
    pub fn text_color(&self) -> Color {
        let [r, g, b] = self.colors.text;
        Color::from_rgb8(r, g, b)
    }

    /// 获取面板背景上的文本颜色
    pub fn surface_text_color(&self) -> Color {
        let [r, g, b] = self.colors.surface_text;
        Color::from_rgb8(r, g, b)
    }

    /// 获取次要文本颜色
    pub fn secondary_text_color(&self) -> Color {
        let [r, g, b] = self.colors.text_secondary;
        Color::from_rgb8(r, g, b)
    }

    /// 获取强调颜色
    pub fn accent_color(&self) -> Color {
        let [r, g, b] = self.colors.accent;
        Color::from_rgb8(r, g, b)
    }

    /// 获取成功颜色
    pub fn success_color(&self) -> Color {
        let [r, g, b] = self.colors.success;
        Color::from_rgb8(r, g, b)
    }

    /// 获取错误颜色
    pub fn error_color(&self) -> Color {
        let [r, g, b] = self.colors.error;
        Color::from_rgb8(r, g, b)
    }

    /// 获取边框颜色
    pub fn border_color(&self) -> Color {
        let [r, g, b] = self.colors.border;
        Color::from_rgb8(r, g, b)
    }

    /// 窗口根容器的样式
    pub fn root_appearance(&self) -> ContainerAppearance {
        ContainerAppearance {
            text_color: Some(self.text_color()),
            background: Some(Background::Color(self.background_color())),
            ..Default::default()
        }
    }

    /// 结果栏面板的样式
    pub fn result_panel_appearance(&self) -> ContainerAppearance {
        ContainerAppearance {
            text_color: Some(self.surface_text_color()),
            background: Some(Background::Color(self.surface_color())),
            border: Border {
                color: self.border_color(),
                width: 1.0,
                radius: 8.0.into(),
            },
            ..Default::default()
        }
    }

    /// 模态弹窗的样式
    pub fn dialog_appearance(&self) -> ContainerAppearance {
        ContainerAppearance {
            text_color: Some(self.surface_text_color()),
            background: Some(Background::Color(self.surface_color())),
            border: Border {
                color: self.border_color(),
                width: 2.0,
                radius: 10.0.into(),
            },
            ..Default::default()
        }
    }

    /// 转换为iced主题
    ///
    /// iced的内置控件（按钮、输入框、下拉框）从调色板取色，
    /// 手动着色的部分仍然直接使用上面的颜色访问方法
    pub fn iced_theme(&self) -> IcedTheme {
        IcedTheme::custom(
            self.name.clone(),
            Palette {
                background: self.background_color(),
                text: self.text_color(),
                primary: self.accent_color(),
                success: self.success_color(),
                danger: self.error_color(),
            },
        )
    }

    /// 按主题类型构造主题实例
    pub fn apply_theme(theme_type: ThemeType) -> Self {
        match theme_type {
            ThemeType::Light => Self::light_theme(),
            ThemeType::Dark => Self::dark_theme(),
        }
    }

    /// 在浅色与深色之间切换
    pub fn toggle_theme(current_theme: ThemeType) -> Self {
        match current_theme {
            ThemeType::Light => Self::dark_theme(),
            ThemeType::Dark => Self::light_theme(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_creation() {
        let light_theme = Theme::light_theme();
        assert_eq!(light_theme.theme_type, ThemeType::Light);
        assert_eq!(light_theme.name, "Light");

        let dark_theme = Theme::dark_theme();
        assert_eq!(dark_theme.theme_type, ThemeType::Dark);
        assert_eq!(dark_theme.name, "Dark");
    }

    #[test]
    fn test_dark_theme_uses_brand_colors() {
        let theme = Theme::dark_theme();
        assert_eq!(theme.colors.background, [2, 48, 71]);
        assert_eq!(theme.colors.accent, [252, 191, 73]);
    }

    #[test]
    fn test_color_conversion() {
        let theme = Theme::light_theme();
        let bg_color = theme.background_color();
        let text_color = theme.text_color();

        assert_eq!(bg_color.r, 248.0 / 255.0);
        assert_eq!(text_color.r, 33.0 / 255.0);
    }

    #[test]
    fn test_theme_toggle() {
        let light_theme = Theme::toggle_theme(ThemeType::Dark);
        assert_eq!(light_theme.theme_type, ThemeType::Light);

        let dark_theme = Theme::toggle_theme(ThemeType::Light);
        assert_eq!(dark_theme.theme_type, ThemeType::Dark);
    }

    #[test]
    fn test_apply_theme() {
        assert_eq!(
            Theme::apply_theme(ThemeType::Dark).theme_type,
            ThemeType::Dark
        );
        assert_eq!(
            Theme::apply_theme(ThemeType::Light).theme_type,
            ThemeType::Light
        );
    }

    #[test]
    fn test_theme_type_serialization() {
        assert_eq!(serde_json::to_string(&ThemeType::Light).unwrap(), "\"light\"");
        assert_eq!(serde_json::to_string(&ThemeType::Dark).unwrap(), "\"dark\"");

        let parsed: ThemeType = serde_json::from_str("\"dark\"").unwrap();
        assert_eq!(parsed, ThemeType::Dark);
    }

    #[test]
    fn test_result_panel_appearance() {
        let theme = Theme::dark_theme();
        let appearance = theme.result_panel_appearance();

        assert_eq!(
            appearance.background,
            Some(Background::Color(theme.surface_color()))
        );
        assert_eq!(appearance.text_color, Some(theme.surface_text_color()));
    }

    #[test]
    fn test_iced_theme_palette() {
        let theme = Theme::dark_theme();
        let palette = theme.iced_theme().palette();

        assert_eq!(palette.background, theme.background_color());
        assert_eq!(palette.text, theme.text_color());
        assert_eq!(palette.primary, theme.accent_color());
        assert_eq!(palette.danger, theme.error_color());
    }
}
