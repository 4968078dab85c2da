//! 配置管理模块
//!
//! 负责应用程序配置的加载、保存和校验

use std::fs;
use std::path::{Path, PathBuf};

use dirs::config_dir;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::ui::theme::ThemeType;
use crate::utils::logger::{
    LogLevelConverter, DEFAULT_MAX_LOG_SIZE_MB, DEFAULT_MAX_RETAINED_FILES,
};

/// 应用程序配置
///
/// 配置文件是config目录下的`OffTimer/config.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 应用程序设置
    pub app: AppSettings,
    /// UI设置
    pub ui: UiSettings,
    /// 日志设置
    pub logging: LogSettings,
}

/// 应用程序基本设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// 界面语言，`auto`表示跟随系统
    pub language: String,
    /// 外部词典目录，优先于内置词典
    pub lang_dir: Option<PathBuf>,
}

/// UI界面设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiSettings {
    /// 主题类型
    pub theme_type: ThemeType,
}

/// 日志设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    /// 日志级别
    pub level: String,
    /// 是否写日志文件
    pub file_logging: bool,
    /// 是否输出到控制台
    pub console_logging: bool,
    /// 日志文件名
    pub file_name: String,
    /// 单个日志文件的大小上限（MB）
    pub max_file_size_mb: u64,
    /// 保留的轮转文件数量
    pub max_retained_files: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSettings::default(),
            ui: UiSettings::default(),
            logging: LogSettings::default(),
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            language: "auto".to_string(),
            lang_dir: None,
        }
    }
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            theme_type: ThemeType::Light,
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_logging: true,
            console_logging: true,
            file_name: "application.log".to_string(),
            max_file_size_mb: DEFAULT_MAX_LOG_SIZE_MB,
            max_retained_files: DEFAULT_MAX_RETAINED_FILES,
        }
    }
}

/// 配置管理器
///
/// 负责配置文件的加载、保存和管理
#[derive(Debug)]
pub struct ConfigManager {
    /// 配置文件路径
    config_path: PathBuf,
    /// 当前配置
    config: AppConfig,
}

impl ConfigManager {
    /// 创建新的配置管理器
    ///
    /// # 返回值
    ///
    /// 成功返回配置管理器，失败返回错误信息
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = Self::get_config_file_path()?;
        Self::with_config_path(config_path)
    }

    /// 使用指定的配置文件路径创建配置管理器
    ///
    /// # 参数
    ///
    /// * `config_path` - 配置文件路径
    pub fn with_config_path(config_path: PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let config = Self::load_config(&config_path)?;

        Ok(Self {
            config_path,
            config,
        })
    }

    /// 获取默认的配置文件路径
    fn get_config_file_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_dir = config_dir().ok_or("无法获取配置目录")?;

        let app_config_dir = config_dir.join("OffTimer");
        if !app_config_dir.exists() {
            fs::create_dir_all(&app_config_dir)?;
            info!("创建配置目录: {:?}", app_config_dir);
        }

        Ok(app_config_dir.join("config.json"))
    }

    /// 加载配置文件
    ///
    /// 文件不存在时写入默认配置；文件损坏时备份后回退到默认配置
    fn load_config(path: &Path) -> Result<AppConfig, Box<dyn std::error::Error>> {
        if !path.exists() {
            info!("配置文件不存在，使用默认配置: {:?}", path);
            let default_config = AppConfig::default();
            Self::save_config_to_file(&default_config, path)?;
            return Ok(default_config);
        }

        info!("加载配置文件: {:?}", path);
        let config_content = fs::read_to_string(path)?;

        match serde_json::from_str::<AppConfig>(&config_content) {
            Ok(config) => {
                info!("配置文件加载成功");
                Ok(config)
            }
            Err(e) => {
                warn!("配置文件格式错误: {}, 使用默认配置", e);

                // 备份损坏的配置文件
                let backup_path = path.with_extension("json.backup");
                if let Err(backup_err) = fs::copy(path, &backup_path) {
                    warn!("备份损坏的配置文件失败: {}", backup_err);
                }

                let default_config = AppConfig::default();
                Self::save_config_to_file(&default_config, path)?;
                Ok(default_config)
            }
        }
    }

    /// 保存配置到文件
    fn save_config_to_file(
        config: &AppConfig,
        path: &Path,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let config_json = serde_json::to_string_pretty(config)?;
        fs::write(path, config_json)?;
        info!("配置文件保存成功: {:?}", path);
        Ok(())
    }

    /// 获取当前配置
    pub fn get_config(&self) -> &AppConfig {
        &self.config
    }

    /// 获取可变配置引用
    pub fn get_config_mut(&mut self) -> &mut AppConfig {
        &mut self.config
    }

    /// 保存当前配置
    ///
    /// # 返回值
    ///
    /// 成功返回Ok(())，失败返回错误信息
    pub fn save_config(&self) -> Result<(), Box<dyn std::error::Error>> {
        Self::save_config_to_file(&self.config, &self.config_path)
    }

    /// 校验当前配置
    ///
    /// # 返回值
    ///
    /// 返回是否有效以及所有发现的问题
    pub fn validate_config(&self) -> (bool, Vec<String>) {
        let mut errors = Vec::new();

        let (_, mut app_errors) = ConfigValidator::validate_app_settings(&self.config.app);
        errors.append(&mut app_errors);

        let (_, mut ui_errors) = ConfigValidator::validate_ui_settings(&self.config.ui);
        errors.append(&mut ui_errors);

        let (_, mut log_errors) = ConfigValidator::validate_log_settings(&self.config.logging);
        errors.append(&mut log_errors);

        (errors.is_empty(), errors)
    }

    /// 获取配置文件路径
    pub fn get_config_path(&self) -> &Path {
        &self.config_path
    }
}

/// 配置验证器
///
/// 每个方法返回是否有效以及发现的所有问题
pub struct ConfigValidator;

impl ConfigValidator {
    /// 验证应用设置
    pub fn validate_app_settings(settings: &AppSettings) -> (bool, Vec<String>) {
        let mut errors = Vec::new();

        if settings.language.trim().is_empty() {
            errors.push("语言设置不能为空".to_string());
        }

        (errors.is_empty(), errors)
    }

    /// 验证界面设置
    ///
    /// 主题类型是强类型枚举，解析阶段已经排除了非法取值，
    /// 这里保留校验入口，新的界面设置项在此追加检查
    pub fn validate_ui_settings(_settings: &UiSettings) -> (bool, Vec<String>) {
        (true, Vec::new())
    }

    /// 验证日志设置
    pub fn validate_log_settings(settings: &LogSettings) -> (bool, Vec<String>) {
        let mut errors = Vec::new();

        if !LogLevelConverter::known_levels().contains(&settings.level.to_lowercase().as_str()) {
            errors.push(format!("无效的日志级别: {}", settings.level));
        }

        if settings.file_name.trim().is_empty() {
            errors.push("日志文件名不能为空".to_string());
        } else if settings.file_name.contains('/') || settings.file_name.contains('\\') {
            errors.push("日志文件名不能包含路径分隔符".to_string());
        }

        if settings.max_file_size_mb == 0 || settings.max_file_size_mb > 1024 {
            errors.push("日志文件大小上限应在1-1024MB之间".to_string());
        }

        if settings.max_retained_files == 0 || settings.max_retained_files > 100 {
            errors.push("轮转文件数量应在1-100之间".to_string());
        }

        (errors.is_empty(), errors)
    }
}
