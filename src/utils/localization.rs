//! 本地化模块
//!
//! 负责界面文案的键值查找。内置英语、西班牙语与简体中文词典，
//! 也可以从配置指定的目录加载外部词典，键缺失时退回键名本身

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use lazy_static::lazy_static;
use log::{info, warn};
use regex::{Captures, Regex};
use serde::Deserialize;

/// 兜底语言代码
pub const FALLBACK_LANGUAGE: &str = "en";

/// 内置词典覆盖的语言代码
pub const BUILTIN_LANGUAGES: [&str; 3] = ["en", "es", "zh-CN"];

lazy_static! {
    /// 文案模板中的占位符，形如`{minutes}`
    static ref PLACEHOLDER_PATTERN: Regex = Regex::new(r"\{([A-Za-z0-9_-]+)\}").unwrap();
}

/// 单个语言的词典
///
/// 词典文件是扁平的字符串键值对
#[derive(Debug, Clone, Default, Deserialize)]
struct Dictionary {
    #[serde(flatten)]
    entries: HashMap<String, String>,
}

/// 本地化管理器
///
/// 持有当前语言的词典，供界面层按键查找文案
#[derive(Debug, Clone)]
pub struct Localization {
    /// 实际生效的语言代码
    language: String,
    /// 当前语言词典
    dictionary: Dictionary,
}

impl Localization {
    /// 按配置加载本地化词典
    ///
    /// # 参数
    ///
    /// * `preference` - 配置中的语言偏好，`auto`或空串表示跟随系统
    /// * `lang_dir` - 外部词典目录，目录中的`<语言代码>.json`优先于内置词典
    ///
    /// # 返回值
    ///
    /// 返回加载完成的本地化管理器，请求的语言不可用时回退到英语
    pub fn load(preference: &str, lang_dir: Option<&Path>) -> Self {
        let requested = if preference.is_empty() || preference == "auto" {
            Self::system_language()
        } else {
            normalize_language(preference)
        };

        if let Some(dictionary) = Self::load_dictionary(&requested, lang_dir) {
            info!("界面语言: {}", requested);
            return Self {
                language: requested,
                dictionary,
            };
        }

        warn!("语言 {} 不可用，回退到 {}", requested, FALLBACK_LANGUAGE);
        let dictionary = Self::load_dictionary(FALLBACK_LANGUAGE, lang_dir).unwrap_or_else(|| {
            warn!("兜底词典加载失败，文案将显示原始键名");
            Dictionary::default()
        });

        Self {
            language: FALLBACK_LANGUAGE.to_string(),
            dictionary,
        }
    }

    /// 检测系统语言并归一化为词典代码
    pub fn system_language() -> String {
        match sys_locale::get_locale() {
            Some(locale) => {
                let normalized = normalize_language(&locale);
                info!("检测到系统语言: {} -> {}", locale, normalized);
                normalized
            }
            None => {
                warn!("无法检测系统语言，使用 {}", FALLBACK_LANGUAGE);
                FALLBACK_LANGUAGE.to_string()
            }
        }
    }

    /// 当前生效的语言代码
    pub fn language(&self) -> &str {
        &self.language
    }

    /// 查找文案
    ///
    /// 键不存在时返回键名本身，只记录警告不中断界面
    pub fn text(&self, key: &str) -> String {
        match self.dictionary.entries.get(key) {
            Some(value) => value.clone(),
            None => {
                warn!("缺少文案键: {}", key);
                key.to_string()
            }
        }
    }

    /// 查找文案并替换占位符
    ///
    /// # 参数
    ///
    /// * `key` - 文案键
    /// * `args` - 占位符名称到取值的映射，模板中未提供取值的占位符原样保留
    pub fn format(&self, key: &str, args: &[(&str, String)]) -> String {
        let template = self.text(key);
        PLACEHOLDER_PATTERN
            .replace_all(&template, |caps: &Captures| {
                let name = &caps[1];
                args.iter()
                    .find(|(arg, _)| *arg == name)
                    .map(|(_, value)| value.clone())
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    /// 加载指定语言的词典
    ///
    /// 先查外部目录，再查内置词典，都不可用时返回None
    fn load_dictionary(code: &str, lang_dir: Option<&Path>) -> Option<Dictionary> {
        if let Some(dir) = lang_dir {
            let path = dir.join(format!("{}.json", code));
            if let Ok(content) = fs::read_to_string(&path) {
                match serde_json::from_str(&content) {
                    Ok(dictionary) => {
                        info!("从外部目录加载词典: {}", path.display());
                        return Some(dictionary);
                    }
                    Err(e) => {
                        warn!("外部词典解析失败 {}: {}", path.display(), e);
                    }
                }
            }
        }

        let source = Self::builtin_source(code)?;
        match serde_json::from_str(source) {
            Ok(dictionary) => Some(dictionary),
            Err(e) => {
                warn!("内置词典解析失败 {}: {}", code, e);
                None
            }
        }
    }

    /// 内置词典的原始JSON
    fn builtin_source(code: &str) -> Option<&'static str> {
        match code {
            "en" => Some(include_str!("../../res/locales/en.json")),
            "es" => Some(include_str!("../../res/locales/es.json")),
            "zh-CN" => Some(include_str!("../../res/locales/zh-CN.json")),
            _ => None,
        }
    }
}

impl Default for Localization {
    fn default() -> Self {
        Self::load(FALLBACK_LANGUAGE, None)
    }
}

/// 把系统语言标签归一化为词典代码
///
/// 所有`zh`开头的标签都映射到`zh-CN`，其余标签取主语言子标签
pub fn normalize_language(tag: &str) -> String {
    let tag = tag.trim();
    if tag.to_ascii_lowercase().starts_with("zh") {
        return "zh-CN".to_string();
    }

    let primary = tag.split(|c| c == '-' || c == '_').next().unwrap_or(tag);
    primary.to_ascii_lowercase()
}
