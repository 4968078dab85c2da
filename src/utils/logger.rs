//! 日志管理模块
//!
//! 负责日志系统的初始化，以及日志文件按大小轮转

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Once;

use chrono::Local;
use dirs::data_local_dir;
use env_logger::{Builder, Target};
use log::{info, LevelFilter};

use crate::utils::config::LogSettings;

static INIT: Once = Once::new();

/// 单个日志文件的默认大小上限（MB）
pub const DEFAULT_MAX_LOG_SIZE_MB: u64 = 10;

/// 默认保留的轮转文件数量
pub const DEFAULT_MAX_RETAINED_FILES: u32 = 5;

/// 按大小轮转的日志文件
///
/// 每次写入前检查当前文件大小，达到上限时执行重命名链：
/// 删除最旧的`.N`，把`.i`依次改名为`.i+1`，再把当前文件改名为`.1`，
/// 之后在原路径上新建文件继续写入
#[derive(Debug)]
pub struct RotatingLogFile {
    /// 当前日志文件路径
    path: PathBuf,
    /// 单个文件的大小上限（字节）
    max_size: u64,
    /// 保留的轮转文件数量
    max_retained: u32,
    /// 当前打开的文件句柄
    file: Option<fs::File>,
    /// 当前文件的字节数
    current_size: u64,
}

impl RotatingLogFile {
    /// 创建轮转日志文件
    ///
    /// # 参数
    ///
    /// * `path` - 日志文件路径，轮转文件在同目录下追加`.1`到`.N`后缀
    /// * `max_size` - 单个文件的大小上限（字节）
    /// * `max_retained` - 保留的轮转文件数量
    pub fn new(path: PathBuf, max_size: u64, max_retained: u32) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let current_size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

        Ok(Self {
            path,
            max_size,
            max_retained,
            file: None,
            current_size,
        })
    }

    /// 轮转文件的路径，例如`application.log.3`
    fn rotated_path(&self, index: u32) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(format!(".{}", index));
        PathBuf::from(name)
    }

    /// 达到大小上限时执行重命名链
    fn rotate_if_needed(&mut self) -> io::Result<()> {
        if self.max_retained == 0 || self.current_size < self.max_size {
            return Ok(());
        }

        // Windows上改名前必须先关闭句柄
        self.file = None;

        let oldest = self.rotated_path(self.max_retained);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        for index in (1..self.max_retained).rev() {
            let from = self.rotated_path(index);
            if from.exists() {
                fs::rename(&from, self.rotated_path(index + 1))?;
            }
        }

        if self.path.exists() {
            fs::rename(&self.path, self.rotated_path(1))?;
        }

        self.current_size = 0;
        Ok(())
    }

    /// 打开或复用当前文件句柄
    fn open_file(&mut self) -> io::Result<&mut fs::File> {
        if self.file.is_none() {
            let file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
            self.file = Some(file);
        }

        match self.file.as_mut() {
            Some(file) => Ok(file),
            None => Err(io::Error::new(io::ErrorKind::Other, "日志文件句柄不可用")),
        }
    }
}

impl Write for RotatingLogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Err(e) = self.rotate_if_needed() {
            eprintln!("日志轮转失败: {}", e);
        }

        match self.open_file().and_then(|file| file.write_all(buf)) {
            Ok(()) => {
                self.current_size += buf.len() as u64;
                Ok(buf.len())
            }
            Err(e) => {
                // 文件不可写时降级到标准错误，日志本身不能让进程崩溃
                eprintln!("写入日志文件失败: {}", e);
                let _ = io::stderr().write_all(buf);
                Ok(buf.len())
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

/// 同时输出到控制台和日志文件的组合写入器
#[derive(Debug)]
struct TeeWriter {
    console: io::Stdout,
    file: RotatingLogFile,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // 控制台写入失败不影响文件日志
        let _ = self.console.write_all(buf);
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let _ = self.console.flush();
        self.file.flush()
    }
}

/// 日志管理器
///
/// 负责日志系统的配置和初始化
#[derive(Debug)]
pub struct LoggerManager {
    /// 日志文件路径
    log_file_path: Option<PathBuf>,
    /// 当前日志级别
    log_level: LevelFilter,
    /// 是否启用控制台日志
    console_logging_enabled: bool,
    /// 单个日志文件的大小上限（字节）
    max_file_size: u64,
    /// 保留的轮转文件数量
    max_retained_files: u32,
}

impl LoggerManager {
    /// 按日志配置创建日志管理器
    ///
    /// # 参数
    ///
    /// * `settings` - 配置文件中的日志配置
    ///
    /// # 返回值
    ///
    /// 成功返回日志管理器，失败返回错误信息
    pub fn new(settings: &LogSettings) -> Result<Self, Box<dyn std::error::Error>> {
        let log_file_path = if settings.file_logging {
            Some(Self::create_log_file_path(&settings.file_name)?)
        } else {
            None
        };

        Ok(Self {
            log_file_path,
            log_level: LogLevelConverter::from_string(&settings.level),
            console_logging_enabled: settings.console_logging,
            max_file_size: settings.max_file_size_mb * 1024 * 1024,
            max_retained_files: settings.max_retained_files,
        })
    }

    /// 生成日志文件路径
    ///
    /// 日志固定放在本地数据目录的`OffTimer/logs`下
    fn create_log_file_path(file_name: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let data_dir = data_local_dir().ok_or("无法获取本地数据目录")?;

        let log_dir = data_dir.join("OffTimer").join("logs");
        if !log_dir.exists() {
            fs::create_dir_all(&log_dir)?;
        }

        Ok(log_dir.join(file_name))
    }

    /// 初始化日志系统
    ///
    /// 重复调用只生效一次
    pub fn init(&self) -> Result<(), Box<dyn std::error::Error>> {
        let result = Ok(());
        INIT.call_once(|| {
            if let Err(e) = self.init_internal() {
                // 测试环境中忽略重复初始化错误
                eprintln!("日志系统初始化失败: {}", e);
            }
        });
        result
    }

    /// 内部初始化方法
    fn init_internal(&self) -> Result<(), Box<dyn std::error::Error>> {
        let mut builder = Builder::new();

        builder.filter_level(self.log_level);

        builder.format(|buf, record| {
            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
            writeln!(
                buf,
                "[{}] [{}] [{}:{}] {}",
                timestamp,
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        });

        match (self.console_logging_enabled, &self.log_file_path) {
            (true, Some(file_path)) => {
                let rotating = RotatingLogFile::new(
                    file_path.clone(),
                    self.max_file_size,
                    self.max_retained_files,
                )?;
                let tee = TeeWriter {
                    console: io::stdout(),
                    file: rotating,
                };
                builder.target(Target::Pipe(Box::new(tee)));
                builder.init();

                info!("日志系统初始化完成 - 控制台和文件: {:?}", file_path);
            }
            (true, None) => {
                builder.target(Target::Stdout);
                builder.init();

                info!("日志系统初始化完成 - 仅控制台");
            }
            (false, Some(file_path)) => {
                let rotating = RotatingLogFile::new(
                    file_path.clone(),
                    self.max_file_size,
                    self.max_retained_files,
                )?;
                builder.target(Target::Pipe(Box::new(rotating)));
                builder.init();

                info!("日志系统初始化完成 - 仅文件: {:?}", file_path);
            }
            (false, None) => {
                // 两个输出都关闭时禁用日志
                builder.filter_level(LevelFilter::Off);
                builder.init();
            }
        }

        Ok(())
    }

    /// 获取当前日志级别
    pub fn get_log_level(&self) -> LevelFilter {
        self.log_level
    }

    /// 获取日志文件路径
    pub fn get_log_file_path(&self) -> Option<&Path> {
        self.log_file_path.as_deref()
    }

    /// 获取当前日志文件大小
    ///
    /// # 返回值
    ///
    /// 成功返回文件大小（字节），未启用文件日志时返回0
    pub fn get_log_file_size(&self) -> Result<u64, Box<dyn std::error::Error>> {
        match &self.log_file_path {
            Some(path) if path.exists() => Ok(fs::metadata(path)?.len()),
            _ => Ok(0),
        }
    }

    /// 统计日志文件情况
    ///
    /// 遍历重命名链上的`.1`到`.N`文件，汇总数量和总大小
    pub fn get_log_stats(&self) -> LogStats {
        let mut stats = LogStats::default();

        if let Some(path) = &self.log_file_path {
            if let Ok(size) = self.get_log_file_size() {
                stats.current_file_size = size;
                stats.total_size = size;
            }

            for index in 1..=self.max_retained_files {
                let mut name = path.as_os_str().to_os_string();
                name.push(format!(".{}", index));
                let rotated = PathBuf::from(name);

                if let Ok(metadata) = fs::metadata(&rotated) {
                    stats.rotated_files += 1;
                    stats.total_size += metadata.len();
                }
            }
        }

        stats
    }
}

/// 日志文件统计信息
///
/// 覆盖当前文件和重命名链上的全部轮转文件
#[derive(Debug, Clone, Default)]
pub struct LogStats {
    /// 当前日志文件大小
    pub current_file_size: u64,
    /// 重命名链上的轮转文件数量
    pub rotated_files: usize,
    /// 当前文件与轮转文件的总大小
    pub total_size: u64,
}

/// 日志级别转换工具
pub struct LogLevelConverter;

impl LogLevelConverter {
    /// 从字符串转换为日志级别，无法识别时使用Info
    pub fn from_string(level_str: &str) -> LevelFilter {
        match level_str.to_lowercase().as_str() {
            "error" => LevelFilter::Error,
            "warn" => LevelFilter::Warn,
            "info" => LevelFilter::Info,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            "off" => LevelFilter::Off,
            _ => LevelFilter::Info,
        }
    }

    /// 从日志级别转换为配置字符串
    pub fn to_string(level: LevelFilter) -> &'static str {
        match level {
            LevelFilter::Error => "error",
            LevelFilter::Warn => "warn",
            LevelFilter::Info => "info",
            LevelFilter::Debug => "debug",
            LevelFilter::Trace => "trace",
            LevelFilter::Off => "off",
        }
    }

    /// 配置中允许出现的日志级别
    pub fn known_levels() -> &'static [&'static str] {
        &["error", "warn", "info", "debug", "trace", "off"]
    }
}

/// 按日志配置初始化日志系统
///
/// # 参数
///
/// * `settings` - 配置文件中的日志配置
///
/// # 返回值
///
/// 成功返回日志管理器，失败返回错误信息
pub fn init_logger(settings: &LogSettings) -> Result<LoggerManager, Box<dyn std::error::Error>> {
    let manager = LoggerManager::new(settings)?;
    manager.init()?;
    Ok(manager)
}

/// 使用默认配置快速初始化日志系统
pub fn init_default_logger() -> Result<LoggerManager, Box<dyn std::error::Error>> {
    init_logger(&LogSettings::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// 16字节一条的测试日志，保证每次写入后刚好到达上限
    fn entry(index: u32) -> Vec<u8> {
        format!("entry-{}-aaaaaaaa", index).into_bytes()
    }

    #[test]
    fn test_rotation_rename_chain() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("application.log");
        let mut log = RotatingLogFile::new(path.clone(), 16, 3).unwrap();

        log.write_all(&entry(1)).unwrap();
        log.flush().unwrap();
        assert_eq!(fs::read(&path).unwrap(), entry(1));
        assert!(!dir.path().join("application.log.1").exists());

        // 第二次写入触发轮转，当前文件整体改名为.1
        log.write_all(&entry(2)).unwrap();
        log.flush().unwrap();
        assert_eq!(fs::read(&path).unwrap(), entry(2));
        assert_eq!(
            fs::read(dir.path().join("application.log.1")).unwrap(),
            entry(1)
        );

        log.write_all(&entry(3)).unwrap();
        log.flush().unwrap();
        assert_eq!(
            fs::read(dir.path().join("application.log.1")).unwrap(),
            entry(2)
        );
        assert_eq!(
            fs::read(dir.path().join("application.log.2")).unwrap(),
            entry(1)
        );
    }

    #[test]
    fn test_rotation_drops_oldest_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("application.log");
        let mut log = RotatingLogFile::new(path.clone(), 16, 3).unwrap();

        for index in 1..=5 {
            log.write_all(&entry(index)).unwrap();
        }
        log.flush().unwrap();

        // 链上最多保留3个轮转文件，最早的两条已经被丢弃
        assert_eq!(fs::read(&path).unwrap(), entry(5));
        assert_eq!(
            fs::read(dir.path().join("application.log.1")).unwrap(),
            entry(4)
        );
        assert_eq!(
            fs::read(dir.path().join("application.log.2")).unwrap(),
            entry(3)
        );
        assert_eq!(
            fs::read(dir.path().join("application.log.3")).unwrap(),
            entry(2)
        );
        assert!(!dir.path().join("application.log.4").exists());
    }

    #[test]
    fn test_no_rotation_below_threshold() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("application.log");
        let mut log = RotatingLogFile::new(path.clone(), 1024, 5).unwrap();

        for index in 1..=5 {
            log.write_all(&entry(index)).unwrap();
        }
        log.flush().unwrap();

        assert!(!dir.path().join("application.log.1").exists());
        assert_eq!(fs::metadata(&path).unwrap().len(), 16 * 5);
    }

    #[test]
    fn test_rotation_resumes_from_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("application.log");
        fs::write(&path, entry(1)).unwrap();

        // 新实例读取已有文件的大小，首次写入即触发轮转
        let mut log = RotatingLogFile::new(path.clone(), 16, 3).unwrap();
        log.write_all(&entry(2)).unwrap();
        log.flush().unwrap();

        assert_eq!(fs::read(&path).unwrap(), entry(2));
        assert_eq!(
            fs::read(dir.path().join("application.log.1")).unwrap(),
            entry(1)
        );
    }

    #[test]
    fn test_zero_retained_disables_rotation() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("application.log");
        let mut log = RotatingLogFile::new(path.clone(), 16, 0).unwrap();

        for index in 1..=3 {
            log.write_all(&entry(index)).unwrap();
        }
        log.flush().unwrap();

        assert!(!dir.path().join("application.log.1").exists());
        assert_eq!(fs::metadata(&path).unwrap().len(), 16 * 3);
    }

    #[test]
    fn test_log_level_converter() {
        assert_eq!(LogLevelConverter::from_string("info"), LevelFilter::Info);
        assert_eq!(LogLevelConverter::from_string("DEBUG"), LevelFilter::Debug);
        assert_eq!(LogLevelConverter::from_string("invalid"), LevelFilter::Info);

        assert_eq!(LogLevelConverter::to_string(LevelFilter::Warn), "warn");
        assert!(LogLevelConverter::known_levels().contains(&"trace"));
    }

    #[test]
    fn test_logger_manager_creation_without_file() {
        let settings = LogSettings {
            file_logging: false,
            ..LogSettings::default()
        };

        let logger = LoggerManager::new(&settings).unwrap();
        assert_eq!(logger.get_log_level(), LevelFilter::Info);
        assert!(logger.get_log_file_path().is_none());
        assert_eq!(logger.get_log_file_size().unwrap(), 0);
    }

    #[test]
    fn test_log_stats_follow_rotation_chain() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("application.log");

        let mut log = RotatingLogFile::new(path.clone(), 16, 3).unwrap();
        for index in 1..=3 {
            log.write_all(&entry(index)).unwrap();
        }
        log.flush().unwrap();

        // 链上现在是当前文件加两个轮转文件
        let manager = LoggerManager {
            log_file_path: Some(path),
            log_level: LevelFilter::Info,
            console_logging_enabled: false,
            max_file_size: 16,
            max_retained_files: 3,
        };

        let stats = manager.get_log_stats();
        assert_eq!(stats.current_file_size, 16);
        assert_eq!(stats.rotated_files, 2);
        assert_eq!(stats.total_size, 48);
    }

    #[test]
    fn test_log_stats_without_file_logging() {
        let settings = LogSettings {
            file_logging: false,
            ..LogSettings::default()
        };
        let logger = LoggerManager::new(&settings).unwrap();

        let stats = logger.get_log_stats();
        assert_eq!(stats.current_file_size, 0);
        assert_eq!(stats.rotated_files, 0);
        assert_eq!(stats.total_size, 0);
    }

    #[test]
    fn test_init_logger_repeated_calls() {
        let settings = LogSettings {
            file_logging: false,
            ..LogSettings::default()
        };

        // Once保证重复初始化不报错
        assert!(init_logger(&settings).is_ok());
        assert!(init_default_logger().is_ok());
    }
}
