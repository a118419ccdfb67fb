use houdini_launcher::core::{init_logger, update_log_level};
use houdini_launcher::models::{LogConfig, LogLevel};
use houdini_launcher::utils::config::{discover_config_root, read_launcher_config};
use houdini_launcher::FsBackend;
use std::path::PathBuf;
use std::sync::Arc;

/// 启动初始化上下文
///
/// 包含命令执行所需的配置根目录和存储端
pub struct InitializationContext {
    pub config_root: PathBuf,
    pub backend: Arc<FsBackend>,
}

/// 初始化日志系统
///
/// 从全局配置读取日志配置，失败则使用默认配置
fn init_logging(verbose: bool) {
    let log_config: LogConfig = match read_launcher_config() {
        Ok(config) => config.map(|cfg| cfg.log).unwrap_or_default(),
        Err(e) => {
            eprintln!("WARNING: 读取全局配置失败，使用默认日志配置: {e:#}");
            LogConfig::default()
        }
    };

    if let Err(e) = init_logger(&log_config) {
        // 日志系统初始化失败时使用 eprintln!（因为 tracing 还不可用）
        eprintln!("WARNING: Failed to initialize logging system: {}", e);
        return;
    }

    if verbose {
        if let Err(e) = update_log_level(LogLevel::Debug) {
            eprintln!("WARNING: 调整日志级别失败: {}", e);
        }
    }

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "Houdini 启动器启动");
}

/// 应用初始化入口
///
/// 初始化日志，定位配置根目录，创建文件系统存储端
pub fn initialize_app(root: Option<PathBuf>, verbose: bool) -> InitializationContext {
    init_logging(verbose);

    let config_root = discover_config_root(root);
    tracing::info!(root = ?config_root, "使用配置根目录");

    InitializationContext {
        backend: Arc::new(FsBackend::from_root(&config_root)),
        config_root,
    }
}
