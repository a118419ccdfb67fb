use crate::data::JsonManager;
use crate::models::LauncherConfig;
use anyhow::{anyhow, Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR_NAME: &str = "houdini-launcher";
const CONFIG_DIR_ENV: &str = "HOUDINI_LAUNCHER_CONFIG_DIR";
const CONFIG_ROOT_ENV: &str = "HOUDINI_CONFIG_ROOT";

/// 启动器配置目录（~/houdini-launcher，可通过环境变量覆盖），若不存在则创建
pub fn config_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os(CONFIG_DIR_ENV) {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => dirs::home_dir()
            .ok_or_else(|| anyhow!("无法获取用户主目录"))?
            .join(CONFIG_DIR_NAME),
    };
    fs::create_dir_all(&dir).with_context(|| format!("创建配置目录失败: {dir:?}"))?;
    Ok(dir)
}

/// 全局配置文件路径
pub fn launcher_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.json"))
}

/// 读取全局配置（若文件不存在返回 Ok(None)）
pub fn read_launcher_config() -> Result<Option<LauncherConfig>> {
    let path = launcher_config_path()?;
    JsonManager::new()
        .read_optional(&path)
        .with_context(|| format!("读取全局配置失败: {path:?}"))
}

/// 写入全局配置
pub fn write_launcher_config(config: &LauncherConfig) -> Result<()> {
    let path = launcher_config_path()?;
    JsonManager::new()
        .write_as(&path, config)
        .with_context(|| format!("写入全局配置失败: {path:?}"))
}

/// 上次保存的配置根目录
pub fn load_saved_config_root() -> Result<Option<PathBuf>> {
    Ok(read_launcher_config()?.and_then(|c| c.config_root))
}

/// 保存配置根目录，保留其余配置项
pub fn save_config_root(root: &Path) -> Result<()> {
    let mut config = read_launcher_config()?.unwrap_or_default();
    config.config_root = Some(root.to_path_buf());
    write_launcher_config(&config)?;
    tracing::info!(root = ?root, "已保存配置根目录");
    Ok(())
}

/// 包含 packages 子目录即视为配置根目录
pub fn looks_like_config_root(path: &Path) -> bool {
    path.join("packages").is_dir()
}

/// 展开开头的 `~`
pub fn normalize_path(path: PathBuf) -> PathBuf {
    let Some(s) = path.to_str() else {
        return path;
    };
    match (s.strip_prefix('~'), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest.trim_start_matches(['/', '\\'])),
        _ => path,
    }
}

/// 查找配置根目录
///
/// 候选顺序：显式参数、已保存的根目录、`HOUDINI_CONFIG_ROOT`、当前目录。
/// 对每个候选向上逐级查找包含 `packages` 的目录，首个命中即返回；
/// 全部未命中时返回第一个候选。
pub fn discover_config_root(explicit: Option<PathBuf>) -> PathBuf {
    let mut candidates: Vec<PathBuf> = Vec::new();

    if let Some(path) = explicit {
        candidates.push(normalize_path(path));
    }

    match load_saved_config_root() {
        Ok(Some(saved)) => candidates.push(normalize_path(saved)),
        Ok(None) => {}
        Err(e) => tracing::warn!(error = ?e, "读取已保存的配置根目录失败"),
    }

    if let Some(env_root) = std::env::var_os(CONFIG_ROOT_ENV).filter(|v| !v.is_empty()) {
        candidates.push(normalize_path(PathBuf::from(env_root)));
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    candidates.push(cwd.clone());

    let mut seen: HashSet<PathBuf> = HashSet::new();
    for start in &candidates {
        for dir in start.ancestors() {
            if !seen.insert(dir.to_path_buf()) {
                break;
            }
            if looks_like_config_root(dir) {
                tracing::debug!(root = ?dir, "发现配置根目录");
                return dir.to_path_buf();
            }
        }
    }

    candidates.into_iter().next().unwrap_or(cwd)
}
