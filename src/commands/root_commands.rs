//! 配置根目录命令

use crate::setup::InitializationContext;
use anyhow::{Context, Result};
use houdini_launcher::utils::config::{looks_like_config_root, normalize_path, save_config_root};
use std::path::PathBuf;

/// 显示当前使用的配置根目录及其文件布局
pub fn show_root(ctx: &InitializationContext) -> Result<()> {
    let paths = ctx.backend.paths();
    println!("配置根目录: {}", paths.root.display());
    println!("  包目录:   {}", paths.packages_dir.display());
    println!("  预设文件: {}", paths.presets_file.display());
    println!("  收藏文件: {}", paths.favorites_file.display());
    if !looks_like_config_root(&paths.root) {
        println!("（未找到 packages 目录）");
    }
    Ok(())
}

/// 保存配置根目录，未指定时保存当前使用的目录
pub fn save_root(ctx: &InitializationContext, path: Option<PathBuf>) -> Result<()> {
    let root = match path {
        Some(path) => normalize_path(path),
        None => ctx.config_root.clone(),
    };
    if !looks_like_config_root(&root) {
        tracing::warn!(root = ?root, "目录下没有 packages 子目录");
    }
    save_config_root(&root).context("保存配置根目录失败")?;
    println!("已保存配置根目录: {}", root.display());
    Ok(())
}
