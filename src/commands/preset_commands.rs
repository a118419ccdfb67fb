//! 预设命令

use crate::setup::InitializationContext;
use anyhow::{Context, Result};
use houdini_launcher::{LauncherError, ProfileReconciler};

async fn load_reconciler(ctx: &InitializationContext) -> Result<ProfileReconciler> {
    let mut reconciler = ProfileReconciler::new(ctx.backend.clone());
    reconciler.load().await.context("加载启动器状态失败")?;
    Ok(reconciler)
}

/// 列出预设，默认预设以 `*` 标记
pub async fn list_presets(ctx: &InitializationContext) -> Result<()> {
    let reconciler = load_reconciler(ctx).await?;
    let listing = reconciler.list();

    if listing.presets.is_empty() {
        println!("暂无预设");
        return Ok(());
    }
    for preset in &listing.presets {
        let mark = if listing.is_default(&preset.name) { "*" } else { " " };
        let packages: Vec<&str> = preset.package_names.iter().map(String::as_str).collect();
        println!(
            "{mark} {:<24} [{}] {}",
            preset.name,
            preset.context_label,
            packages.join(", ")
        );
    }
    Ok(())
}

/// 用当前已启用的包创建预设
pub async fn capture_preset(
    ctx: &InitializationContext,
    name: &str,
    context_label: &str,
) -> Result<()> {
    let mut reconciler = load_reconciler(ctx).await?;
    let preset = reconciler
        .capture_preset(name, context_label)
        .await
        .with_context(|| format!("创建预设 {name} 失败"))?;
    println!(
        "已创建预设 {}（{} 个包）",
        preset.name,
        preset.package_names.len()
    );
    Ok(())
}

/// 应用预设；未指定名称时应用默认预设
pub async fn apply_preset(ctx: &InitializationContext, name: Option<&str>) -> Result<()> {
    let mut reconciler = load_reconciler(ctx).await?;

    let result = match name {
        Some(name) => reconciler.apply_preset(name).await.map(Some),
        None => reconciler.apply_default_preset().await,
    };

    match result {
        Ok(Some(report)) => {
            println!("已应用预设 {}", report.preset);
            for pkg in &report.changed {
                let enabled = reconciler
                    .registry()
                    .get(pkg)
                    .map(|p| p.enabled)
                    .unwrap_or_default();
                println!("  {pkg}: {}", if enabled { "已启用" } else { "已禁用" });
            }
            Ok(())
        }
        Ok(None) => {
            println!("未设置默认预设");
            Ok(())
        }
        Err(LauncherError::PartialApply { preset, failed }) => {
            for pkg in &failed {
                eprintln!("  写入失败: {pkg}");
            }
            anyhow::bail!("预设 {preset} 部分应用失败（{} 个包）", failed.len())
        }
        Err(e) => Err(e).context("应用预设失败"),
    }
}

pub async fn delete_preset(ctx: &InitializationContext, name: &str) -> Result<()> {
    let mut reconciler = load_reconciler(ctx).await?;
    reconciler
        .delete_preset(name)
        .await
        .with_context(|| format!("删除预设 {name} 失败"))?;
    println!("已删除预设 {name}");
    Ok(())
}

/// 设为默认预设，并用当前已启用的包覆盖其内容
pub async fn set_default_preset(ctx: &InitializationContext, name: &str) -> Result<()> {
    let mut reconciler = load_reconciler(ctx).await?;
    reconciler
        .set_default_preset(name)
        .await
        .with_context(|| format!("设置默认预设 {name} 失败"))?;
    println!("已将 {name} 设为默认预设");
    Ok(())
}
