//! 包开关与收藏命令

use crate::setup::InitializationContext;
use anyhow::{Context, Result};
use houdini_launcher::{search_filter, FavoritesSet, Package, PackageRegistry, ProfileReconciler};

fn print_group(title: &str, packages: &[Package], favorites: &FavoritesSet) {
    println!("{title} ({})", packages.len());
    for pkg in favorites.prioritize(packages) {
        let mark = if favorites.contains(&pkg.name) { "★" } else { " " };
        let warn = if pkg.has_missing_paths() { "⚠" } else { " " };
        println!("  {mark}{warn} {:<32} {}", pkg.name, pkg.source_path.display());
        for missing in &pkg.missing_paths {
            println!("       路径不存在: {}", missing.display());
        }
    }
}

/// 列出包，收藏的排在每组前面
pub async fn list_packages(ctx: &InitializationContext, search: Option<&str>) -> Result<()> {
    let mut registry = PackageRegistry::new(ctx.backend.clone());
    registry.reload().await.context("读取包列表失败")?;

    let mut favorites = FavoritesSet::new(ctx.backend.clone());
    if let Err(e) = favorites.load().await {
        // 收藏只影响排序，读取失败不阻止列出
        tracing::warn!(error = %e, "读取收藏失败");
    }

    let view = registry.filter(search_filter(search.unwrap_or_default()));
    let enabled: Vec<Package> = view.enabled().cloned().collect();
    let disabled: Vec<Package> = view.disabled().cloned().collect();

    print_group("已启用", &enabled, &favorites);
    print_group("已禁用", &disabled, &favorites);
    Ok(())
}

/// 直接切换单个包的开关
pub async fn set_package(ctx: &InitializationContext, name: &str, enabled: bool) -> Result<()> {
    // 只涉及包列表，不读取预设文件
    let mut reconciler = ProfileReconciler::new(ctx.backend.clone());
    reconciler.reload_packages().await.context("读取包列表失败")?;
    reconciler
        .toggle_package(name, enabled)
        .await
        .with_context(|| format!("切换包 {name} 失败"))?;

    println!("{name}: {}", if enabled { "已启用" } else { "已禁用" });
    Ok(())
}

pub async fn list_favorites(ctx: &InitializationContext) -> Result<()> {
    let mut favorites = FavoritesSet::new(ctx.backend.clone());
    favorites.load().await.context("读取收藏失败")?;
    for name in favorites.names() {
        println!("★ {name}");
    }
    Ok(())
}

/// 切换收藏状态
pub async fn toggle_favorite(ctx: &InitializationContext, name: &str) -> Result<()> {
    let mut favorites = FavoritesSet::new(ctx.backend.clone());
    favorites.load().await.context("读取收藏失败")?;
    let now_favorite = favorites
        .toggle(name)
        .await
        .with_context(|| format!("更新收藏 {name} 失败"))?;

    if now_favorite {
        println!("已收藏 {name}");
    } else {
        println!("已取消收藏 {name}");
    }
    Ok(())
}
