//! 收藏集合：与开关状态无关的包名标签，仅用于界面排序
//!
//! 每次修改都把完整集合写回存储端，不发送增量。同一份结果重发是安全的；
//! 两个互不知情的调用方并发修改时后写者覆盖前者，这一层不处理该竞争。

use crate::core::AppResult;
use crate::models::Package;
use crate::services::backend::LauncherBackend;
use std::sync::Arc;

pub struct FavoritesSet {
    backend: Arc<dyn LauncherBackend>,
    names: Vec<String>,
}

impl FavoritesSet {
    pub fn new(backend: Arc<dyn LauncherBackend>) -> Self {
        Self {
            backend,
            names: Vec::new(),
        }
    }

    /// 启动时加载一次
    pub async fn load(&mut self) -> AppResult<()> {
        let mut names = self.backend.load_favorites().await?;
        let mut seen = std::collections::HashSet::new();
        names.retain(|n| seen.insert(n.clone()));
        self.names = names;
        Ok(())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// 切换收藏状态，返回切换后是否为收藏
    ///
    /// 写入失败时本地集合保持不变。
    pub async fn toggle(&mut self, name: &str) -> AppResult<bool> {
        let now_favorite = !self.contains(name);
        let next: Vec<String> = if now_favorite {
            self.names
                .iter()
                .cloned()
                .chain(std::iter::once(name.to_string()))
                .collect()
        } else {
            self.names.iter().filter(|n| *n != name).cloned().collect()
        };

        self.backend.save_favorites(&next).await?;
        self.names = next;
        tracing::debug!(package = %name, favorite = now_favorite, "收藏已更新");
        Ok(now_favorite)
    }

    /// 收藏的包排在前面，其余保持原有顺序
    pub fn prioritize<'a>(&self, packages: &'a [Package]) -> Vec<&'a Package> {
        let (mut favorites, others): (Vec<&Package>, Vec<&Package>) =
            packages.iter().partition(|p| self.contains(&p.name));
        favorites.extend(others);
        favorites
    }
}
