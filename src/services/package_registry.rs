//! 包注册表：当前已知的包及其开关状态
//!
//! 注册表从不修补自己的状态。单个包的开关写入后，调用方必须 `reload()`，
//! 之后注册表才重新可信；这是防止与存储端状态漂移的唯一手段。

use crate::core::AppResult;
use crate::models::Package;
use crate::services::backend::LauncherBackend;
use std::collections::BTreeSet;
use std::sync::Arc;

pub struct PackageRegistry {
    backend: Arc<dyn LauncherBackend>,
    packages: Vec<Package>,
}

impl PackageRegistry {
    pub fn new(backend: Arc<dyn LauncherBackend>) -> Self {
        Self {
            backend,
            packages: Vec::new(),
        }
    }

    /// 从存储端整体替换包列表；失败时保留上一次成功的结果
    pub async fn reload(&mut self) -> AppResult<&[Package]> {
        match self.backend.list_packages().await {
            Ok(packages) => {
                tracing::debug!(count = packages.len(), "包列表已重新加载");
                self.packages = packages;
                Ok(&self.packages)
            }
            Err(e) => {
                tracing::warn!(error = %e, "重新加载包列表失败，保留上次结果");
                Err(e)
            }
        }
    }

    /// 请求修改单个包的开关，本地状态不变，调用方随后需要 `reload()`
    pub async fn set_enabled(&self, name: &str, enabled: bool) -> AppResult<()> {
        self.backend.set_package_enabled(name, enabled).await
    }

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn get(&self, name: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.name == name)
    }

    /// 当前已启用的包名
    pub fn enabled_names(&self) -> BTreeSet<String> {
        self.packages
            .iter()
            .filter(|p| p.enabled)
            .map(|p| p.name.clone())
            .collect()
    }

    /// 按条件筛选，返回可重复遍历的视图
    pub fn filter<P>(&self, predicate: P) -> PackageView<'_, P>
    where
        P: Fn(&Package) -> bool,
    {
        PackageView {
            packages: &self.packages,
            predicate,
        }
    }
}

/// 注册表的只读筛选视图，按开关分为两组
pub struct PackageView<'a, P> {
    packages: &'a [Package],
    predicate: P,
}

impl<'a, P> PackageView<'a, P>
where
    P: Fn(&Package) -> bool,
{
    pub fn all(&self) -> impl Iterator<Item = &'a Package> + '_ {
        self.packages.iter().filter(move |p| (self.predicate)(*p))
    }

    pub fn enabled(&self) -> impl Iterator<Item = &'a Package> + '_ {
        self.all().filter(|p| p.enabled)
    }

    pub fn disabled(&self) -> impl Iterator<Item = &'a Package> + '_ {
        self.all().filter(|p| !p.enabled)
    }
}

/// 搜索条件：包名或清单路径包含关键字（大小写不敏感），空关键字匹配全部
pub fn search_filter(query: &str) -> impl Fn(&Package) -> bool {
    let needle = query.trim().to_lowercase();
    move |pkg: &Package| {
        needle.is_empty()
            || pkg.name.to_lowercase().contains(&needle)
            || pkg
                .source_path
                .to_string_lossy()
                .to_lowercase()
                .contains(&needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::backend::MemoryBackend;

    fn names<'a>(iter: impl Iterator<Item = &'a Package>) -> Vec<&'a str> {
        iter.map(|p| p.name.as_str()).collect()
    }

    #[tokio::test]
    async fn reload_replaces_whole_set() {
        let backend = Arc::new(MemoryBackend::with_packages([("a", true), ("b", false)]));
        let mut registry = PackageRegistry::new(backend.clone());
        registry.reload().await.unwrap();
        assert_eq!(registry.packages().len(), 2);

        backend.remove_package("b");
        backend.insert_package("c", true);
        registry.reload().await.unwrap();

        assert_eq!(names(registry.packages().iter()), vec!["a", "c"]);
    }

    #[tokio::test]
    async fn failed_reload_keeps_previous_set() {
        let backend = Arc::new(MemoryBackend::with_packages([("a", true)]));
        let mut registry = PackageRegistry::new(backend.clone());
        registry.reload().await.unwrap();

        backend.set_offline(true);
        let err = registry.reload().await.unwrap_err();
        assert!(err.is_persistence());
        assert_eq!(names(registry.packages().iter()), vec!["a"]);
    }

    #[tokio::test]
    async fn set_enabled_does_not_patch_local_state() {
        let backend = Arc::new(MemoryBackend::with_packages([("a", true)]));
        let mut registry = PackageRegistry::new(backend.clone());
        registry.reload().await.unwrap();

        registry.set_enabled("a", false).await.unwrap();
        assert!(registry.get("a").unwrap().enabled);
        assert_eq!(backend.package_enabled("a"), Some(false));

        registry.reload().await.unwrap();
        assert!(!registry.get("a").unwrap().enabled);
    }

    #[tokio::test]
    async fn filter_partitions_and_restarts() {
        let backend = Arc::new(MemoryBackend::with_packages([
            ("axiom", true),
            ("mops", false),
            ("redshift", true),
        ]));
        let mut registry = PackageRegistry::new(backend);
        registry.reload().await.unwrap();

        let view = registry.filter(|p| p.name != "axiom");
        assert_eq!(names(view.enabled()), vec!["redshift"]);
        assert_eq!(names(view.disabled()), vec!["mops"]);
        // 视图可重复遍历
        assert_eq!(view.all().count(), 2);
        assert_eq!(view.all().count(), 2);
    }

    #[tokio::test]
    async fn search_matches_name_and_path() {
        let backend = Arc::new(MemoryBackend::with_packages([
            ("Redshift", true),
            ("mops", false),
        ]));
        let mut registry = PackageRegistry::new(backend);
        registry.reload().await.unwrap();

        assert_eq!(names(registry.filter(search_filter("RED")).all()), vec!["Redshift"]);
        assert_eq!(names(registry.filter(search_filter("memory://mo")).all()), vec!["mops"]);
        assert_eq!(registry.filter(search_filter("  ")).all().count(), 2);
    }

    #[tokio::test]
    async fn enabled_names_snapshot() {
        let backend = Arc::new(MemoryBackend::with_packages([("a", true), ("b", false)]));
        let mut registry = PackageRegistry::new(backend);
        registry.reload().await.unwrap();
        assert_eq!(registry.enabled_names(), BTreeSet::from(["a".to_string()]));
    }
}
