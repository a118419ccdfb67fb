//! 预设与包开关状态的协调
//!
//! `PackageRegistry` 与 `PresetStore` 互不调用，两者之间的规则都在这里：
//! 应用预设、从当前开关状态捕获预设、维护会话内的"当前预设"绑定。
//!
//! 绑定只存在于会话内，不持久化。任何直接切换包开关的操作都会解除绑定；
//! 部分失败的应用永远不会进入 `Bound`。

use crate::core::{AppResult, LauncherError};
use crate::models::{Preset, PresetListing};
use crate::services::backend::LauncherBackend;
use crate::services::package_registry::PackageRegistry;
use crate::services::preset_store::PresetStore;
use futures_util::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;

/// 会话内的当前预设绑定
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Binding {
    #[default]
    Unbound,
    Bound(String),
}

impl Binding {
    pub fn name(&self) -> Option<&str> {
        match self {
            Binding::Bound(name) => Some(name),
            Binding::Unbound => None,
        }
    }
}

/// 一次成功应用的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyReport {
    pub preset: String,
    /// 开关状态实际发生变化的包（按名称排序）
    pub changed: Vec<String>,
}

pub struct ProfileReconciler {
    registry: PackageRegistry,
    presets: PresetStore,
    binding: Binding,
}

impl ProfileReconciler {
    pub fn new(backend: Arc<dyn LauncherBackend>) -> Self {
        Self {
            registry: PackageRegistry::new(backend.clone()),
            presets: PresetStore::new(backend),
            binding: Binding::Unbound,
        }
    }

    /// 启动时加载包列表与预设
    pub async fn load(&mut self) -> AppResult<()> {
        self.registry.reload().await?;
        self.presets.load().await?;
        Ok(())
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    pub fn current_preset_name(&self) -> Option<&str> {
        self.binding.name()
    }

    pub fn registry(&self) -> &PackageRegistry {
        &self.registry
    }

    pub fn presets(&self) -> &PresetStore {
        &self.presets
    }

    pub fn list(&self) -> PresetListing {
        self.presets.list()
    }

    /// 重新读取包列表（外部修改后使用）
    pub async fn reload_packages(&mut self) -> AppResult<()> {
        self.registry.reload().await?;
        Ok(())
    }

    /// 把预设应用到所有已知包
    ///
    /// 每个包都会收到一次开关写入（包括状态未变的包），全部结束后重新加载。
    /// 任一写入失败返回 `PartialApply`，绑定变为 `Unbound`；
    /// 预设不存在返回 `NotFound`，不发送任何写入。
    pub async fn apply_preset(&mut self, name: &str) -> AppResult<ApplyReport> {
        let preset = self
            .presets
            .get(name)
            .cloned()
            .ok_or_else(|| LauncherError::NotFound(name.to_string()))?;

        let before: BTreeMap<String, bool> = self
            .registry
            .packages()
            .iter()
            .map(|p| (p.name.clone(), p.enabled))
            .collect();
        let targets: Vec<(&str, bool)> = before
            .keys()
            .map(|pkg| (pkg.as_str(), preset.contains(pkg)))
            .collect();

        tracing::info!(
            preset = %name,
            packages = targets.len(),
            enabled = preset.package_names.len(),
            "开始应用预设"
        );

        let registry = &self.registry;
        let results = join_all(targets.iter().map(|(pkg, enabled)| async move {
            (*pkg, registry.set_enabled(pkg, *enabled).await)
        }))
        .await;

        let failed: Vec<String> = results
            .into_iter()
            .filter_map(|(pkg, result)| match result {
                Ok(()) => None,
                Err(e) => {
                    tracing::warn!(preset = %name, package = %pkg, error = %e, "包开关写入失败");
                    Some(pkg.to_string())
                }
            })
            .collect();

        let reloaded = self.registry.reload().await;

        if !failed.is_empty() {
            if let Err(e) = &reloaded {
                tracing::warn!(error = %e, "部分应用后重新加载失败");
            }
            self.binding = Binding::Unbound;
            return Err(LauncherError::PartialApply {
                preset: name.to_string(),
                failed,
            });
        }

        if let Err(e) = reloaded {
            self.binding = Binding::Unbound;
            return Err(e);
        }

        let changed: Vec<String> = self
            .registry
            .packages()
            .iter()
            .filter(|p| before.get(&p.name).is_some_and(|was| *was != p.enabled))
            .map(|p| p.name.clone())
            .collect();

        self.binding = Binding::Bound(name.to_string());
        tracing::info!(preset = %name, changed = changed.len(), "预设已应用");
        Ok(ApplyReport {
            preset: name.to_string(),
            changed,
        })
    }

    /// 若设置了默认预设则应用它
    pub async fn apply_default_preset(&mut self) -> AppResult<Option<ApplyReport>> {
        let Some(name) = self.presets.default_name().map(str::to_string) else {
            tracing::debug!("未设置默认预设");
            return Ok(None);
        };
        self.apply_preset(&name).await.map(Some)
    }

    /// 用当前已启用的包创建预设，并绑定到该预设
    pub async fn capture_preset(&mut self, name: &str, context_label: &str) -> AppResult<Preset> {
        let snapshot = self.registry.enabled_names();
        let preset = self.presets.create(name, snapshot, context_label).await?;
        self.binding = Binding::Bound(preset.name.clone());
        Ok(preset)
    }

    pub fn clear_binding(&mut self) {
        if let Binding::Bound(name) = &self.binding {
            tracing::debug!(preset = %name, "解除当前预设绑定");
        }
        self.binding = Binding::Unbound;
    }

    /// 直接切换单个包：写入 → 解除绑定 → 重新加载
    ///
    /// 写入失败时绑定保持不变。
    pub async fn toggle_package(&mut self, name: &str, enabled: bool) -> AppResult<()> {
        self.registry.set_enabled(name, enabled).await?;
        self.clear_binding();
        self.registry.reload().await?;
        tracing::info!(package = %name, enabled, "包开关已切换");
        Ok(())
    }

    /// 删除预设；若删除的是当前绑定的预设则解除绑定
    pub async fn delete_preset(&mut self, name: &str) -> AppResult<()> {
        self.presets.delete(name).await?;
        if self.binding.name() == Some(name) {
            self.binding = Binding::Unbound;
        }
        Ok(())
    }

    /// 设为默认预设，并用当前已启用的包覆盖其内容
    pub async fn set_default_preset(&mut self, name: &str) -> AppResult<()> {
        let snapshot = self.registry.enabled_names();
        self.presets.set_default(name, snapshot).await
    }
}
