//! 内存存储，可注入故障，用于测试和嵌入场景

use super::LauncherBackend;
use crate::core::{AppResult, LauncherError};
use crate::data::DataError;
use crate::models::{Package, Preset};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MemoryState {
    /// 包名 -> 开关
    packages: BTreeMap<String, bool>,
    favorites: Vec<String>,
    presets: Vec<Preset>,
    default_name: Option<String>,
    offline: bool,
    failing_packages: HashSet<String>,
    set_enabled_calls: usize,
    save_favorites_calls: usize,
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
    origin_scope: PathBuf,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以给定的包开关初始化
    pub fn with_packages<'a>(packages: impl IntoIterator<Item = (&'a str, bool)>) -> Self {
        let backend = Self::new();
        {
            let mut state = backend.lock();
            for (name, enabled) in packages {
                state.packages.insert(name.to_string(), enabled);
            }
        }
        backend
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // 测试线程 panic 后仍然允许继续读取状态
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_online(state: &MemoryState) -> AppResult<()> {
        if state.offline {
            return Err(DataError::Unavailable("memory backend offline".to_string()).into());
        }
        Ok(())
    }

    /// 模拟存储端不可达
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// 令指定包的开关写入失败
    pub fn fail_package(&self, name: &str) {
        self.lock().failing_packages.insert(name.to_string());
    }

    pub fn clear_failures(&self) {
        self.lock().failing_packages.clear();
    }

    /// 绕过核心直接修改存储中的包（模拟外部变更）
    pub fn insert_package(&self, name: &str, enabled: bool) {
        self.lock().packages.insert(name.to_string(), enabled);
    }

    pub fn remove_package(&self, name: &str) {
        self.lock().packages.remove(name);
    }

    pub fn package_enabled(&self, name: &str) -> Option<bool> {
        self.lock().packages.get(name).copied()
    }

    pub fn stored_favorites(&self) -> Vec<String> {
        self.lock().favorites.clone()
    }

    pub fn set_enabled_calls(&self) -> usize {
        self.lock().set_enabled_calls
    }

    pub fn save_favorites_calls(&self) -> usize {
        self.lock().save_favorites_calls
    }
}

#[async_trait]
impl LauncherBackend for MemoryBackend {
    async fn list_packages(&self) -> AppResult<Vec<Package>> {
        let state = self.lock();
        Self::check_online(&state)?;
        Ok(state
            .packages
            .iter()
            .map(|(name, enabled)| {
                Package::new(
                    name.clone(),
                    *enabled,
                    PathBuf::from(format!("memory://{name}")),
                    self.origin_scope.clone(),
                )
            })
            .collect())
    }

    async fn set_package_enabled(&self, name: &str, enabled: bool) -> AppResult<()> {
        let mut state = self.lock();
        state.set_enabled_calls += 1;
        Self::check_online(&state)?;
        if state.failing_packages.contains(name) {
            return Err(DataError::Permission(format!("写入包 {name} 被拒绝")).into());
        }
        match state.packages.get_mut(name) {
            Some(flag) => {
                *flag = enabled;
                Ok(())
            }
            None => Err(DataError::NotFound(format!("包 {name}")).into()),
        }
    }

    async fn load_favorites(&self) -> AppResult<Vec<String>> {
        let state = self.lock();
        Self::check_online(&state)?;
        Ok(state.favorites.clone())
    }

    async fn save_favorites(&self, favorites: &[String]) -> AppResult<()> {
        let mut state = self.lock();
        state.save_favorites_calls += 1;
        Self::check_online(&state)?;
        state.favorites = favorites.to_vec();
        Ok(())
    }

    async fn load_presets(&self) -> AppResult<(Vec<Preset>, Option<String>)> {
        let state = self.lock();
        Self::check_online(&state)?;
        Ok((state.presets.clone(), state.default_name.clone()))
    }

    async fn create_preset(
        &self,
        name: &str,
        package_names: &BTreeSet<String>,
        context_label: &str,
    ) -> AppResult<Preset> {
        let mut state = self.lock();
        Self::check_online(&state)?;
        if state.presets.iter().any(|p| p.name == name) {
            return Err(LauncherError::DuplicateName(name.to_string()));
        }
        let preset = Preset::new(name, package_names.clone(), context_label);
        state.presets.push(preset.clone());
        Ok(preset)
    }

    async fn delete_preset(&self, name: &str) -> AppResult<()> {
        let mut state = self.lock();
        Self::check_online(&state)?;
        let before = state.presets.len();
        state.presets.retain(|p| p.name != name);
        if state.presets.len() == before {
            return Err(LauncherError::NotFound(name.to_string()));
        }
        if state.default_name.as_deref() == Some(name) {
            state.default_name = None;
        }
        Ok(())
    }

    async fn set_default_preset(
        &self,
        name: &str,
        package_names: &BTreeSet<String>,
    ) -> AppResult<()> {
        let mut state = self.lock();
        Self::check_online(&state)?;
        let preset = state
            .presets
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| LauncherError::NotFound(name.to_string()))?;
        preset.package_names = package_names.clone();
        state.default_name = Some(name.to_string());
        Ok(())
    }
}
