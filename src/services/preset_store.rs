//! 预设存储：预设列表与默认预设指针
//!
//! 所有修改先交给存储端，确认成功后才更新内存副本。默认指针与预设列表
//! 总是在同一次 `&mut self` 调用内一起更新，`list()` 不会看到悬空的默认指针。

use crate::core::{AppResult, LauncherError};
use crate::models::{Preset, PresetListing, PresetsFile};
use crate::services::backend::LauncherBackend;
use std::collections::BTreeSet;
use std::sync::Arc;

pub struct PresetStore {
    backend: Arc<dyn LauncherBackend>,
    presets: Vec<Preset>,
    default_name: Option<String>,
}

/// 预设名称不能为空白
fn validate_preset_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(LauncherError::InvalidName(name.to_string()));
    }
    Ok(())
}

impl PresetStore {
    pub fn new(backend: Arc<dyn LauncherBackend>) -> Self {
        Self {
            backend,
            presets: Vec::new(),
            default_name: None,
        }
    }

    /// 从存储端重新读取全部预设；失败时保留上次结果
    pub async fn load(&mut self) -> AppResult<()> {
        let (presets, default) = self.backend.load_presets().await?;
        let mut file = PresetsFile {
            default,
            presets,
            ..Default::default()
        };
        file.normalize();
        tracing::debug!(
            count = file.presets.len(),
            default = ?file.default,
            "预设已加载"
        );
        self.presets = file.presets;
        self.default_name = file.default;
        Ok(())
    }

    /// 当前预设列表与默认预设
    pub fn list(&self) -> PresetListing {
        PresetListing {
            presets: self.presets.clone(),
            default_name: self.default_name.clone(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.name == name)
    }

    pub fn default_name(&self) -> Option<&str> {
        self.default_name.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// 创建预设，重名时返回 `DuplicateName` 且不修改已有预设
    pub async fn create(
        &mut self,
        name: &str,
        package_names: BTreeSet<String>,
        context_label: &str,
    ) -> AppResult<Preset> {
        validate_preset_name(name)?;
        if self.get(name).is_some() {
            return Err(LauncherError::DuplicateName(name.to_string()));
        }

        // 存储端在锁内再次校验，覆盖内存副本过期的情况
        let preset = self
            .backend
            .create_preset(name, &package_names, context_label)
            .await?;
        tracing::info!(
            preset = %preset.name,
            packages = preset.package_names.len(),
            context = %preset.context_label,
            "已创建预设"
        );
        self.presets.push(preset.clone());
        Ok(preset)
    }

    /// 删除预设；若为默认预设则一并清除默认指针
    pub async fn delete(&mut self, name: &str) -> AppResult<()> {
        self.backend.delete_preset(name).await?;

        self.presets.retain(|p| p.name != name);
        if self.default_name.as_deref() == Some(name) {
            self.default_name = None;
            tracing::info!(preset = %name, "已删除默认预设，默认指针已清除");
        } else {
            tracing::info!(preset = %name, "已删除预设");
        }
        Ok(())
    }

    /// 设为默认预设，同时用 `snapshot` 覆盖该预设的包列表
    pub async fn set_default(&mut self, name: &str, snapshot: BTreeSet<String>) -> AppResult<()> {
        self.backend.set_default_preset(name, &snapshot).await?;

        match self.presets.iter_mut().find(|p| p.name == name) {
            Some(preset) => {
                preset.package_names = snapshot;
                self.default_name = Some(name.to_string());
            }
            None => {
                // 内存副本落后于存储端，整体重新读取
                tracing::debug!(preset = %name, "本地缺少该预设，重新加载");
                self.load().await?;
            }
        }
        tracing::info!(preset = %name, "已设为默认预设");
        Ok(())
    }
}
