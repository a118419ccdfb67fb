//! 基于配置根目录的文件存储
//!
//! 目录结构：
//! - {root}/packages/{name}.json         包清单，`enable` 字段为开关
//! - {root}/config/launcher_presets.json 预设列表与默认预设
//! - {root}/config/launcher_favorites.json 收藏列表

use super::LauncherBackend;
use crate::core::{AppResult, LauncherError};
use crate::data::{DataError, JsonManager};
use crate::models::{find_missing_paths, ConfigPaths, FavoritesFile, Package, Preset, PresetsFile};
use crate::utils::FileLock;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

pub struct FsBackend {
    paths: ConfigPaths,
    json: JsonManager,
}

impl FsBackend {
    pub fn new(paths: ConfigPaths) -> Self {
        Self {
            paths,
            json: JsonManager::new(),
        }
    }

    pub fn from_root(root: &Path) -> Self {
        Self::new(ConfigPaths::from_root(root))
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    fn package_path(&self, name: &str) -> AppResult<std::path::PathBuf> {
        // 包名来自文件名，不允许跨目录
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(DataError::InvalidKey(format!("非法包名: {name}")).into());
        }
        Ok(self.paths.packages_dir.join(format!("{name}.json")))
    }

    fn read_presets_file(&self) -> AppResult<PresetsFile> {
        let mut file: PresetsFile = self
            .json
            .read_optional(&self.paths.presets_file)?
            .unwrap_or_default();
        file.normalize();
        Ok(file)
    }

    fn write_presets_file(&self, file: &mut PresetsFile) -> AppResult<()> {
        file.touch();
        self.json.write_as(&self.paths.presets_file, file)?;
        Ok(())
    }

    /// 在文件锁保护下读取、修改并写回预设文件
    fn update_presets<T>(
        &self,
        mutate: impl FnOnce(&mut PresetsFile) -> AppResult<T>,
    ) -> AppResult<T> {
        let _lock = FileLock::acquire(&self.paths.presets_file)?;
        let mut file = self.read_presets_file()?;
        let result = mutate(&mut file)?;
        self.write_presets_file(&mut file)?;
        Ok(result)
    }
}

#[async_trait]
impl LauncherBackend for FsBackend {
    async fn list_packages(&self) -> AppResult<Vec<Package>> {
        let dir = &self.paths.packages_dir;
        if !dir.exists() {
            tracing::debug!(dir = ?dir, "包目录不存在，返回空列表");
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(dir).map_err(|e| DataError::io(dir.clone(), e))?;
        let mut packages = Vec::new();

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            match self.json.read(&path) {
                Ok(data) if !data.is_object() => {
                    tracing::warn!(path = ?path, "包清单顶层不是对象，已跳过");
                }
                Ok(data) => {
                    let enabled = data.get("enable").and_then(Value::as_bool).unwrap_or(true);
                    let missing = find_missing_paths(&data, &self.paths.root);
                    if !missing.is_empty() {
                        tracing::debug!(package = %name, missing = ?missing, "包清单引用的路径不存在");
                    }
                    packages.push(
                        Package::new(name, enabled, path.clone(), self.paths.root.clone())
                            .with_missing_paths(missing),
                    );
                }
                Err(e) => {
                    tracing::warn!(path = ?path, error = %e, "解析包清单失败，已跳过");
                }
            }
        }

        packages.sort_by_key(|p| p.name.to_lowercase());
        Ok(packages)
    }

    async fn set_package_enabled(&self, name: &str, enabled: bool) -> AppResult<()> {
        let path = self.package_path(name)?;
        self.json.set(&path, "enable", Value::Bool(enabled))?;
        tracing::debug!(package = %name, enabled, "已写入包开关");
        Ok(())
    }

    async fn load_favorites(&self) -> AppResult<Vec<String>> {
        let file: Option<FavoritesFile> = self.json.read_optional(&self.paths.favorites_file)?;
        Ok(file.map(|f| f.favorites).unwrap_or_default())
    }

    async fn save_favorites(&self, favorites: &[String]) -> AppResult<()> {
        let file = FavoritesFile {
            favorites: favorites.to_vec(),
        };
        self.json.write_as(&self.paths.favorites_file, &file)?;
        Ok(())
    }

    async fn load_presets(&self) -> AppResult<(Vec<Preset>, Option<String>)> {
        let file = self.read_presets_file()?;
        Ok((file.presets, file.default))
    }

    async fn create_preset(
        &self,
        name: &str,
        package_names: &BTreeSet<String>,
        context_label: &str,
    ) -> AppResult<Preset> {
        self.update_presets(|file| {
            if file.presets.iter().any(|p| p.name == name) {
                return Err(LauncherError::DuplicateName(name.to_string()));
            }
            let preset = Preset::new(name, package_names.clone(), context_label);
            file.presets.push(preset.clone());
            Ok(preset)
        })
    }

    async fn delete_preset(&self, name: &str) -> AppResult<()> {
        self.update_presets(|file| {
            let before = file.presets.len();
            file.presets.retain(|p| p.name != name);
            if file.presets.len() == before {
                return Err(LauncherError::NotFound(name.to_string()));
            }
            if file.default.as_deref() == Some(name) {
                file.default = None;
            }
            Ok(())
        })
    }

    async fn set_default_preset(
        &self,
        name: &str,
        package_names: &BTreeSet<String>,
    ) -> AppResult<()> {
        self.update_presets(|file| {
            let preset = file
                .presets
                .iter_mut()
                .find(|p| p.name == name)
                .ok_or_else(|| LauncherError::NotFound(name.to_string()))?;
            preset.package_names = package_names.clone();
            file.default = Some(name.to_string());
            Ok(())
        })
    }
}
