use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 预设：某一时刻已启用包名的快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    /// 快照时已启用的包名，可能包含当前已不存在的包
    #[serde(rename = "packages", default)]
    pub package_names: BTreeSet<String>,
    /// 创建预设时选中的 Houdini 版本（仅作信息展示），磁盘上的键为 `houdini`
    #[serde(rename = "houdini", alias = "context_label", default)]
    pub context_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_path: Option<String>,
    /// 其他未识别的字段，原样写回
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Preset {
    pub fn new(
        name: impl Into<String>,
        package_names: BTreeSet<String>,
        context_label: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            package_names,
            context_label: context_label.into(),
            avatar: None,
            avatar_path: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn contains(&self, package_name: &str) -> bool {
        self.package_names.contains(package_name)
    }
}

/// 预设列表与默认预设，总是成对返回
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetListing {
    pub presets: Vec<Preset>,
    pub default_name: Option<String>,
}

impl PresetListing {
    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.name == name)
    }

    pub fn is_default(&self, name: &str) -> bool {
        self.default_name.as_deref() == Some(name)
    }
}

// ==================== launcher_presets.json 结构 ====================

/// launcher_presets.json 顶层结构
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PresetsFile {
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub presets: Vec<Preset>,
    #[serde(default)]
    pub metadata: PresetsMetadata,
}

impl PresetsFile {
    /// 修正读取到的内容：重名预设只保留第一个，悬空的默认指针置空
    pub fn normalize(&mut self) {
        let mut seen = BTreeSet::new();
        self.presets.retain(|p| {
            if seen.insert(p.name.clone()) {
                true
            } else {
                tracing::warn!(preset = %p.name, "预设文件中存在重名预设，忽略后出现的条目");
                false
            }
        });

        if let Some(default) = &self.default {
            if !self.presets.iter().any(|p| &p.name == default) {
                tracing::warn!(preset = %default, "默认预设不存在，已清除默认指针");
                self.default = None;
            }
        }
    }

    pub fn touch(&mut self) {
        self.metadata.last_updated = Some(Utc::now());
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PresetsMetadata {
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

// ==================== launcher_favorites.json 结构 ====================

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FavoritesFile {
    #[serde(default)]
    pub favorites: Vec<String>,
}
