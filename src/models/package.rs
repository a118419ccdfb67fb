use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// 包清单中表示搜索路径的 env 键
const PATH_KEYS: [&str; 2] = ["hpath", "path"];

/// 指向配置根目录的内置变量
const CONFIG_ROOT_VAR: &str = "CONFIG_ROOT_PATH";

/// 可开关的插件包
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// 包名，在一次加载结果中唯一
    pub name: String,
    pub enabled: bool,
    /// 包清单位置，仅用于展示
    pub source_path: PathBuf,
    /// 发现该包时所在的配置根目录
    pub origin_scope: PathBuf,
    /// 清单中 `hpath` / `path` 指向但不存在的路径（展开变量后）
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_paths: Vec<PathBuf>,
}

impl Package {
    pub fn new(
        name: impl Into<String>,
        enabled: bool,
        source_path: impl Into<PathBuf>,
        origin_scope: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            enabled,
            source_path: source_path.into(),
            origin_scope: origin_scope.into(),
            missing_paths: Vec::new(),
        }
    }

    pub fn with_missing_paths(mut self, missing_paths: Vec<PathBuf>) -> Self {
        self.missing_paths = missing_paths;
        self
    }

    pub fn has_missing_paths(&self) -> bool {
        !self.missing_paths.is_empty()
    }
}

/// 收集清单 `env` 数组中的字符串/数字变量
fn manifest_env(manifest: &Value) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    let entries = manifest
        .get("env")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object);
    for entry in entries {
        for (key, value) in entry {
            match value {
                Value::String(s) => {
                    vars.insert(key.clone(), s.clone());
                }
                Value::Number(n) => {
                    vars.insert(key.clone(), n.to_string());
                }
                _ => {}
            }
        }
    }
    vars
}

/// 展开 `$VAR`：先用清单自身的变量，再用 `$CONFIG_ROOT_PATH`
///
/// 长变量名优先替换，避免 `$RS` 截断 `$RS_ROOT`。
fn expand_vars(raw: &str, vars: &HashMap<String, String>, config_root: &Path) -> String {
    let mut keys: Vec<&String> = vars.keys().collect();
    keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let mut expanded = raw.to_string();
    for key in keys {
        expanded = expanded.replace(&format!("${key}"), &vars[key]);
    }
    expanded.replace(
        &format!("${CONFIG_ROOT_VAR}"),
        &config_root.to_string_lossy(),
    )
}

/// 找出清单中指向不存在位置的搜索路径
///
/// 以 `;` 分隔的多个路径逐一检查，`&`（Houdini 默认路径占位）和空段跳过。
pub fn find_missing_paths(manifest: &Value, config_root: &Path) -> Vec<PathBuf> {
    let vars = manifest_env(manifest);
    let mut missing = Vec::new();

    let entries = manifest
        .get("env")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object);
    for entry in entries {
        for (key, value) in entry {
            if !PATH_KEYS.contains(&key.as_str()) {
                continue;
            }
            let Some(raw) = value.as_str() else {
                continue;
            };
            for segment in raw.split(';').map(str::trim) {
                if segment.is_empty() || segment == "&" {
                    continue;
                }
                let resolved = PathBuf::from(expand_vars(segment, &vars, config_root));
                if !resolved.exists() {
                    missing.push(resolved);
                }
            }
        }
    }
    missing
}
