//! JSON 文件管理器
//!
//! 提供 JSON 文件的读写和操作，支持：
//! - 整体读写（`Value` 或强类型）
//! - 键路径写入（支持嵌套键如 "env.HOUDINI_PATH"）
//! - 自动创建父目录
//!
//! 不做任何缓存：包清单、预设和收藏文件可能被外部修改，每次读取都直接访问磁盘。

use crate::data::{DataError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// JSON 文件管理器
#[derive(Debug, Default, Clone)]
pub struct JsonManager;

impl JsonManager {
    pub fn new() -> Self {
        Self
    }

    /// 读取整个 JSON 文件
    pub fn read(&self, path: &Path) -> Result<Value> {
        let content = fs::read_to_string(path).map_err(|e| DataError::io(path.to_path_buf(), e))?;
        let value: Value = serde_json::from_str(&content)?;
        Ok(value)
    }

    /// 读取并反序列化为指定类型
    pub fn read_as<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let value = self.read(path)?;
        Ok(serde_json::from_value(value)?)
    }

    /// 读取并反序列化，文件不存在时返回 `None`
    pub fn read_optional<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }
        self.read_as(path).map(Some)
    }

    /// 写入整个 JSON 文件（格式化输出，自动创建父目录）
    pub fn write(&self, path: &Path, value: &Value) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| DataError::io(parent.to_path_buf(), e))?;
        }

        let content = serde_json::to_string_pretty(value)?;
        fs::write(path, content).map_err(|e| DataError::io(path.to_path_buf(), e))?;
        Ok(())
    }

    /// 序列化后写入
    pub fn write_as<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let value = serde_json::to_value(data)?;
        self.write(path, &value)
    }

    /// 设置指定键的值，保留文件中其余字段
    ///
    /// 文件必须已存在；自动创建不存在的中间对象。根或已有的中间值不是对象时
    /// 返回 `InvalidKey`，文件保持不变。
    pub fn set(&self, path: &Path, key: &str, new_value: Value) -> Result<()> {
        if !path.exists() {
            return Err(DataError::NotFound(path.display().to_string()));
        }
        let mut value = self.read(path)?;
        let key_path = parse_key_path(key);
        set_nested(&mut value, &key_path, new_value)?;
        self.write(path, &value)
    }
}

/// 解析键路径
fn parse_key_path(key: &str) -> Vec<&str> {
    key.split('.').collect()
}

/// 设置嵌套值，不覆盖任何非对象值
fn set_nested(value: &mut Value, path: &[&str], new_value: Value) -> Result<()> {
    let Some((last, parents)) = path.split_last() else {
        return Err(DataError::InvalidKey("空键路径".into()));
    };
    if last.is_empty() {
        return Err(DataError::InvalidKey("空键路径".into()));
    }

    let mut current = value;
    for (depth, &segment) in parents.iter().enumerate() {
        current = match current {
            Value::Object(map) => map
                .entry(segment)
                .or_insert_with(|| Value::Object(serde_json::Map::new())),
            _ => {
                return Err(DataError::InvalidKey(format!(
                    "{} 不是对象",
                    display_prefix(path, depth)
                )))
            }
        };
    }

    match current {
        Value::Object(map) => {
            map.insert(last.to_string(), new_value);
            Ok(())
        }
        _ => Err(DataError::InvalidKey(format!(
            "{} 不是对象",
            display_prefix(path, parents.len())
        ))),
    }
}

/// 前 `depth` 段键路径，根显示为 `<root>`
fn display_prefix(path: &[&str], depth: usize) -> String {
    if depth == 0 {
        "<root>".to_string()
    } else {
        path[..depth].join(".")
    }
}
