//! 统一数据管理模块
//!
//! 提供 JSON 配置文件的统一读写接口。
//!
//! # 模块组织
//!
//! - `error`: 统一错误类型定义
//! - `managers`: 各格式管理器（目前仅 JSON）
//!
//! # 使用示例
//!
//! ```rust
//! use crate::data::managers::JsonManager;
//! use std::path::Path;
//!
//! let manager = JsonManager::new();
//! let presets = manager.read(Path::new("config/launcher_presets.json"))?;
//! ```

pub mod error;
pub mod managers;

pub use error::{DataError, Result};
pub use managers::JsonManager;
