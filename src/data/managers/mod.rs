//! 数据管理器实现
//!
//! - `json`: JSON 文件管理器（无缓存，每次读取直接访问磁盘）

pub mod json;

pub use json::JsonManager;
