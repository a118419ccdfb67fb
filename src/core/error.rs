//! 核心错误类型
//!
//! 包开关与预设协调过程中可能出现的全部错误。任何错误都只影响当次操作，
//! 内存状态保持在最近一次成功的结果。

use crate::data::DataError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LauncherError {
    /// 存储端不可达或拒绝写入，不会自动重试
    #[error("持久化失败: {0}")]
    Persistence(#[from] DataError),

    #[error("预设名称已存在: {0}")]
    DuplicateName(String),

    #[error("预设不存在: {0}")]
    NotFound(String),

    /// 应用预设时部分包的开关写入失败，`failed` 为失败的包名
    #[error("预设 {preset} 部分应用失败: {}", failed.join(", "))]
    PartialApply { preset: String, failed: Vec<String> },

    #[error("无效的预设名称: {0:?}")]
    InvalidName(String),
}

pub type AppResult<T> = std::result::Result<T, LauncherError>;

impl LauncherError {
    /// 是否为存储层错误
    pub fn is_persistence(&self) -> bool {
        matches!(self, LauncherError::Persistence(_))
    }
}
