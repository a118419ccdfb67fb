//! 统一错误类型定义
//!
//! 使用 `thiserror` 定义数据层的错误类型，并提供与 `anyhow` 的兼容层。

use std::path::PathBuf;
use thiserror::Error;

/// 数据层的统一错误类型
#[derive(Error, Debug)]
pub enum DataError {
    /// 文件 I/O 错误
    #[error("文件 I/O 错误: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON 序列化/反序列化错误
    #[error("JSON 序列化错误: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    /// 资源未找到
    #[error("未找到资源: {0}")]
    NotFound(String),

    /// 权限错误
    #[error("权限错误: {0}")]
    Permission(String),

    /// 并发错误（文件锁等）
    #[error("并发错误: {0}")]
    Concurrency(String),

    /// 存储端不可达
    #[error("存储不可用: {0}")]
    Unavailable(String),

    /// 无效的键路径
    #[error("无效的键路径: {0}")]
    InvalidKey(String),
}

/// 便于与现有代码集成的类型别名
pub type Result<T> = std::result::Result<T, DataError>;

impl DataError {
    /// 从 `std::io::Error` 和路径创建 I/O 错误
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
