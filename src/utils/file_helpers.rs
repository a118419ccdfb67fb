//! 文件操作辅助函数
//!
//! 提供跨进程的文件排他锁，用于保护"读取-校验-写入"序列。

use crate::data::{DataError, Result};
use fs2::FileExt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// 排他文件锁，drop 时自动释放
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// 为目标文件获取排他锁（阻塞等待其他写操作完成）
    ///
    /// 锁文件与目标文件同目录，扩展名为 `.lock`。
    pub fn acquire(target: &Path) -> Result<Self> {
        let path = target.with_extension("lock");
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| DataError::io(parent.to_path_buf(), e))?;
        }
        let file = File::create(&path).map_err(|e| DataError::io(path.clone(), e))?;
        file.lock_exclusive()
            .map_err(|e| DataError::Concurrency(format!("获取文件锁失败 {path:?}: {e}")))?;
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            tracing::warn!(path = ?self.path, error = %e, "释放文件锁失败");
        }
    }
}
