//! 外部存储协作方接口
//!
//! 包清单、收藏和预设的实际存放位置对核心不可见，核心只通过 `LauncherBackend` 访问。
//! 所有操作都可能挂起并失败。

mod fs;
mod memory;

pub use fs::FsBackend;
pub use memory::MemoryBackend;

use crate::core::AppResult;
use crate::models::{Package, Preset};
use async_trait::async_trait;
use std::collections::BTreeSet;

#[async_trait]
pub trait LauncherBackend: Send + Sync {
    /// 列出当前所有包及其开关状态
    async fn list_packages(&self) -> AppResult<Vec<Package>>;

    /// 修改单个包的开关
    async fn set_package_enabled(&self, name: &str, enabled: bool) -> AppResult<()>;

    async fn load_favorites(&self) -> AppResult<Vec<String>>;

    /// 整体覆盖收藏列表
    async fn save_favorites(&self, favorites: &[String]) -> AppResult<()>;

    /// 读取全部预设和默认预设名
    async fn load_presets(&self) -> AppResult<(Vec<Preset>, Option<String>)>;

    /// 创建预设，重名返回 `DuplicateName`；校验与写入是原子的
    async fn create_preset(
        &self,
        name: &str,
        package_names: &BTreeSet<String>,
        context_label: &str,
    ) -> AppResult<Preset>;

    /// 删除预设，若为默认预设则同时清除默认指针
    async fn delete_preset(&self, name: &str) -> AppResult<()>;

    /// 设为默认预设，并用 `package_names` 覆盖该预设的内容
    async fn set_default_preset(&self, name: &str, package_names: &BTreeSet<String>)
        -> AppResult<()>;
}
