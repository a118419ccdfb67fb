// 服务层模块
//
// - backend: 存储端抽象（文件系统 / 内存）
// - package_registry: 包列表与开关状态
// - favorites: 收藏集合
// - preset_store: 预设与默认预设
// - reconciler: 预设与包开关的协调、当前预设绑定

pub mod backend;
pub mod favorites;
pub mod package_registry;
pub mod preset_store;
pub mod reconciler;

#[cfg(test)]
mod reconciler_tests;

pub use backend::{FsBackend, LauncherBackend, MemoryBackend};
pub use favorites::FavoritesSet;
pub use package_registry::{search_filter, PackageRegistry, PackageView};
pub use preset_store::PresetStore;
pub use reconciler::{ApplyReport, Binding, ProfileReconciler};
