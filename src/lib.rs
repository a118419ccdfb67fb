// lib.rs - 暴露核心服务给命令行和其他前端使用

pub mod core; // 核心基础设施层
pub mod data; // 统一数据管理层
pub mod models;
pub mod services;
pub mod utils;

pub use models::*;
pub use services::{
    search_filter, ApplyReport, Binding, FavoritesSet, FsBackend, LauncherBackend, MemoryBackend,
    PackageRegistry, PackageView, PresetStore, ProfileReconciler,
};

// 重新导出常用类型
pub use anyhow::{Context, Result};

pub use core::{init_logger, update_log_level, AppResult, LauncherError};
