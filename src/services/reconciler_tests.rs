// 预设协调场景测试
//
// 使用 MemoryBackend 驱动完整的 捕获 / 应用 / 默认预设 / 删除 流程。

use crate::core::{AppResult, LauncherError};
use crate::models::{Package, Preset};
use crate::services::backend::{FsBackend, LauncherBackend, MemoryBackend};
use crate::services::reconciler::{Binding, ProfileReconciler};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Barrier;

fn names(set: &[&str]) -> BTreeSet<String> {
    set.iter().map(|s| s.to_string()).collect()
}

async fn setup(packages: &[(&'static str, bool)]) -> (Arc<MemoryBackend>, ProfileReconciler) {
    let backend = Arc::new(MemoryBackend::with_packages(packages.iter().copied()));
    let mut reconciler = ProfileReconciler::new(backend.clone());
    reconciler.load().await.unwrap();
    (backend, reconciler)
}

#[tokio::test]
async fn render_scenario_capture_then_apply_restores_flags() {
    let (backend, mut reconciler) = setup(&[("A", false), ("B", true)]).await;

    reconciler.toggle_package("A", true).await.unwrap();
    reconciler.toggle_package("B", false).await.unwrap();
    let preset = reconciler.capture_preset("Render", "Houdini 20.5").await.unwrap();
    assert_eq!(preset.package_names, names(&["A"]));
    assert_eq!(reconciler.current_preset_name(), Some("Render"));

    reconciler.toggle_package("A", false).await.unwrap();
    reconciler.toggle_package("B", true).await.unwrap();
    assert_eq!(reconciler.current_preset_name(), None);

    let report = reconciler.apply_preset("Render").await.unwrap();
    assert_eq!(report.changed, vec!["A", "B"]);
    assert_eq!(backend.package_enabled("A"), Some(true));
    assert_eq!(backend.package_enabled("B"), Some(false));
    assert!(reconciler.registry().get("A").unwrap().enabled);
    assert!(!reconciler.registry().get("B").unwrap().enabled);
    assert_eq!(reconciler.binding(), &Binding::Bound("Render".to_string()));
}

#[tokio::test]
async fn set_default_overwrites_preset_with_current_flags() {
    let (_backend, mut reconciler) = setup(&[("A", true), ("B", false)]).await;
    reconciler.capture_preset("Render", "20.5").await.unwrap();

    reconciler.toggle_package("B", true).await.unwrap();
    reconciler.set_default_preset("Render").await.unwrap();

    let listing = reconciler.list();
    assert_eq!(listing.default_name.as_deref(), Some("Render"));
    assert_eq!(listing.get("Render").unwrap().package_names, names(&["A", "B"]));
}

#[tokio::test]
async fn deleting_default_preset_clears_default_and_binding() {
    let (_backend, mut reconciler) = setup(&[("A", true)]).await;
    reconciler.capture_preset("Render", "20.5").await.unwrap();
    reconciler.set_default_preset("Render").await.unwrap();

    reconciler.delete_preset("Render").await.unwrap();

    let listing = reconciler.list();
    assert!(listing.default_name.is_none());
    assert!(listing.presets.is_empty());
    assert_eq!(reconciler.binding(), &Binding::Unbound);
}

#[tokio::test]
async fn deleting_other_preset_keeps_binding() {
    let (_backend, mut reconciler) = setup(&[("A", true)]).await;
    reconciler.capture_preset("Lookdev", "20.5").await.unwrap();
    reconciler.capture_preset("Render", "20.5").await.unwrap();

    reconciler.delete_preset("Lookdev").await.unwrap();
    assert_eq!(reconciler.current_preset_name(), Some("Render"));
}

#[tokio::test]
async fn reapplying_is_idempotent() {
    let (backend, mut reconciler) = setup(&[("A", true), ("B", false), ("C", true)]).await;
    reconciler.capture_preset("Render", "20.5").await.unwrap();
    reconciler.toggle_package("C", false).await.unwrap();

    let first = reconciler.apply_preset("Render").await.unwrap();
    assert_eq!(first.changed, vec!["C"]);
    let calls = backend.set_enabled_calls();

    let second = reconciler.apply_preset("Render").await.unwrap();
    assert!(second.changed.is_empty());
    // 相同的开关再次全部下发
    assert_eq!(backend.set_enabled_calls(), calls + 3);
    assert_eq!(reconciler.current_preset_name(), Some("Render"));
}

#[tokio::test]
async fn capture_with_existing_name_fails_and_keeps_preset() {
    let (_backend, mut reconciler) = setup(&[("A", true), ("B", false)]).await;
    reconciler.capture_preset("Render", "20.5").await.unwrap();
    reconciler.toggle_package("B", true).await.unwrap();

    let err = reconciler.capture_preset("Render", "19.5").await.unwrap_err();
    assert!(matches!(err, LauncherError::DuplicateName(_)));

    let listing = reconciler.list();
    let preset = listing.get("Render").unwrap();
    assert_eq!(preset.package_names, names(&["A"]));
    assert_eq!(preset.context_label, "20.5");
    assert_eq!(reconciler.binding(), &Binding::Unbound);
}

#[tokio::test]
async fn direct_toggle_while_bound_clears_binding() {
    let (_backend, mut reconciler) = setup(&[("A", true)]).await;
    reconciler.capture_preset("Render", "20.5").await.unwrap();
    assert!(reconciler.current_preset_name().is_some());

    reconciler.toggle_package("A", false).await.unwrap();
    assert_eq!(reconciler.current_preset_name(), None);
}

#[tokio::test]
async fn failed_direct_toggle_keeps_binding() {
    let (backend, mut reconciler) = setup(&[("A", true)]).await;
    reconciler.capture_preset("Render", "20.5").await.unwrap();
    backend.fail_package("A");

    assert!(reconciler.toggle_package("A", false).await.is_err());
    assert_eq!(reconciler.current_preset_name(), Some("Render"));
}

#[tokio::test]
async fn partial_apply_reports_failed_packages_and_unbinds() {
    let (backend, mut reconciler) = setup(&[("A", false), ("B", false), ("C", true)]).await;
    reconciler.toggle_package("A", true).await.unwrap();
    reconciler.toggle_package("B", true).await.unwrap();
    reconciler.capture_preset("Render", "20.5").await.unwrap();
    reconciler.toggle_package("A", false).await.unwrap();
    reconciler.toggle_package("B", false).await.unwrap();
    reconciler.toggle_package("C", false).await.unwrap();

    backend.fail_package("B");
    let err = reconciler.apply_preset("Render").await.unwrap_err();
    match err {
        LauncherError::PartialApply { preset, failed } => {
            assert_eq!(preset, "Render");
            assert_eq!(failed, vec!["B"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(reconciler.binding(), &Binding::Unbound);

    // 成功的写入已生效，注册表重新加载后反映存储端
    assert!(reconciler.registry().get("A").unwrap().enabled);
    assert!(!reconciler.registry().get("B").unwrap().enabled);
    assert!(reconciler.registry().get("C").unwrap().enabled);

    backend.clear_failures();
    reconciler.apply_preset("Render").await.unwrap();
    assert_eq!(reconciler.current_preset_name(), Some("Render"));
}

#[tokio::test]
async fn applying_empty_preset_disables_everything() {
    let (backend, mut reconciler) = setup(&[("A", false), ("B", false)]).await;
    reconciler.capture_preset("Empty", "20.5").await.unwrap();
    reconciler.toggle_package("A", true).await.unwrap();
    reconciler.toggle_package("B", true).await.unwrap();

    reconciler.apply_preset("Empty").await.unwrap();
    assert_eq!(backend.package_enabled("A"), Some(false));
    assert_eq!(backend.package_enabled("B"), Some(false));
    assert!(reconciler.registry().enabled_names().is_empty());
}

#[tokio::test]
async fn applying_unknown_preset_is_not_found_and_sends_nothing() {
    let (backend, mut reconciler) = setup(&[("A", true)]).await;
    reconciler.capture_preset("Render", "20.5").await.unwrap();
    let calls = backend.set_enabled_calls();

    let err = reconciler.apply_preset("Ghost").await.unwrap_err();
    assert!(matches!(err, LauncherError::NotFound(ref n) if n == "Ghost"));
    assert_eq!(backend.set_enabled_calls(), calls);
    assert_eq!(reconciler.current_preset_name(), Some("Render"));
}

#[tokio::test]
async fn preset_names_for_missing_packages_are_inert() {
    let (backend, mut reconciler) = setup(&[("A", true), ("B", true)]).await;
    reconciler.capture_preset("Render", "20.5").await.unwrap();
    backend.remove_package("B");
    reconciler.reload_packages().await.unwrap();

    let report = reconciler.apply_preset("Render").await.unwrap();
    assert!(report.changed.is_empty());
    assert_eq!(backend.package_enabled("B"), None);
    assert_eq!(reconciler.current_preset_name(), Some("Render"));
}

#[tokio::test]
async fn offline_backend_fails_every_package() {
    let (backend, mut reconciler) = setup(&[("A", true)]).await;
    reconciler.capture_preset("Render", "20.5").await.unwrap();
    backend.set_offline(true);

    let err = reconciler.apply_preset("Render").await.unwrap_err();
    assert!(matches!(err, LauncherError::PartialApply { ref failed, .. } if failed == &["A"]));
    assert_eq!(reconciler.binding(), &Binding::Unbound);
}

#[tokio::test]
async fn apply_default_preset_restores_default() {
    let (backend, mut reconciler) = setup(&[("A", true), ("B", false)]).await;
    assert!(reconciler.apply_default_preset().await.unwrap().is_none());

    reconciler.capture_preset("Render", "20.5").await.unwrap();
    reconciler.set_default_preset("Render").await.unwrap();
    reconciler.toggle_package("A", false).await.unwrap();

    let report = reconciler.apply_default_preset().await.unwrap().unwrap();
    assert_eq!(report.preset, "Render");
    assert_eq!(backend.package_enabled("A"), Some(true));
    assert_eq!(reconciler.current_preset_name(), Some("Render"));
}

#[tokio::test]
async fn capture_then_apply_roundtrip_with_fresh_session() {
    let (backend, mut reconciler) = setup(&[("A", true), ("B", false), ("C", true)]).await;
    reconciler.capture_preset("Render", "20.5").await.unwrap();

    // 新会话从存储端读取同一份预设，绑定从 Unbound 开始
    let mut session = ProfileReconciler::new(backend.clone());
    session.load().await.unwrap();
    assert_eq!(session.binding(), &Binding::Unbound);
    session.toggle_package("A", false).await.unwrap();
    session.toggle_package("B", true).await.unwrap();

    session.apply_preset("Render").await.unwrap();
    assert_eq!(session.registry().enabled_names(), names(&["A", "C"]));
}

/// 开关写入需要全部同时在途才能继续（屏障），其中一个包额外延迟；
/// 记录每次列出包时已经结束的写入数
struct SettlingBackend {
    inner: MemoryBackend,
    barrier: Barrier,
    slow_package: &'static str,
    settled: AtomicUsize,
    settled_at_list: Mutex<Vec<usize>>,
}

impl SettlingBackend {
    fn new(packages: &[(&'static str, bool)], slow_package: &'static str) -> Self {
        Self {
            inner: MemoryBackend::with_packages(packages.iter().copied()),
            barrier: Barrier::new(packages.len()),
            slow_package,
            settled: AtomicUsize::new(0),
            settled_at_list: Mutex::new(Vec::new()),
        }
    }

    fn last_list_saw(&self) -> Option<usize> {
        self.settled_at_list.lock().unwrap().last().copied()
    }
}

#[async_trait]
impl LauncherBackend for SettlingBackend {
    async fn list_packages(&self) -> AppResult<Vec<Package>> {
        let settled = self.settled.load(Ordering::SeqCst);
        self.settled_at_list.lock().unwrap().push(settled);
        self.inner.list_packages().await
    }

    async fn set_package_enabled(&self, name: &str, enabled: bool) -> AppResult<()> {
        self.barrier.wait().await;
        if name == self.slow_package {
            tokio::time::sleep(Duration::from_millis(30)).await;
        }
        let result = self.inner.set_package_enabled(name, enabled).await;
        self.settled.fetch_add(1, Ordering::SeqCst);
        result
    }

    async fn load_favorites(&self) -> AppResult<Vec<String>> {
        self.inner.load_favorites().await
    }

    async fn save_favorites(&self, favorites: &[String]) -> AppResult<()> {
        self.inner.save_favorites(favorites).await
    }

    async fn load_presets(&self) -> AppResult<(Vec<Preset>, Option<String>)> {
        self.inner.load_presets().await
    }

    async fn create_preset(
        &self,
        name: &str,
        package_names: &BTreeSet<String>,
        context_label: &str,
    ) -> AppResult<Preset> {
        self.inner
            .create_preset(name, package_names, context_label)
            .await
    }

    async fn delete_preset(&self, name: &str) -> AppResult<()> {
        self.inner.delete_preset(name).await
    }

    async fn set_default_preset(
        &self,
        name: &str,
        package_names: &BTreeSet<String>,
    ) -> AppResult<()> {
        self.inner.set_default_preset(name, package_names).await
    }
}

#[tokio::test]
async fn apply_writes_run_concurrently_and_reload_waits_for_all() {
    let backend = Arc::new(SettlingBackend::new(
        &[("A", false), ("B", false), ("C", true)],
        "B",
    ));
    let mut reconciler = ProfileReconciler::new(backend.clone());
    backend
        .create_preset("Render", &names(&["A", "B"]), "20.5")
        .await
        .unwrap();
    reconciler.load().await.unwrap();

    // 三个写入必须同时在途才能通过屏障，串行下发会超时
    let report = tokio::time::timeout(Duration::from_secs(5), reconciler.apply_preset("Render"))
        .await
        .expect("writes were not issued concurrently")
        .unwrap();

    assert_eq!(backend.last_list_saw(), Some(3));
    assert_eq!(report.changed, vec!["A", "B", "C"]);
    assert_eq!(reconciler.registry().enabled_names(), names(&["A", "B"]));
}

#[tokio::test]
async fn partial_apply_reload_waits_for_slow_failure() {
    let backend = Arc::new(SettlingBackend::new(&[("A", false), ("B", false)], "B"));
    backend.inner.fail_package("B");
    let mut reconciler = ProfileReconciler::new(backend.clone());
    backend
        .create_preset("Render", &names(&["A", "B"]), "20.5")
        .await
        .unwrap();
    reconciler.load().await.unwrap();

    let err = tokio::time::timeout(Duration::from_secs(5), reconciler.apply_preset("Render"))
        .await
        .expect("writes were not issued concurrently")
        .unwrap_err();

    assert!(matches!(err, LauncherError::PartialApply { ref failed, .. } if failed == &["B"]));
    assert_eq!(backend.last_list_saw(), Some(2));
    assert!(reconciler.registry().get("A").unwrap().enabled);
}

#[tokio::test]
async fn toggle_package_does_not_read_presets() -> anyhow::Result<()> {
    let temp_dir = tempfile::TempDir::new()?;
    let packages_dir = temp_dir.path().join("packages");
    std::fs::create_dir_all(&packages_dir)?;
    std::fs::write(packages_dir.join("mops.json"), r#"{"enable": true}"#)?;
    let config_dir = temp_dir.path().join("config");
    std::fs::create_dir_all(&config_dir)?;
    std::fs::write(config_dir.join("launcher_presets.json"), "not json")?;

    let mut reconciler = ProfileReconciler::new(Arc::new(FsBackend::from_root(temp_dir.path())));
    assert!(reconciler.load().await.is_err());

    reconciler.reload_packages().await?;
    reconciler.toggle_package("mops", false).await?;
    assert!(!reconciler.registry().get("mops").unwrap().enabled);
    Ok(())
}
