use tempfile::TempDir;
use url::Url;

use keeper_core::activator::PublishConvention;
use keeper_core::cache::CacheKey;
use keeper_core::config::PublishConfig;
use keeper_core::coordinator::Coordinator;
use keeper_core::error::KeeperError;
use keeper_core::publish::PublishPlanner;
use keeper_core::types::{DependencyType, ModuleRef};

fn config() -> PublishConfig {
    PublishConfig {
        group: Some("com.example".into()),
        artifact_prefix: "kit-".into(),
        version: Some("2.0.0".into()),
        release_repository: Some(Url::parse("https://repo.example.com/releases").unwrap()),
        snapshot_repository: Some(Url::parse("https://repo.example.com/snapshots").unwrap()),
        local_repository: Some(Url::parse("file:///tmp/m2").unwrap()),
        opt_out: vec![":samples".into()],
        ..PublishConfig::default()
    }
}

#[test]
fn plan_derives_coordinate_and_publications() {
    let module = ModuleRef::new(":libs:network", "/work/libs/network");
    let plan = PublishPlanner::new().plan(&module, &config()).unwrap().unwrap();

    assert_eq!(plan.module, ":libs:network");
    assert_eq!(plan.coordinate.to_string(), "com.example:kit-network:2.0.0");

    let release = plan.release().unwrap();
    assert_eq!(release.kind, DependencyType::Release);
    assert_eq!(
        release.repositories.iter().map(Url::as_str).collect::<Vec<_>>(),
        vec!["file:///tmp/m2", "https://repo.example.com/releases"]
    );

    let snapshot = plan.snapshot().unwrap();
    assert_eq!(snapshot.coordinate.version, "2.0.0-SNAPSHOT");
    assert_eq!(
        snapshot.repositories.last().map(Url::as_str),
        Some("https://repo.example.com/snapshots")
    );
}

#[test]
fn opted_out_module_does_not_publish() {
    let module = ModuleRef::new(":samples", "/work/samples");
    assert_eq!(PublishPlanner::new().plan(&module, &config()).unwrap(), None);
}

#[test]
fn disabled_publishing_skips_every_module() {
    let config = PublishConfig {
        enabled: false,
        ..config()
    };
    let module = ModuleRef::new(":lib", "/work/lib");
    assert_eq!(PublishPlanner::new().plan(&module, &config).unwrap(), None);
}

#[test]
fn unspecified_version_is_rejected() {
    let config = PublishConfig {
        version: Some("unspecified".into()),
        ..config()
    };
    let err = PublishPlanner::new()
        .plan(&ModuleRef::new(":lib", "/work/lib"), &config)
        .unwrap_err();
    let KeeperError::InvalidIdentifier { reason, .. } = err else {
        panic!("expected InvalidIdentifier");
    };
    assert!(reason.contains(":lib"));
}

#[test]
fn missing_group_is_a_config_error() {
    let config = PublishConfig {
        group: None,
        ..config()
    };
    let err = PublishPlanner::new()
        .plan(&ModuleRef::new(":lib", "/work/lib"), &config)
        .unwrap_err();
    assert!(matches!(err, KeeperError::ConfigInvalid { section: "publish", .. }));
}

#[test]
fn apply_records_publish_target() {
    let temp = TempDir::new().unwrap();
    let coordinator = Coordinator::for_root(ModuleRef::root("app", temp.path()));
    let module = ModuleRef::new(":lib", temp.path().join("lib"));

    PublishPlanner::new().apply(&module, &config(), &coordinator).unwrap();

    assert_eq!(
        coordinator.get(&CacheKey::publish_target(":lib")).as_deref(),
        Some("com.example:kit-lib:2.0.0")
    );
    assert_eq!(
        PublishPlanner::target(&coordinator, &module).unwrap().artifact,
        "kit-lib"
    );
}

#[test]
fn publishing_marker_and_done_flags() {
    let temp = TempDir::new().unwrap();
    let coordinator = Coordinator::for_root(ModuleRef::root("app", temp.path()));
    let module = ModuleRef::new(":lib", temp.path().join("lib"));

    assert_eq!(PublishPlanner::publishing(&coordinator), None);
    assert!(!PublishPlanner::is_done(&coordinator, &module));

    PublishPlanner::mark_publishing(&coordinator, &module);
    PublishPlanner::mark_done(&coordinator, &module);

    assert_eq!(PublishPlanner::publishing(&coordinator).as_deref(), Some(":lib"));
    assert!(PublishPlanner::is_done(&coordinator, &module));

    coordinator.finalize();
    assert_eq!(PublishPlanner::publishing(&coordinator), None);
    assert!(PublishPlanner::is_done(&coordinator, &module));
}
