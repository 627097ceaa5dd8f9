use std::fs;
use std::path::Path;
use tempfile::TempDir;

use keeper_core::activator::ModuleActivator;
use keeper_core::convert::ShorthandConverter;
use keeper_core::coordinator::FinalizeOutcome;
use keeper_core::publish::PublishPlanner;
use keeper_core::session::BuildSession;
use keeper_core::types::ModuleRef;

const KEEPER_TOML: &str = r#"
[dependency]
default_group = "com.example"
exclusions = ["com.legacy:*"]

[dependency.version_overrides]
network = "3.1.0"
"com.example:imageloader" = "1.4.0"

[publish]
group = "com.example"
artifact_prefix = "kit-"
version = "5.0.0"
opt_out = [":app"]
"#;

const LOCAL_PROPERTIES: &str = "\
# per-checkout choices
dependency.network=snapshot
dependency.imageloader=release
sdk.dir=/opt/android
";

fn write_project(dir: &Path) {
    fs::write(dir.join("keeper.toml"), KEEPER_TOML).unwrap();
    fs::write(dir.join("local.properties"), LOCAL_PROPERTIES).unwrap();
}

fn converter() -> ShorthandConverter {
    ShorthandConverter::new()
        .declare(":app", ["network", "imageloader", "com.legacy:old:1.0"])
        .declare(":libs:ui", ["imageloader"])
}

fn session(dir: &Path) -> BuildSession {
    BuildSession::open(ModuleRef::root("demo", dir), converter()).unwrap()
}

#[test]
fn root_config_drives_activation() {
    let temp = TempDir::new().unwrap();
    write_project(temp.path());
    let session = session(temp.path());

    let app = ModuleRef::new(":app", temp.path().join("app"));
    let ui = ModuleRef::new(":libs:ui", temp.path().join("libs/ui"));
    let reports = session.activate_all([&app, &ui]).unwrap();

    let app_deps: Vec<String> = reports[0].dependencies.iter().map(ToString::to_string).collect();
    assert_eq!(
        app_deps,
        vec![
            "com.example:network:3.1.0-SNAPSHOT",
            "com.example:imageloader:1.4.0",
        ]
    );
    assert!(reports[0].publish.is_none());

    let ui_plan = reports[1].publish.as_ref().unwrap();
    assert_eq!(ui_plan.coordinate.to_string(), "com.example:kit-ui:5.0.0");
}

#[test]
fn missing_config_files_use_defaults() {
    let temp = TempDir::new().unwrap();
    let session = session(temp.path());

    let config = session.coordinator().dependency_config().unwrap();
    assert_eq!(config.dependency_key, "dependency");
    assert!(config.default_group.is_none());
    assert!(session.cache_path().starts_with(temp.path().join("build")));
}

#[test]
fn malformed_config_fails_session_start() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("keeper.toml"), "[publish\nversion = 1").unwrap();

    let err = BuildSession::from_root_config(
        ModuleRef::root("demo", temp.path()),
        ModuleActivator::new(ShorthandConverter::new(), PublishPlanner::new()),
    )
    .unwrap_err();
    assert!(format!("{:#}", err).contains("keeper.toml"));
}

#[test]
fn cache_path_override_is_relative_to_root() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("keeper.toml"),
        "[dependency]\ncache_path = \".keeper\"\n",
    )
    .unwrap();

    let session = BuildSession::from_root_config(
        ModuleRef::root("demo", temp.path()),
        ModuleActivator::new(ShorthandConverter::new(), PublishPlanner::new()),
    )
    .unwrap();
    assert!(session.cache_path().starts_with(temp.path().join(".keeper")));
}

#[test]
fn state_carries_over_to_the_next_build() {
    let temp = TempDir::new().unwrap();
    write_project(temp.path());
    let ui = ModuleRef::new(":libs:ui", temp.path().join("libs/ui"));

    let first = session(temp.path());
    first.activate(&ui).unwrap();
    PublishPlanner::mark_publishing(first.coordinator(), &ui);
    PublishPlanner::mark_done(first.coordinator(), &ui);
    let cache_path = first.cache_path().to_path_buf();
    assert_eq!(first.finish(), FinalizeOutcome::Flushed);
    assert!(cache_path.exists());

    let second = session(temp.path());
    let coordinator = second.coordinator();
    assert_eq!(PublishPlanner::publishing(coordinator), None);
    assert!(PublishPlanner::is_done(coordinator, &ui));
    assert_eq!(
        PublishPlanner::target(coordinator, &ui).unwrap().to_string(),
        "com.example:kit-ui:5.0.0"
    );
    assert_eq!(second.finish(), FinalizeOutcome::Idle);
}

#[test]
fn build_without_publishing_writes_nothing() {
    let temp = TempDir::new().unwrap();
    write_project(temp.path());

    let session = session(temp.path());
    session
        .activate(&ModuleRef::new(":app", temp.path().join("app")))
        .unwrap();
    let cache_path = session.cache_path().to_path_buf();

    assert_eq!(session.finish(), FinalizeOutcome::Idle);
    assert!(!cache_path.exists());
}

#[test]
fn source_declaration_becomes_local_substitution() {
    let temp = TempDir::new().unwrap();
    write_project(temp.path());
    fs::write(
        temp.path().join("local.properties"),
        "dependency.network=source\n",
    )
    .unwrap();

    let session = session(temp.path());
    let report = session
        .activate(&ModuleRef::new(":app", temp.path().join("app")))
        .unwrap();

    assert_eq!(report.dependencies[0].local_path(), Some(":network"));
    assert_eq!(
        report.dependencies[1].to_string(),
        "com.example:imageloader:1.4.0"
    );
}

#[test]
fn unknown_declared_type_fails_session_start() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("local.properties"), "dependency.network=nightly\n").unwrap();

    let err = BuildSession::open(ModuleRef::root("demo", temp.path()), converter()).unwrap_err();
    assert!(format!("{:#}", err).contains("local.properties"));
}

#[test]
fn host_supplied_activator_skips_declarations() {
    let temp = TempDir::new().unwrap();
    write_project(temp.path());

    let session = BuildSession::from_root_config(
        ModuleRef::root("demo", temp.path()),
        ModuleActivator::new(converter(), PublishPlanner::new()),
    )
    .unwrap();
    let report = session
        .activate(&ModuleRef::new(":app", temp.path().join("app")))
        .unwrap();
    assert_eq!(report.dependencies[0].to_string(), "com.example:network:3.1.0");
}
