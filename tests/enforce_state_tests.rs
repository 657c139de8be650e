mod support;

use rustle_pkg::exec::CommandError;
use rustle_pkg::reconcile::EnforcementError;
use rustle_pkg::{
    Backend, DesiredState, Outcome, PackageResource, PackageResourceSpec, PackageSource,
    ReconcileContext, ResourceError, ResourceState, SystemPackage,
};
use std::path::PathBuf;
use support::{argv, context, env, MockRunner};

async fn validated(spec: PackageResourceSpec, ctx: &ReconcileContext) -> PackageResource {
    let mut resource = PackageResource::new(spec);
    resource.validate(ctx).await.unwrap();
    resource
}

fn debian_env() -> Vec<(String, String)> {
    vec![("DEBIAN_FRONTEND".to_string(), "noninteractive".to_string())]
}

#[tokio::test]
async fn test_named_backend_commands() {
    let cases: Vec<(DesiredState, SystemPackage, Vec<&str>, Vec<(String, String)>)> = vec![
        (
            DesiredState::Installed,
            SystemPackage::apt("foo"),
            vec!["/usr/bin/apt-get", "install", "-y", "foo"],
            debian_env(),
        ),
        (
            DesiredState::Removed,
            SystemPackage::apt("foo"),
            vec!["/usr/bin/apt-get", "remove", "-y", "foo"],
            debian_env(),
        ),
        (
            DesiredState::Installed,
            SystemPackage::googet("foo"),
            vec!["googet.exe", "-noconfirm", "install", "foo"],
            vec![],
        ),
        (
            DesiredState::Removed,
            SystemPackage::googet("foo"),
            vec!["googet.exe", "-noconfirm", "remove", "foo"],
            vec![],
        ),
        (
            DesiredState::Installed,
            SystemPackage::yum("foo"),
            vec!["/usr/bin/yum", "install", "--assumeyes", "foo"],
            vec![],
        ),
        (
            DesiredState::Removed,
            SystemPackage::yum("foo"),
            vec!["/usr/bin/yum", "remove", "--assumeyes", "foo"],
            vec![],
        ),
        (
            DesiredState::Installed,
            SystemPackage::zypper("foo"),
            vec![
                "/usr/bin/zypper",
                "--gpg-auto-import-keys",
                "--non-interactive",
                "install",
                "--auto-agree-with-licenses",
                "foo",
            ],
            vec![],
        ),
        (
            DesiredState::Removed,
            SystemPackage::zypper("foo"),
            vec!["/usr/bin/zypper", "--non-interactive", "remove", "foo"],
            vec![],
        ),
    ];

    for (state, system_package, want_argv, want_env) in cases {
        let runner = MockRunner::new();
        let ctx = context(runner.clone());
        let mut resource = validated(PackageResourceSpec::new(state, system_package), &ctx).await;

        resource.enforce_state(&ctx).await.unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(argv(&calls[0]), want_argv);
        assert_eq!(env(&calls[0]), want_env);
    }
}

#[tokio::test]
async fn test_source_backend_commands() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("foo");
    std::fs::write(&path, b"").unwrap();
    let source = path.display().to_string();

    let cases: Vec<(SystemPackage, Vec<&str>, Vec<(String, String)>)> = vec![
        (
            SystemPackage::deb(PackageSource::LocalPath(path.clone())),
            vec!["/usr/bin/dpkg", "--install", source.as_str()],
            debian_env(),
        ),
        (
            SystemPackage::msi(PackageSource::LocalPath(path.clone())),
            vec!["msiexec.exe", "/i", source.as_str(), "/qn", "/norestart"],
            vec![],
        ),
        (
            SystemPackage::rpm(PackageSource::LocalPath(path.clone())),
            vec!["/usr/bin/rpm", "--upgrade", "--replacepkgs", "-v", source.as_str()],
            vec![],
        ),
    ];

    for (system_package, want_argv, want_env) in cases {
        let runner = MockRunner::new();
        let ctx = context(runner.clone());
        let mut resource = validated(
            PackageResourceSpec::new(DesiredState::Installed, system_package),
            &ctx,
        )
        .await;

        resource.enforce_state(&ctx).await.unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(argv(&calls[0]), want_argv);
        assert_eq!(env(&calls[0]), want_env);
    }
}

#[tokio::test]
async fn test_command_failure_propagates_unchanged() {
    let runner = MockRunner::new();
    runner.push_failure(100, "E: Unable to locate package foo");
    let ctx = context(runner.clone());
    let mut resource = validated(
        PackageResourceSpec::new(DesiredState::Installed, SystemPackage::apt("foo")),
        &ctx,
    )
    .await;

    let err = resource.enforce_state(&ctx).await.unwrap_err();

    match err {
        ResourceError::Enforcement(EnforcementError::CommandFailed {
            backend,
            target,
            source: CommandError::Failed { code, stderr, .. },
        }) => {
            assert_eq!(backend, Backend::Apt);
            assert_eq!(target, "foo");
            assert_eq!(code, Some(100));
            assert_eq!(stderr, "E: Unable to locate package foo");
        }
        other => panic!("Expected CommandFailed, got {other:?}"),
    }

    // Ran once, no retry and no follow-up check
    assert_eq!(runner.call_count(), 1);
    assert_eq!(resource.state(), ResourceState::Enforced);
}

#[tokio::test]
async fn test_enforce_runs_exactly_one_command() {
    let runner = MockRunner::new();
    let ctx = context(runner.clone());
    let mut resource = validated(
        PackageResourceSpec::new(DesiredState::Removed, SystemPackage::yum("foo")),
        &ctx,
    )
    .await;

    resource.enforce_state(&ctx).await.unwrap();

    assert_eq!(runner.call_count(), 1);
    assert_eq!(resource.state(), ResourceState::Enforced);
    assert!(!resource.in_desired_state());
}

#[tokio::test]
async fn test_reconcile_skips_enforcement_when_in_state() {
    let runner = MockRunner::new();
    let ctx = context(runner.clone());
    ctx.caches().get(Backend::Zypper).unwrap().seed(["foo"]);

    let mut resource = validated(
        PackageResourceSpec::new(DesiredState::Installed, SystemPackage::zypper("foo")),
        &ctx,
    )
    .await;

    assert_eq!(
        resource.reconcile(&ctx).await.unwrap(),
        Outcome::InDesiredState
    );
    assert_eq!(runner.call_count(), 0);
}

#[tokio::test]
async fn test_reconcile_enforces_drift() {
    let runner = MockRunner::new();
    let ctx = context(runner.clone());
    ctx.caches().get(Backend::GooGet).unwrap().seed(["foo"]);

    let mut resource = validated(
        PackageResourceSpec::new(DesiredState::Removed, SystemPackage::googet("foo")),
        &ctx,
    )
    .await;

    assert_eq!(resource.reconcile(&ctx).await.unwrap(), Outcome::Enforced);
    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(argv(&calls[0]), vec!["googet.exe", "-noconfirm", "remove", "foo"]);
}

#[tokio::test]
async fn test_source_target_is_resolved_path() {
    let dir = tempfile::tempdir().unwrap();
    let path: PathBuf = dir.path().join("agent.rpm");
    std::fs::write(&path, b"rpm").unwrap();

    let runner = MockRunner::new();
    let ctx = context(runner.clone());
    let mut resource = validated(
        PackageResourceSpec::new(
            DesiredState::Installed,
            SystemPackage::rpm(PackageSource::LocalPath(path.clone())),
        ),
        &ctx,
    )
    .await;

    assert_eq!(resource.reconcile(&ctx).await.unwrap(), Outcome::Enforced);
    let calls = runner.calls();
    assert_eq!(calls[0].args.last(), Some(&path.display().to_string()));
}
