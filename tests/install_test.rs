//! Integration tests for the manifest install invoker

#![cfg(unix)]

mod common;

use common::{write_script, TestProject};
use vcpkg_provision::core::env::ToolchainEnv;
use vcpkg_provision::core::install::{install_manifest, InstallRequest, VCPKG_EXECUTABLE};

/// vcpkg stand-in recording one argument per line
const ARG_RECORDER: &str = "#!/bin/sh\nfor arg in \"$@\"; do echo \"$arg\"; done > \"$VCPKG_ROOT/args\"\n";

#[test]
fn test_arguments_reach_vcpkg_in_order() {
    let project = TestProject::new();
    let root = project.path().join("vcpkg");
    write_script(&root.join(VCPKG_EXECUTABLE), ARG_RECORDER);
    project.create_file("src/vcpkg.json", "{}");

    let request = InstallRequest::new(project.path().join("src"), &root)
        .triplet("x64-linux")
        .install_dir(project.path().join("installed"))
        .option("overlay-triplets", "/triplets")
        .option("x-buildtrees-root", "/tmp/bt");
    install_manifest(&request, &ToolchainEnv::default()).unwrap();

    let args = project.read_file("vcpkg/args");
    let expected = [
        "install".to_string(),
        "--triplet".to_string(),
        "x64-linux".to_string(),
        "--x-install-root".to_string(),
        project.path().join("installed").display().to_string(),
        "--vcpkg-root".to_string(),
        root.display().to_string(),
        "--overlay-triplets".to_string(),
        "/triplets".to_string(),
        "--x-buildtrees-root".to_string(),
        "/tmp/bt".to_string(),
    ];
    assert_eq!(args.lines().collect::<Vec<_>>(), expected);
}

#[test]
fn test_missing_install_dir_and_triplet_are_omitted() {
    let project = TestProject::new();
    let root = project.path().join("vcpkg");
    write_script(&root.join(VCPKG_EXECUTABLE), ARG_RECORDER);

    let request = InstallRequest::new(project.path(), &root);
    install_manifest(&request, &ToolchainEnv::default()).unwrap();

    let args = project.read_file("vcpkg/args");
    assert!(!args.contains("--triplet"));
    assert!(!args.contains("--x-install-root"));
    assert!(args.contains("--vcpkg-root"));
}

#[test]
fn test_default_triplet_from_environment_is_forwarded() {
    let project = TestProject::new();
    let root = project.path().join("vcpkg");
    write_script(
        &root.join(VCPKG_EXECUTABLE),
        "#!/bin/sh\necho \"$VCPKG_DEFAULT_TRIPLET\" > \"$VCPKG_ROOT/triplet\"\n",
    );

    let mut env = ToolchainEnv::default();
    env.set_default_triplet("x64-windows-static-md");
    install_manifest(&InstallRequest::new(project.path(), &root), &env).unwrap();

    assert_eq!(project.read_file("vcpkg/triplet").trim(), "x64-windows-static-md");
}
