//! End-to-end tests for universal installs

#![cfg(unix)]

mod common;

use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

use common::{write_script, FAKE_LIPO, FAKE_VCPKG};
use vcpkg_provision::core::env::ToolchainEnv;
use vcpkg_provision::core::install::VCPKG_EXECUTABLE;
use vcpkg_provision::core::merge::MergeTool;
use vcpkg_provision::core::triplet::{Arch, Os, Triplet};
use vcpkg_provision::core::universal::{merge_installed_triplets, UniversalInstall};

fn fake_tools(temp: &TempDir) -> (std::path::PathBuf, MergeTool) {
    let root = temp.path().join("vcpkg");
    write_script(&root.join(VCPKG_EXECUTABLE), FAKE_VCPKG);
    let lipo = temp.path().join("bin/lipo");
    write_script(&lipo, FAKE_LIPO);
    (root, MergeTool::new(lipo))
}

#[test]
fn test_merge_installed_triplets_under_shared_root() {
    let temp = TempDir::new().unwrap();
    let installed = temp.child("installed");
    for (triplet, lib) in [("arm64-osx", "ARM"), ("x64-osx", "X64")] {
        installed
            .child(format!("{triplet}/include/zlib.h"))
            .write_str(triplet)
            .unwrap();
        installed
            .child(format!("{triplet}/lib/libz.a"))
            .write_str(lib)
            .unwrap();
    }
    let (_, tool) = fake_tools(&temp);

    let universal = merge_installed_triplets(
        installed.path(),
        Triplet::new(Arch::Arm64, Os::Osx),
        Triplet::new(Arch::X64, Os::Osx),
        &tool,
    )
    .unwrap();

    assert_eq!(universal, "universal2-osx");
    let universal_dirs: Vec<_> = std::fs::read_dir(installed.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("universal2"))
        .collect();
    assert_eq!(universal_dirs, ["universal2-osx"]);
    installed.child("universal2-osx/lib/libz.a").assert("ARMX64");
    installed.child("universal2-osx/include/zlib.h").assert("arm64-osx");
}

#[test]
fn test_universal_install_on_arm64_host() {
    let temp = TempDir::new().unwrap();
    let (root, tool) = fake_tools(&temp);
    let source = temp.child("project");
    source.child("vcpkg.json").write_str("{}").unwrap();
    let install_dir = temp.child("build/installed");
    install_dir.child("old-file").write_str("stale").unwrap();

    let universal = UniversalInstall::new(source.path(), &root, install_dir.path(), Os::Osx)
        .host_arch(Arch::Arm64)
        .merge_tool(tool)
        .run(&ToolchainEnv::default())
        .unwrap();

    assert_eq!(universal, "universal2-osx");
    install_dir.child("old-file").assert(predicate::path::missing());
    install_dir.child("arm64-osx").assert(predicate::path::is_dir());
    install_dir.child("x64-osx").assert(predicate::path::is_dir());
    install_dir.child("universal2-osx/lib/libz.a").assert("arm64-osxx64-osx");
    install_dir
        .child("universal2-osx/include/zlib.h")
        .assert(predicate::str::contains("arm64-osx"));

    // Host triplet installs first, each into its own staging root
    temp.child("build/vcpkg-calls.log").assert("arm64-osx\nx64-osx\n");
    temp.child("build/.installed-host-staging")
        .assert(predicate::path::missing());
    temp.child("build/.installed-cross-staging")
        .assert(predicate::path::missing());
}

#[test]
fn test_universal_install_on_x64_host_uses_x64_as_primary() {
    let temp = TempDir::new().unwrap();
    let (root, tool) = fake_tools(&temp);
    let install_dir = temp.child("build/installed");

    let universal = UniversalInstall::new(temp.path(), &root, install_dir.path(), Os::Osx)
        .host_arch(Arch::X64)
        .merge_tool(tool)
        .run(&ToolchainEnv::default())
        .unwrap();

    assert_eq!(universal, "universal2-osx");
    install_dir.child("universal2-osx/lib/libz.a").assert("x64-osxarm64-osx");
    temp.child("build/vcpkg-calls.log").assert("x64-osx\narm64-osx\n");
}
