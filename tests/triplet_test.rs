//! Integration tests for triplet resolution

use proptest::prelude::*;
use vcpkg_provision::core::triplet::{default_triplet, resolve, Arch, Os, Triplet};
use vcpkg_provision::error::TripletError;

#[test]
fn test_python_style_platforms() {
    let cases = [
        ("win-amd64", "x64-windows"),
        ("win32", "x86-windows"),
        ("win-arm64", "arm64-windows"),
        ("linux-x86_64", "x64-linux"),
        ("linux-aarch64", "arm64-linux"),
        ("macosx-11.0-arm64", "arm64-osx"),
        ("macosx-10.9-x86_64", "x64-osx"),
        ("macosx-10.9-universal2", "universal2-osx"),
    ];

    for (platform, expected) in cases {
        assert_eq!(resolve(platform).unwrap().to_string(), expected, "{platform}");
    }
}

#[test]
fn test_resolution_is_case_insensitive() {
    assert_eq!(resolve("Linux-X86_64").unwrap(), resolve("linux-x86_64").unwrap());
}

#[test]
fn test_darwin_is_never_windows() {
    assert_eq!(resolve("darwin-arm64").unwrap().os, Os::Osx);
}

#[test]
fn test_unknown_inputs_are_errors() {
    assert!(matches!(
        resolve("linux-sparc"),
        Err(TripletError::UnknownArchitecture { .. })
    ));
    assert!(matches!(
        resolve("plan9-x86_64"),
        Err(TripletError::UnknownOs { .. })
    ));
}

#[test]
fn test_variants_only_touch_windows() {
    let windows = resolve("win-amd64").unwrap();
    assert_eq!(windows.to_static_variant().to_string(), "x64-windows-static");
    assert_eq!(
        windows.to_static_dynamic_variant().to_string(),
        "x64-windows-static-md"
    );

    let linux = resolve("linux-x86_64").unwrap();
    assert_eq!(linux.to_static_variant(), linux);
    assert_eq!(linux.to_static_dynamic_variant(), linux);
}

#[test]
fn test_default_triplet() {
    assert_eq!(
        default_triplet("win-amd64").unwrap().to_string(),
        "x64-windows-static-md"
    );
    assert_eq!(default_triplet("macosx-11.0-arm64").unwrap().to_string(), "arm64-osx");
}

#[test]
fn test_canonical_parse() {
    let triplet: Triplet = "x64-windows-static-md".parse().unwrap();
    assert_eq!(triplet.arch, Arch::X64);
    assert_eq!(triplet.os, Os::Windows);
    assert!("x64".parse::<Triplet>().is_err());
    assert!("x64-windows-dynamic".parse::<Triplet>().is_err());
}

proptest! {
    #[test]
    fn test_resolve_is_deterministic(platform in "[a-z0-9_.-]{0,24}") {
        prop_assert_eq!(resolve(&platform), resolve(&platform));
    }

    #[test]
    fn test_variants_are_idempotent(platform in prop_oneof![
        Just("win-amd64"), Just("win32"), Just("linux-aarch64"), Just("macosx-arm64")
    ]) {
        let triplet = resolve(platform).unwrap();
        prop_assert_eq!(
            triplet.to_static_variant().to_static_variant(),
            triplet.to_static_variant()
        );
        prop_assert_eq!(
            triplet.to_string().parse::<Triplet>().unwrap(),
            triplet
        );
    }
}
