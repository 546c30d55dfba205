//! Tests for the cmake options and command line

use std::collections::BTreeMap;

use super::mock::*;
use crate::config::{BuildLayer, BuildType};
use crate::errors::RelcraftError;
use crate::platform::Platform;
use crate::resolve::parse_cmake_option;

fn keys(opts: &BTreeMap<String, String>) -> Vec<&str> {
    opts.keys().map(String::as_str).collect()
}

#[test]
fn linux_baseline() {
    let cfg = config_for(Platform::Linux);
    let opts = cfg.build.cmake_options();
    assert_eq!(
        keys(&opts),
        vec![
            "BUILD_SHARED_LIBS:BOOL",
            "CMAKE_BUILD_TYPE:STRING",
            "CMAKE_CXX_FLAGS:STRING",
            "CMAKE_ECLIPSE_GENERATE_LINKED_RESOURCES",
            "CMAKE_ECLIPSE_VERSION",
        ]
    );
    assert_eq!(opts["BUILD_SHARED_LIBS:BOOL"], "ON");
    assert_eq!(opts["CMAKE_BUILD_TYPE:STRING"], "Debug");
    assert_eq!(opts["CMAKE_CXX_FLAGS:STRING"], "-Wno-deprecated");
    assert_eq!(opts["CMAKE_ECLIPSE_VERSION"], "3.6");
}

#[test]
fn windows_keeps_deprecation_warnings() {
    let cfg = config_for(Platform::Windows);
    let opts = cfg.build.cmake_options();
    assert!(!opts.contains_key("CMAKE_CXX_FLAGS:STRING"));
    assert!(!opts.contains_key("CMAKE_OSX_ARCHITECTURES"));
}

#[test]
fn mac_32_bit_sets_architecture() {
    let cfg = config_with(
        Platform::MacOs,
        layer_with_build(BuildLayer {
            is_32_bit: Some(true),
            is_static: Some(true),
            ..build_layer()
        }),
    );
    let opts = cfg.build.cmake_options();
    assert_eq!(opts["CMAKE_OSX_ARCHITECTURES"], "i386");
    assert_eq!(opts["BUILD_SHARED_LIBS:BOOL"], "OFF");

    // only mac needs telling
    let linux = config_with(
        Platform::Linux,
        layer_with_build(BuildLayer {
            is_32_bit: Some(true),
            ..build_layer()
        }),
    );
    assert!(!linux.build.cmake_options().contains_key("CMAKE_OSX_ARCHITECTURES"));
}

#[test]
fn overrides_replace_by_name() {
    let cfg = config_for(Platform::Linux);
    let overrides = BTreeMap::from([
        ("CMAKE_BUILD_TYPE".to_owned(), "Release".to_owned()),
        ("BUILD_SHARED_LIBS:BOOL".to_owned(), "OFF".to_owned()),
        ("WITH_DOCS:BOOL".to_owned(), "ON".to_owned()),
    ]);
    let opts = cfg.build.resolve_cmake_options(&overrides);
    assert!(!opts.contains_key("CMAKE_BUILD_TYPE:STRING"));
    assert_eq!(opts["CMAKE_BUILD_TYPE"], "Release");
    assert_eq!(opts["BUILD_SHARED_LIBS:BOOL"], "OFF");
    assert_eq!(opts["WITH_DOCS:BOOL"], "ON");
    // untouched baseline entries survive
    assert_eq!(opts["CMAKE_ECLIPSE_VERSION"], "3.6");
    assert_eq!(opts.len(), 6);
}

#[test]
fn configured_overrides_apply() {
    let cfg = config_with(
        Platform::Linux,
        layer_with_build(BuildLayer {
            build_type: Some(BuildType::Release),
            cmake_options: Some(BTreeMap::from([(
                "CMAKE_ECLIPSE_VERSION".to_owned(),
                "4.3".to_owned(),
            )])),
            ..build_layer()
        }),
    );
    let opts = cfg.build.cmake_options();
    assert_eq!(opts["CMAKE_ECLIPSE_VERSION"], "4.3");
    assert_eq!(opts["CMAKE_BUILD_TYPE:STRING"], "Release");
}

#[test]
fn configure_command_line() {
    let cfg = config_for(Platform::Linux);
    let inv = cfg.configure_invocation(&[]).unwrap();
    insta::assert_snapshot!(inv.render(), @r#"cmake -G "Eclipse CDT4 - Unix Makefiles" -DBUILD_SHARED_LIBS:BOOL=ON -DCMAKE_BUILD_TYPE:STRING=Debug -DCMAKE_CXX_FLAGS:STRING=-Wno-deprecated -DCMAKE_ECLIPSE_GENERATE_LINKED_RESOURCES=OFF -DCMAKE_ECLIPSE_VERSION=3.6 /work/cx/Product/Product"#);
    assert_eq!(inv.cwd.as_deref(), Some(cfg.build_dir.as_path()));
}

#[test]
fn extra_args_come_before_defines() {
    let cfg = config_for(Platform::Windows);
    let inv = cfg
        .configure_invocation(&["--trace".to_owned()])
        .unwrap();
    assert_eq!(inv.args[0], "-G");
    assert_eq!(inv.args[1], "Eclipse CDT4 - Ninja");
    assert_eq!(inv.args[2], "--trace");
    assert!(inv.args[3].starts_with("-D"));
    assert_eq!(inv.args.last().unwrap(), "C:/Dev/cx/Product/Product");
}

#[test]
fn configure_creates_build_dir() {
    let (_guard, dir) = temp_dir();
    let cfg = config_in_dir(Platform::Linux, &dir);
    let mut runner = RecordingRunner::new();
    let report = crate::do_configure(&cfg, &mut runner, &[]).unwrap();
    assert!(cfg.build_dir.is_dir());
    assert_eq!(report.step, "configure");
    assert_eq!(runner.ran.len(), 1);
    assert_eq!(runner.ran[0].program, "cmake");
}

#[test]
fn cmake_option_parsing() {
    assert_eq!(
        parse_cmake_option("FOO:BOOL=ON").unwrap(),
        ("FOO:BOOL".to_owned(), "ON".to_owned())
    );
    assert_eq!(
        parse_cmake_option("FLAGS=-a=b").unwrap(),
        ("FLAGS".to_owned(), "-a=b".to_owned())
    );
    assert_eq!(
        parse_cmake_option("EMPTY=").unwrap(),
        ("EMPTY".to_owned(), String::new())
    );
    assert!(matches!(
        parse_cmake_option("NOPE"),
        Err(RelcraftError::MalformedCmakeOption { .. })
    ));
    assert!(parse_cmake_option("=value").is_err());
}

#[test]
fn externals_type() {
    let mut linux = config_for(Platform::Linux);
    assert_eq!(linux.build.build_externals_type(), BuildType::Release);
    linux.build.build_type = BuildType::MinSizeRel;
    assert_eq!(linux.build.build_externals_type(), BuildType::Release);

    let windows = config_for(Platform::Windows);
    assert_eq!(windows.build.build_externals_type(), BuildType::Debug);
}
