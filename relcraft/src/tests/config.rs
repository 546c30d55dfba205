//! Tests for layering config

use axoasset::SourceFile;
use camino::Utf8PathBuf;

use super::mock::*;
use crate::config::{
    self, loader, normalize_git_tag, BuildLayer, BuildType, Config, ConfigLayer, GeneratorChoice,
    InstallLayer, PublishLayer,
};
use crate::errors::RelcraftError;
use crate::platform::Platform;

const TOML: &str = r#"
[build]
product = "Viewer"
build-type = "Release"
static = true
b32 = true
threads = 4
git-tag = "v15-04"

[build.cmake-options]
"WITH_DOCS:BOOL" = "ON"

[install]
package-name = "Viewer Installer.mpkg"

[publish]
server = "releases.example.com"
path = "/srv/releases"
"#;

fn parse(contents: &str) -> ConfigLayer {
    loader::parse(SourceFile::new("relcraft.toml", contents.to_owned())).unwrap()
}

#[test]
fn defaults() {
    let cfg = config_for(Platform::Linux);
    assert_eq!(cfg.product_name, "Product");
    assert_eq!(cfg.main_branch, "master");
    assert_eq!(cfg.git_tag, None);
    assert_eq!(cfg.source_dir, "/work/cx/Product/Product");
    assert_eq!(cfg.build_dir, "/work/cx/Product/build_Debug");
    assert_eq!(cfg.installer_dir, "/work/cx/Product/build_Debug");
    assert_eq!(cfg.build.build_type, BuildType::Debug);
    assert_eq!(cfg.build.generator, GeneratorChoice::Make);
    assert_eq!(cfg.build.threads, 1);
    assert!(cfg.publish.is_none());
}

#[test]
fn toml_file_layer() {
    let cfg = config_with(Platform::Linux, parse(TOML));
    assert_eq!(cfg.product_name, "Viewer");
    assert_eq!(cfg.build.build_type, BuildType::Release);
    assert!(cfg.build.is_static);
    assert!(cfg.build.is_32_bit);
    assert_eq!(cfg.build.threads, 4);
    assert_eq!(cfg.git_tag.as_deref(), Some("v15-04"));
    assert_eq!(cfg.build_dir, "/work/cx/Viewer/build_Release_static32");
    assert_eq!(cfg.installer_dir, "/work/cx/Viewer/build_Release_static32");
    assert_eq!(cfg.package_name.as_deref(), Some("Viewer Installer.mpkg"));
    assert_eq!(cfg.build.cmake_options()["WITH_DOCS:BOOL"], "ON");

    let publish = cfg.publish.unwrap();
    assert_eq!(publish.server, "releases.example.com");
    assert_eq!(publish.login(), "releases.example.com");
}

#[test]
fn later_layers_win() {
    let cli = layer_with_build(BuildLayer {
        build_type: Some(BuildType::RelWithDebInfo),
        is_static: Some(false),
        cmake_options: Some([("EXTRA".to_owned(), "1".to_owned())].into()),
        ..build_layer()
    });
    let cfg = Config::resolve(
        Platform::Linux,
        root_dir(Platform::Linux),
        [parse(TOML), cli],
        || false,
    )
    .unwrap();
    assert_eq!(cfg.build.build_type, BuildType::RelWithDebInfo);
    assert!(!cfg.build.is_static);
    // untouched by the cli
    assert!(cfg.build.is_32_bit);
    assert_eq!(cfg.product_name, "Viewer");
    // cmake options merge per key
    let opts = cfg.build.cmake_options();
    assert_eq!(opts["WITH_DOCS:BOOL"], "ON");
    assert_eq!(opts["EXTRA"], "1");
}

#[test]
fn publish_needs_server_and_path() {
    let layer = ConfigLayer {
        publish: Some(PublishLayer {
            server: Some("releases.example.com".to_owned()),
            path: None,
            user: Some("builder".to_owned()),
        }),
        ..ConfigLayer::default()
    };
    let cfg = config_with(Platform::Linux, layer);
    assert!(cfg.publish.is_none());

    let (_guard, dir) = temp_dir();
    let cfg = config_with_publish(Platform::Linux, &dir);
    let publish = cfg.publish.unwrap();
    assert_eq!(publish.login(), "builder@releases.example.com");
}

#[test]
fn empty_git_tags_mean_none() {
    assert_eq!(normalize_git_tag(None), None);
    assert_eq!(normalize_git_tag(Some(String::new())), None);
    assert_eq!(normalize_git_tag(Some("\"\"".to_owned())), None);
    assert_eq!(normalize_git_tag(Some("  ".to_owned())), None);
    assert_eq!(
        normalize_git_tag(Some("v15-04".to_owned())),
        Some("v15-04".to_owned())
    );

    let cfg = config_with(
        Platform::Linux,
        layer_with_build(BuildLayer {
            git_tag: Some("\"\"".to_owned()),
            ..build_layer()
        }),
    );
    assert_eq!(cfg.git_tag, None);
}

#[test]
fn threads_are_at_least_one() {
    let cfg = config_with(
        Platform::Linux,
        layer_with_build(BuildLayer {
            threads: Some(0),
            ..build_layer()
        }),
    );
    assert_eq!(cfg.build.threads, 1);
}

#[test]
fn bad_eclipse_version() {
    let res = Config::resolve(
        Platform::Linux,
        root_dir(Platform::Linux),
        [layer_with_build(BuildLayer {
            eclipse_version: Some("2.0".to_owned()),
            ..build_layer()
        })],
        || false,
    );
    let err = res.unwrap_err();
    assert!(matches!(err, RelcraftError::InvalidEclipseVersion { .. }));
    assert!(err.is_configuration_error());
}

#[test]
fn bad_build_type() {
    let err = "Fast".parse::<BuildType>().unwrap_err();
    assert!(matches!(err, RelcraftError::InvalidBuildType { .. }));
    for ty in BuildType::ALL {
        assert_eq!(ty.as_str().parse::<BuildType>().unwrap(), ty);
    }
}

#[test]
fn bad_toml_build_type() {
    let src = SourceFile::new("relcraft.toml", "[build]\nbuild-type = \"Fast\"\n".to_owned());
    assert!(loader::parse(src).is_err());
}

#[test]
fn explicit_dirs_win() {
    let cfg = config_with(
        Platform::Linux,
        layer_with_build(BuildLayer {
            source_dir: Some(Utf8PathBuf::from("/src/product")),
            build_dir: Some(Utf8PathBuf::from("/tmp/out")),
            ..build_layer()
        }),
    );
    assert_eq!(cfg.source_dir, "/src/product");
    assert_eq!(cfg.build_dir, "/tmp/out");
    // installers come out of the build
    assert_eq!(cfg.installer_dir, "/tmp/out");
}

#[test]
fn windows_installers_are_in_the_short_build_folder() {
    let cfg = config_for(Platform::Windows);
    assert_eq!(cfg.build_dir, "C:/Dev/cx/Product/b_Debug");
    assert_eq!(cfg.installer_dir, cfg.build_dir);
}

#[test]
fn relative_dirs_in_config_file_are_under_root_dir() {
    let (_guard, dir) = temp_dir();
    touch(
        &dir.join(config::CONFIG_FILE_NAME),
        "[build]\nsource-dir = \"src\"\nninja = false\n\n[install]\ninstaller-dir = \"installers\"\n",
    );
    let cfg =
        config::load(Platform::Linux, Some(dir.as_path()), None, ConfigLayer::default()).unwrap();
    assert_eq!(cfg.source_dir, dir.join("src"));
    assert_eq!(cfg.installer_dir, dir.join("installers"));

    // and so is everything run against them
    let configure = cfg.configure_invocation(&[]).unwrap();
    assert_eq!(configure.args.last().unwrap(), dir.join("src").as_str());
    touch(&dir.join("installers").join("Product-1.tar.gz"), "");
    let installer = crate::installer::find_installer_file(&cfg).unwrap();
    let steps = crate::installer::archive::plan(&cfg, &installer);
    let crate::installer::InstallStep::Run(tar) = &steps[1] else {
        panic!("expected tar, got {:?}", steps[1]);
    };
    assert_eq!(tar.args[1], dir.join("installers").join("Product-1.tar.gz").as_str());
}

#[test]
fn relative_dirs_on_the_cli_are_under_the_current_dir() {
    let (_guard, dir) = temp_dir();
    let cwd = Utf8PathBuf::from_path_buf(std::env::current_dir().unwrap()).unwrap();
    let cli = ConfigLayer {
        build: Some(BuildLayer {
            ninja: Some(false),
            ..build_layer()
        }),
        install: Some(InstallLayer {
            installer_dir: Some(Utf8PathBuf::from("installers")),
            package_name: None,
        }),
        publish: None,
    };
    let cfg = config::load(Platform::Linux, Some(dir.as_path()), None, cli).unwrap();
    assert!(cfg.installer_dir.is_absolute());
    assert_eq!(cfg.installer_dir, cwd.join("installers"));
}

#[test]
fn config_file_in_root_dir_is_picked_up() {
    let (_guard, dir) = temp_dir();
    touch(&dir.join(config::CONFIG_FILE_NAME), TOML);
    let cfg =
        config::load(Platform::Linux, Some(dir.as_path()), None, ConfigLayer::default()).unwrap();
    assert_eq!(cfg.product_name, "Viewer");
    assert_eq!(cfg.root_dir, dir);
}

#[test]
fn missing_config_file_is_fine_unless_named() {
    let (_guard, dir) = temp_dir();
    let cli = layer_with_build(BuildLayer {
        ninja: Some(false),
        ..build_layer()
    });
    let cfg = config::load(Platform::Linux, Some(dir.as_path()), None, cli).unwrap();
    assert_eq!(cfg.product_name, "Product");

    let missing = dir.join("nope.toml");
    let res = config::load(
        Platform::Linux,
        Some(dir.as_path()),
        Some(missing.as_path()),
        ConfigLayer::default(),
    );
    assert!(res.is_err());
}

#[test]
fn windows_root_dir() {
    assert_eq!(
        config::default_root_dir(Platform::Windows).unwrap(),
        "C:/Dev/cx"
    );
}
