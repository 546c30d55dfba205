use std::process::{Command, Output, Stdio};

use relcraft_schema::Report;

static BIN: &str = env!("CARGO_BIN_EXE_relcraft");

fn format_outputs(output: &Output) -> String {
    let stdout = std::str::from_utf8(&output.stdout).unwrap();
    let stderr = std::str::from_utf8(&output.stderr).unwrap();
    format!("stdout:\n{stdout}\nstderr:\n{stderr}")
}

fn relcraft(root_dir: &temp_dir::TempDir, args: &[&str]) -> Output {
    Command::new(BIN)
        .arg("--root-dir")
        .arg(root_dir.path())
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .unwrap()
}

#[test]
fn test_version() {
    let output = Command::new(BIN)
        .arg("-V")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .unwrap();

    let stdout = String::from_utf8(output.stdout).unwrap();
    let stderr = String::from_utf8(output.stderr).unwrap();

    assert!(output.status.success(), "{}", stderr);
    assert_eq!(stderr, "");

    let (name, ver) = stdout.split_once(' ').unwrap();
    assert_eq!(name, "relcraft");
    let mut ver_parts = ver.trim().split('.');
    ver_parts.next().unwrap().parse::<u8>().unwrap();
    ver_parts.next().unwrap().parse::<u8>().unwrap();
    ver_parts.next().unwrap().parse::<u8>().unwrap();
    assert!(ver_parts.next().is_none());
}

#[test]
fn test_long_help() {
    let output = Command::new(BIN)
        .arg("--help")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", format_outputs(&output));
    let stdout = String::from_utf8(output.stdout).unwrap();
    for command in [
        "config",
        "checkout",
        "configure",
        "build",
        "clean",
        "reset",
        "release-name",
        "release-folder",
        "install",
        "remove-previous",
        "publish",
    ] {
        assert!(stdout.contains(command), "help is missing {command}");
    }
    assert!(!stdout.contains("schema"));
    // negations work but stay out of the way
    assert!(!stdout.contains("--no-"), "{stdout}");
}

#[test]
fn test_config_json() {
    let root = temp_dir::TempDir::new().unwrap();
    let output = relcraft(
        &root,
        &[
            "config",
            "--output-format=json",
            "--no-ninja",
            "--build-type=Release",
            "-j",
            "0",
            "-D",
            "WITH_DOCS:BOOL=ON",
        ],
    );
    assert!(output.status.success(), "{}", format_outputs(&output));

    let report: Report = serde_json::from_slice(&output.stdout).unwrap();
    let Report::Config(config) = report else {
        panic!("expected a config report:\n{}", format_outputs(&output));
    };
    assert_eq!(config.build_type, "Release");
    assert_eq!(config.threads, 1);
    assert_eq!(config.cmake_options["WITH_DOCS:BOOL"], "ON");
    assert_eq!(config.cmake_options["CMAKE_BUILD_TYPE:STRING"], "Release");
    assert!(config.build_folder.contains("Release"));
    assert!(config.root_dir.contains(root.path().file_name().unwrap().to_str().unwrap()));
}

#[test]
fn test_config_is_the_default_command() {
    let root = temp_dir::TempDir::new().unwrap();
    let output = relcraft(&root, &["--output-format=json", "--no-ninja"]);
    assert!(output.status.success(), "{}", format_outputs(&output));
    let report: Report = serde_json::from_slice(&output.stdout).unwrap();
    assert!(matches!(report, Report::Config(_)));
}

#[test]
fn test_config_file() {
    let root = temp_dir::TempDir::new().unwrap();
    std::fs::write(
        root.path().join("relcraft.toml"),
        "[build]\nproduct = \"Viewer\"\nstatic = true\nninja = false\n",
    )
    .unwrap();
    let output = relcraft(&root, &["config", "--output-format=json"]);
    assert!(output.status.success(), "{}", format_outputs(&output));

    let Report::Config(config) = serde_json::from_slice::<Report>(&output.stdout).unwrap() else {
        panic!("expected a config report:\n{}", format_outputs(&output));
    };
    assert!(config.is_static);
    assert!(config.source_dir.contains("Viewer"));
    assert_eq!(config.cmake_options["BUILD_SHARED_LIBS:BOOL"], "OFF");
}

#[test]
fn test_print_config_skips_the_command() {
    let root = temp_dir::TempDir::new().unwrap();
    let output = relcraft(&root, &["reset", "--print-config", "--no-ninja"]);
    assert!(output.status.success(), "{}", format_outputs(&output));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("relcraft configuration"));
    assert!(stdout.contains("build folder:"));
}

#[cfg(not(windows))]
#[test]
fn test_jom_needs_windows() {
    let root = temp_dir::TempDir::new().unwrap();
    let output = relcraft(&root, &["configure", "--jom"]);
    assert!(!output.status.success(), "{}", format_outputs(&output));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("jom"), "{stderr}");
    // never got as far as making the build dir
    assert!(!root.path().join("Product").exists());
}

#[test]
fn test_bad_cmake_option() {
    let root = temp_dir::TempDir::new().unwrap();
    let output = relcraft(&root, &["config", "-D", "NOT_AN_OPTION"]);
    assert!(!output.status.success(), "{}", format_outputs(&output));
}

#[test]
fn test_publish_needs_a_target() {
    let root = temp_dir::TempDir::new().unwrap();
    let output = relcraft(&root, &["publish", "--no-ninja", "--server", "releases.example.com"]);
    assert!(!output.status.success(), "{}", format_outputs(&output));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("no publish target"), "{stderr}");
}

#[test]
fn test_schema() {
    let output = Command::new(BIN)
        .arg("schema")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", format_outputs(&output));
    let schema: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(schema["title"], "Report");
}
