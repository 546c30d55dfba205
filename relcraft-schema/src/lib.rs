#![deny(missing_docs)]

//! # relcraft-schema
//!
//! This crate exists to serialize and deserialize the reports relcraft prints when
//! run with `--output-format=json`. Ideally it should be reasonably forward and backward
//! compatible with different versions of this format.
//!
//! Every command produces one of the variants of [`Report`][].

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A local system path on the machine relcraft was run.
///
/// This is a String because when deserializing this may be a path format from a different OS!
pub type LocalPath = String;

/// Any report relcraft can print
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind")]
#[serde(rename_all = "kebab-case")]
pub enum Report {
    /// The resolved configuration (`relcraft config`)
    Config(ConfigReport),
    /// An external build step that ran (`relcraft configure/build/clean/reset/checkout`)
    Step(StepReport),
    /// The release identity (`relcraft release-name`, `relcraft release-folder`)
    Release(ReleaseReport),
    /// A local install (`relcraft install`)
    Install(InstallReport),
    /// A remote publish (`relcraft publish`)
    Publish(PublishReport),
}

/// The fully resolved configuration of a relcraft invocation
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ConfigReport {
    /// The host platform (Windows, MacOSX, Linux)
    pub platform: String,
    /// The root of all checkouts and builds
    pub root_dir: LocalPath,
    /// The git checkout of the product
    pub source_dir: LocalPath,
    /// The build directory
    pub build_dir: LocalPath,
    /// Where installer artifacts are searched for
    pub installer_dir: LocalPath,
    /// Where installs land
    pub install_root: LocalPath,
    /// Debug, Release, RelWithDebInfo or MinSizeRel
    pub build_type: String,
    /// Build type used for third-party libraries
    pub build_externals_type: String,
    /// Whether libraries are linked statically
    pub is_static: bool,
    /// Whether this is a 32 bit build
    pub is_32_bit: bool,
    /// Whether abbreviated folder tokens are used
    pub short_pathnames: bool,
    /// The CMake generator name
    pub generator: String,
    /// Name of the build folder
    pub build_folder: String,
    /// Number of parallel build jobs
    pub threads: u32,
    /// Git tag to check out, if any
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_tag: Option<String>,
    /// Branch to check out when no tag is given
    pub main_branch: String,
    /// Options passed to CMake
    pub cmake_options: BTreeMap<String, String>,
}

/// An external build step
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StepReport {
    /// What was done (e.g. "configure")
    pub step: String,
    /// The directory the step worked in
    pub dir: LocalPath,
    /// Rendered command lines that were executed, in order
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<String>,
}

/// The identity of a release, derived from git
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReleaseReport {
    /// The exact tag HEAD is at, if any
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,
    /// The nearest-tag descriptor, when not exactly at a tag
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub describe: Option<String>,
    /// Whether HEAD is not exactly at a tag
    pub is_dirty: bool,
    /// The name releases are filed under
    pub resolved_name: String,
    /// The release folder, when one was computed or created
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<LocalPath>,
}

/// A completed local install
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InstallReport {
    /// The installer artifact that was installed
    pub installer: LocalPath,
    /// How it was installed (archive, disk-image, silent-installer)
    pub procedure: String,
    /// Where it was installed to
    pub install_root: LocalPath,
}

/// A completed publish to a remote server
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PublishReport {
    /// The local folder whose contents were copied
    pub source: LocalPath,
    /// The remote server
    pub server: String,
    /// The remote folder the contents were copied into
    pub remote_path: String,
    /// Top-level entries that were copied
    pub entries: Vec<String>,
}

impl Report {
    /// Get the JSON Schema for a Report
    pub fn json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(Report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_names_every_report() {
        let schema = Report::json_schema();
        let json = serde_json::to_string_pretty(&schema).unwrap();
        for name in [
            "ConfigReport",
            "StepReport",
            "ReleaseReport",
            "InstallReport",
            "PublishReport",
        ] {
            assert!(json.contains(name), "schema is missing {name}");
        }
    }

    #[test]
    fn reports_are_tagged_by_kind() {
        let report = Report::Install(InstallReport {
            installer: "/tmp/Product_v1.tar.gz".to_owned(),
            procedure: "archive".to_owned(),
            install_root: "/home/me/dev/cx/Installed".to_owned(),
        });
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "install");
        assert_eq!(json["procedure"], "archive");
    }
}
