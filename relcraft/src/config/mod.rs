//! Config support
//!
//! Configuration is resolved in layers, later layers winning:
//!
//! 1. defaults from the [`PlatformCaps`][crate::platform::PlatformCaps] table
//! 2. the `[build]`, `[install]` and `[publish]` tables of a `relcraft.toml`
//! 3. command line flags
//!
//! The result is a [`Config`][] that nothing mutates afterwards.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{RelResult, RelcraftError};
use crate::platform::Platform;

pub mod layer;
pub mod loader;

pub use layer::{ApplyEntriesExt, ApplyLayer, ApplyOptExt, ApplyValExt};

/// Name of the optional config file in the root dir
pub const CONFIG_FILE_NAME: &str = "relcraft.toml";
/// Product name used when none is configured
pub const DEFAULT_PRODUCT: &str = "Product";
/// Branch checked out when no tag is given
pub const DEFAULT_MAIN_BRANCH: &str = "master";
/// Eclipse versions cmake's eclipse generators understand
pub const ECLIPSE_VERSIONS: &[&str] = &["3.2", "3.3", "3.4", "3.5", "3.6", "3.7", "4.2", "4.3"];
/// Eclipse version used when none is configured
pub const DEFAULT_ECLIPSE_VERSION: &str = "3.6";

/// A CMake build type
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildType {
    /// Debug
    Debug,
    /// Release
    Release,
    /// RelWithDebInfo
    RelWithDebInfo,
    /// MinSizeRel
    MinSizeRel,
}

impl BuildType {
    /// Every build type, in the order cmake documents them
    pub const ALL: [BuildType; 4] = [
        BuildType::Debug,
        BuildType::Release,
        BuildType::RelWithDebInfo,
        BuildType::MinSizeRel,
    ];

    /// The name cmake uses
    pub fn as_str(self) -> &'static str {
        match self {
            BuildType::Debug => "Debug",
            BuildType::Release => "Release",
            BuildType::RelWithDebInfo => "RelWithDebInfo",
            BuildType::MinSizeRel => "MinSizeRel",
        }
    }
}

impl FromStr for BuildType {
    type Err = RelcraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| RelcraftError::InvalidBuildType {
                value: s.to_owned(),
                allowed: Self::ALL.iter().map(|ty| ty.as_str()).join(", "),
            })
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which family of build files cmake should generate
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GeneratorChoice {
    /// The platform's default makefile flavour
    Make,
    /// Ninja
    Ninja,
    /// NMake makefiles driven by jom
    Jom,
    /// An Xcode project
    Xcode,
}

impl GeneratorChoice {
    /// Collapse the individual generator toggles into one choice.
    ///
    /// xcode beats jom beats ninja beats the default. `ninja` is only
    /// consulted when neither xcode nor jom was asked for.
    pub fn from_toggles(xcode: bool, jom: bool, ninja: impl FnOnce() -> bool) -> Self {
        if xcode {
            GeneratorChoice::Xcode
        } else if jom {
            GeneratorChoice::Jom
        } else if ninja() {
            GeneratorChoice::Ninja
        } else {
            GeneratorChoice::Make
        }
    }

    /// Short name, as used on the command line
    pub fn name(self) -> &'static str {
        match self {
            GeneratorChoice::Make => "make",
            GeneratorChoice::Ninja => "ninja",
            GeneratorChoice::Jom => "jom",
            GeneratorChoice::Xcode => "xcode",
        }
    }

    /// Fail if this generator makes no sense on the given platform
    pub fn check_supported(self, platform: Platform) -> RelResult<()> {
        let caps = platform.caps();
        if caps.supported_generators.contains(&self) {
            Ok(())
        } else {
            Err(RelcraftError::UnsupportedGenerator {
                generator: self.name().to_owned(),
                platform: caps.display_name.to_owned(),
                supported: caps.supported_generators.iter().map(|g| g.name()).join(", "),
            })
        }
    }
}

/// Where releases get published
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    /// host name
    pub server: String,
    /// base folder on the host
    pub path: String,
    /// user to log in as, if not the current one
    pub user: Option<String>,
}

impl RemoteTarget {
    /// `user@server`, or just `server`
    pub fn login(&self) -> String {
        match &self.user {
            Some(user) => format!("{user}@{}", self.server),
            None => self.server.clone(),
        }
    }
}

/// Everything that determines what a build looks like
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// The host platform
    pub platform: Platform,
    /// Build for 32 bit
    pub is_32_bit: bool,
    /// cmake build type
    pub build_type: BuildType,
    /// Link libraries statically
    pub is_static: bool,
    /// What cmake generates
    pub generator: GeneratorChoice,
    /// Use abbreviated tokens in folder names
    pub short_pathnames: bool,
    /// Extra/overriding cmake options, by key
    pub cmake_overrides: BTreeMap<String, String>,
    /// Value of CMAKE_ECLIPSE_VERSION
    pub eclipse_version: String,
    /// Parallel build jobs
    pub threads: u32,
}

impl BuildConfig {
    /// Defaults for a platform, before any config is applied
    pub fn new(platform: Platform) -> Self {
        let caps = platform.caps();
        Self {
            platform,
            is_32_bit: false,
            build_type: BuildType::Debug,
            is_static: false,
            generator: if caps.assume_ninja {
                GeneratorChoice::Ninja
            } else {
                GeneratorChoice::Make
            },
            short_pathnames: caps.short_pathnames_by_default,
            cmake_overrides: BTreeMap::new(),
            eclipse_version: DEFAULT_ECLIPSE_VERSION.to_owned(),
            threads: 1,
        }
    }
}

/// The fully resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of all checkouts and builds
    pub root_dir: Utf8PathBuf,
    /// Name of the product (installer prefix, install folder, release folder)
    pub product_name: String,
    /// The git checkout
    pub source_dir: Utf8PathBuf,
    /// Where cmake builds
    pub build_dir: Utf8PathBuf,
    /// Where installers are looked for
    pub installer_dir: Utf8PathBuf,
    /// Tag to check out instead of the main branch
    pub git_tag: Option<String>,
    /// Branch to check out when there's no tag (empty = don't)
    pub main_branch: String,
    /// Name of the .mpkg inside a disk image, if not `{stem}.mpkg`
    pub package_name: Option<String>,
    /// Where to publish to
    pub publish: Option<RemoteTarget>,
    /// The build itself
    pub build: BuildConfig,
}

/// The shape of `relcraft.toml`, and of the overrides the cli passes in
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConfigLayer {
    /// `[build]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildLayer>,
    /// `[install]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install: Option<InstallLayer>,
    /// `[publish]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish: Option<PublishLayer>,
}

/// `[build]`
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildLayer {
    /// product name
    pub product: Option<String>,
    /// tag to check out
    pub git_tag: Option<String>,
    /// branch to check out
    pub main_branch: Option<String>,
    /// the git checkout
    pub source_dir: Option<Utf8PathBuf>,
    /// where to build
    pub build_dir: Option<Utf8PathBuf>,
    /// cmake build type
    pub build_type: Option<BuildType>,
    /// 32 bit build
    #[serde(rename = "b32")]
    pub is_32_bit: Option<bool>,
    /// static linking
    #[serde(rename = "static")]
    pub is_static: Option<bool>,
    /// generate ninja files
    pub ninja: Option<bool>,
    /// generate nmake files for jom
    pub jom: Option<bool>,
    /// generate an xcode project
    pub xcode: Option<bool>,
    /// abbreviate folder names
    pub short_pathnames: Option<bool>,
    /// CMAKE_ECLIPSE_VERSION
    pub eclipse_version: Option<String>,
    /// parallel jobs
    pub threads: Option<u32>,
    /// extra cmake options
    pub cmake_options: Option<BTreeMap<String, String>>,
}

/// `[install]`
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InstallLayer {
    /// where installers are found
    pub installer_dir: Option<Utf8PathBuf>,
    /// package inside a disk image
    pub package_name: Option<String>,
}

/// `[publish]`
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PublishLayer {
    /// host name
    pub server: Option<String>,
    /// base folder on the host
    pub path: Option<String>,
    /// login user
    pub user: Option<String>,
}

/// Config while it's still being layered
#[derive(Debug, Clone)]
struct Settings {
    product: String,
    git_tag: Option<String>,
    main_branch: String,
    source_dir: Option<Utf8PathBuf>,
    build_dir: Option<Utf8PathBuf>,
    build_type: BuildType,
    is_32_bit: bool,
    is_static: bool,
    ninja: Option<bool>,
    jom: bool,
    xcode: bool,
    short_pathnames: bool,
    eclipse_version: String,
    threads: u32,
    cmake_options: BTreeMap<String, String>,
    installer_dir: Option<Utf8PathBuf>,
    package_name: Option<String>,
    server: Option<String>,
    path: Option<String>,
    user: Option<String>,
}

impl Settings {
    fn defaults(platform: Platform) -> Self {
        let caps = platform.caps();
        Self {
            product: DEFAULT_PRODUCT.to_owned(),
            git_tag: None,
            main_branch: DEFAULT_MAIN_BRANCH.to_owned(),
            source_dir: None,
            build_dir: None,
            build_type: BuildType::Debug,
            is_32_bit: false,
            is_static: false,
            ninja: caps.assume_ninja.then_some(true),
            jom: false,
            xcode: false,
            short_pathnames: caps.short_pathnames_by_default,
            eclipse_version: DEFAULT_ECLIPSE_VERSION.to_owned(),
            threads: 1,
            cmake_options: BTreeMap::new(),
            installer_dir: None,
            package_name: None,
            server: None,
            path: None,
            user: None,
        }
    }
}

impl ApplyLayer for Settings {
    type Layer = ConfigLayer;
    fn apply_layer(
        &mut self,
        Self::Layer {
            build,
            install,
            publish,
        }: Self::Layer,
    ) {
        if let Some(BuildLayer {
            product,
            git_tag,
            main_branch,
            source_dir,
            build_dir,
            build_type,
            is_32_bit,
            is_static,
            ninja,
            jom,
            xcode,
            short_pathnames,
            eclipse_version,
            threads,
            cmake_options,
        }) = build
        {
            self.product.apply_val(product);
            self.git_tag.apply_opt(git_tag);
            self.main_branch.apply_val(main_branch);
            self.source_dir.apply_opt(source_dir);
            self.build_dir.apply_opt(build_dir);
            self.build_type.apply_val(build_type);
            self.is_32_bit.apply_val(is_32_bit);
            self.is_static.apply_val(is_static);
            self.ninja.apply_opt(ninja);
            self.jom.apply_val(jom);
            self.xcode.apply_val(xcode);
            self.short_pathnames.apply_val(short_pathnames);
            self.eclipse_version.apply_val(eclipse_version);
            self.threads.apply_val(threads);
            self.cmake_options.apply_entries(cmake_options);
        }
        if let Some(InstallLayer {
            installer_dir,
            package_name,
        }) = install
        {
            self.installer_dir.apply_opt(installer_dir);
            self.package_name.apply_opt(package_name);
        }
        if let Some(PublishLayer { server, path, user }) = publish {
            self.server.apply_opt(server);
            self.path.apply_opt(path);
            self.user.apply_opt(user);
        }
    }
}

impl Config {
    /// Resolve config for `platform` from a stack of layers, later layers winning.
    ///
    /// `ninja_on_path` is only asked when nothing said whether to use ninja,
    /// the platform doesn't assume it, and no higher priority generator was picked.
    pub fn resolve(
        platform: Platform,
        root_dir: Utf8PathBuf,
        layers: impl IntoIterator<Item = ConfigLayer>,
        ninja_on_path: impl FnOnce() -> bool,
    ) -> RelResult<Self> {
        let mut settings = Settings::defaults(platform);
        for layer in layers {
            settings.apply_layer(layer);
        }
        let Settings {
            product,
            git_tag,
            main_branch,
            source_dir,
            build_dir,
            build_type,
            is_32_bit,
            is_static,
            ninja,
            jom,
            xcode,
            short_pathnames,
            eclipse_version,
            threads,
            cmake_options,
            installer_dir,
            package_name,
            server,
            path,
            user,
        } = settings;

        let generator = GeneratorChoice::from_toggles(xcode, jom, || {
            ninja.unwrap_or_else(ninja_on_path)
        });
        generator.check_supported(platform)?;
        if !ECLIPSE_VERSIONS.contains(&eclipse_version.as_str()) {
            return Err(RelcraftError::InvalidEclipseVersion {
                value: eclipse_version,
                allowed: ECLIPSE_VERSIONS.join(", "),
            });
        }

        let build = BuildConfig {
            platform,
            is_32_bit,
            build_type,
            is_static,
            generator,
            short_pathnames,
            cmake_overrides: cmake_options,
            eclipse_version,
            threads: threads.max(1),
        };

        let product_dir = root_dir.join(&product);
        let source_dir = source_dir.unwrap_or_else(|| product_dir.join(&product));
        let build_dir = build_dir.unwrap_or_else(|| product_dir.join(build.build_folder_name()));
        // cpack leaves installers in the build folder
        let installer_dir = installer_dir.unwrap_or_else(|| build_dir.clone());
        let publish = match (server, path) {
            (Some(server), Some(path)) => Some(RemoteTarget { server, path, user }),
            _ => None,
        };

        let config = Config {
            root_dir,
            product_name: product,
            source_dir,
            build_dir,
            installer_dir,
            git_tag: normalize_git_tag(git_tag),
            main_branch,
            package_name,
            publish,
            build,
        };
        debug!("resolved config: {config:#?}");
        Ok(config)
    }
}

/// Load config the way the cli does: defaults, then `relcraft.toml`, then `cli`.
///
/// If `config_path` isn't given, `{root_dir}/relcraft.toml` is used if it exists.
pub fn load(
    platform: Platform,
    root_dir: Option<&Utf8Path>,
    config_path: Option<&Utf8Path>,
    cli: ConfigLayer,
) -> RelResult<Config> {
    let root_dir = match root_dir {
        Some(dir) => absolutize(dir)?,
        None => default_root_dir(platform)?,
    };
    let file = match config_path {
        Some(path) => Some(loader::load(path)?),
        None => loader::load_if_present(&root_dir.join(CONFIG_FILE_NAME))?,
    };
    // dirs in the file are relative to the root dir, dirs on the cli to where we were run
    let file = file.map(|layer| layer.rebase(&root_dir));
    let cli = cli.rebase(&current_dir()?);
    Config::resolve(
        platform,
        root_dir,
        file.into_iter().chain(Some(cli)),
        crate::process::ninja_on_path,
    )
}

/// Where everything lives if nobody says otherwise
pub fn default_root_dir(platform: Platform) -> RelResult<Utf8PathBuf> {
    if platform.is_windows() {
        return Ok(Utf8PathBuf::from("C:/Dev/cx"));
    }
    let home = homedir::get_my_home()?.ok_or(RelcraftError::NoDefaultRootDir)?;
    let home = Utf8PathBuf::from_path_buf(home)
        .map_err(|path| RelcraftError::NonUtf8Path { path })?;
    Ok(home.join("dev").join("cx"))
}

/// Make a path absolute relative to the current dir
fn absolutize(dir: &Utf8Path) -> RelResult<Utf8PathBuf> {
    if dir.is_absolute() {
        return Ok(dir.to_owned());
    }
    Ok(current_dir()?.join(dir))
}

fn current_dir() -> RelResult<Utf8PathBuf> {
    let cwd = std::env::current_dir()?;
    Utf8PathBuf::from_path_buf(cwd).map_err(|path| RelcraftError::NonUtf8Path { path })
}

impl ConfigLayer {
    /// Join any relative dirs in this layer onto `base`
    pub fn rebase(mut self, base: &Utf8Path) -> Self {
        let rebase = |dir: &mut Option<Utf8PathBuf>| {
            if let Some(path) = dir.as_mut().filter(|path| path.is_relative()) {
                *path = base.join(&*path);
            }
        };
        if let Some(build) = self.build.as_mut() {
            rebase(&mut build.source_dir);
            rebase(&mut build.build_dir);
        }
        if let Some(install) = self.install.as_mut() {
            rebase(&mut install.installer_dir);
        }
        self
    }
}

/// An empty tag, or one that's just a pair of quotes, means no tag.
pub fn normalize_git_tag(tag: Option<String>) -> Option<String> {
    tag.filter(|tag| {
        let tag = tag.trim();
        !tag.is_empty() && tag != "\"\""
    })
}
