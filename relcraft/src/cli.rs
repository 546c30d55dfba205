//! All the clap stuff for parsing/documenting the cli

use std::collections::BTreeMap;

use camino::Utf8PathBuf;
use clap::{
    builder::{PossibleValuesParser, TypedValueParser},
    ArgAction, Args, Parser, Subcommand, ValueEnum,
};
use relcraft::config::{BuildLayer, BuildType, ConfigLayer, InstallLayer, PublishLayer};
use relcraft::errors::RelResult;
use relcraft::resolve::parse_cmake_option;
use tracing::level_filters::LevelFilter;

#[derive(Parser, Clone, Debug)]
#[clap(version, about, long_about = None)]
#[clap(propagate_version = true)]
/// Build, package, install and publish releases of a CMake product.
pub struct Cli {
    #[clap(subcommand)]
    pub command: Option<Commands>,

    /// How verbose logging should be (log level)
    #[clap(long, short)]
    #[clap(default_value_t = LevelFilter::WARN)]
    #[clap(value_parser = PossibleValuesParser::new(["off", "error", "warn", "info", "debug", "trace"]).map(|s| s.parse::<LevelFilter>().expect("possible values are valid")))]
    #[clap(help_heading = "GLOBAL OPTIONS", global = true)]
    pub verbose: LevelFilter,

    /// The format of the output
    #[clap(long, short, value_enum)]
    #[clap(default_value_t = OutputFormat::Human)]
    #[clap(help_heading = "GLOBAL OPTIONS", global = true)]
    pub output_format: OutputFormat,

    /// Print the resolved configuration and exit
    #[clap(long)]
    #[clap(help_heading = "GLOBAL OPTIONS", global = true)]
    pub print_config: bool,

    #[clap(flatten)]
    pub build: BuildOpts,
}

/// Options that shape the build, shared by every command
#[derive(Args, Clone, Debug, Default)]
pub struct BuildOpts {
    /// Root of all checkouts and builds (default: ~/dev/cx, or C:/Dev/cx on windows)
    #[clap(long)]
    #[clap(help_heading = "BUILD OPTIONS", global = true)]
    pub root_dir: Option<Utf8PathBuf>,

    /// Config file to read (default: <root-dir>/relcraft.toml, if it exists)
    #[clap(long)]
    #[clap(help_heading = "BUILD OPTIONS", global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Number of parallel build jobs
    #[clap(long, short = 'j')]
    #[clap(help_heading = "BUILD OPTIONS", global = true)]
    pub threads: Option<u32>,

    /// Git tag to check out instead of the main branch ("" means none)
    #[clap(long, short = 'g')]
    #[clap(help_heading = "BUILD OPTIONS", global = true)]
    pub git_tag: Option<String>,

    /// CMake build type
    #[clap(long, short = 't')]
    #[clap(value_parser = PossibleValuesParser::new(["Debug", "Release", "RelWithDebInfo", "MinSizeRel"]).map(|s| s.parse::<BuildType>().expect("possible values are valid")))]
    #[clap(help_heading = "BUILD OPTIONS", global = true)]
    pub build_type: Option<BuildType>,

    /// Branch to check out when there's no tag ("" skips the checkout)
    #[clap(long)]
    #[clap(help_heading = "BUILD OPTIONS", global = true)]
    pub main_branch: Option<String>,

    /// Eclipse version for cmake's eclipse generators
    #[clap(long)]
    #[clap(help_heading = "BUILD OPTIONS", global = true)]
    pub eclipse_version: Option<String>,

    /// Build for 32 bit
    #[clap(long, overrides_with = "no_b32")]
    #[clap(help_heading = "BUILD OPTIONS", global = true)]
    pub b32: bool,
    /// Build for 64 bit
    #[clap(long, overrides_with = "b32", hide = true)]
    #[clap(global = true)]
    pub no_b32: bool,

    /// Link libraries statically
    #[clap(long = "static", overrides_with = "no_static")]
    #[clap(help_heading = "BUILD OPTIONS", global = true)]
    pub is_static: bool,
    /// Link libraries dynamically
    #[clap(long, overrides_with = "is_static", hide = true)]
    #[clap(global = true)]
    pub no_static: bool,

    /// Generate ninja files
    #[clap(long, overrides_with = "no_ninja")]
    #[clap(help_heading = "BUILD OPTIONS", global = true)]
    pub ninja: bool,
    /// Don't generate ninja files
    #[clap(long, overrides_with = "ninja", hide = true)]
    #[clap(global = true)]
    pub no_ninja: bool,

    /// Generate nmake files and build with jom (windows)
    #[clap(long, overrides_with = "no_jom")]
    #[clap(help_heading = "BUILD OPTIONS", global = true)]
    pub jom: bool,
    /// Don't use jom
    #[clap(long, overrides_with = "jom", hide = true)]
    #[clap(global = true)]
    pub no_jom: bool,

    /// Generate an Xcode project (macos)
    #[clap(long, overrides_with = "no_xcode")]
    #[clap(help_heading = "BUILD OPTIONS", global = true)]
    pub xcode: bool,
    /// Don't use xcode
    #[clap(long, overrides_with = "xcode", hide = true)]
    #[clap(global = true)]
    pub no_xcode: bool,

    /// Abbreviate build folder names (for MAX_PATH)
    #[clap(long, overrides_with = "no_short_pathnames")]
    #[clap(help_heading = "BUILD OPTIONS", global = true)]
    pub short_pathnames: bool,
    /// Don't abbreviate build folder names
    #[clap(long, overrides_with = "short_pathnames", hide = true)]
    #[clap(global = true)]
    pub no_short_pathnames: bool,

    /// Extra cmake option, overriding the defaults (repeatable)
    #[clap(long = "cmake-option", short = 'D', value_name = "KEY=VALUE")]
    #[clap(action = ArgAction::Append)]
    #[clap(help_heading = "BUILD OPTIONS", global = true)]
    pub cmake_options: Vec<String>,

    /// Name of the product (installer prefix, install and release folder names)
    #[clap(long)]
    #[clap(help_heading = "BUILD OPTIONS", global = true)]
    pub product: Option<String>,

    /// Where to look for installers
    #[clap(long)]
    #[clap(help_heading = "BUILD OPTIONS", global = true)]
    pub installer_dir: Option<Utf8PathBuf>,
}

/// A `--foo`/`--no-foo` pair, where neither means "not specified"
fn flag_pair(yes: bool, no: bool) -> Option<bool> {
    match (yes, no) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

impl BuildOpts {
    /// These options as the topmost config layer
    pub fn to_layer(&self, publish: Option<&PublishCmdArgs>) -> RelResult<ConfigLayer> {
        let cmake_options = if self.cmake_options.is_empty() {
            None
        } else {
            Some(
                self.cmake_options
                    .iter()
                    .map(|raw| parse_cmake_option(raw))
                    .collect::<RelResult<BTreeMap<_, _>>>()?,
            )
        };
        Ok(ConfigLayer {
            build: Some(BuildLayer {
                product: self.product.clone(),
                git_tag: self.git_tag.clone(),
                main_branch: self.main_branch.clone(),
                source_dir: None,
                build_dir: None,
                build_type: self.build_type,
                is_32_bit: flag_pair(self.b32, self.no_b32),
                is_static: flag_pair(self.is_static, self.no_static),
                ninja: flag_pair(self.ninja, self.no_ninja),
                jom: flag_pair(self.jom, self.no_jom),
                xcode: flag_pair(self.xcode, self.no_xcode),
                short_pathnames: flag_pair(self.short_pathnames, self.no_short_pathnames),
                eclipse_version: self.eclipse_version.clone(),
                threads: self.threads,
                cmake_options,
            }),
            install: Some(InstallLayer {
                installer_dir: self.installer_dir.clone(),
                package_name: None,
            }),
            publish: publish.map(|args| PublishLayer {
                server: args.server.clone(),
                path: args.path.clone(),
                user: args.user.clone(),
            }),
        })
    }
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Print the resolved configuration
    #[clap(disable_version_flag = true)]
    Config,
    /// Check out the configured tag, or the main branch
    #[clap(disable_version_flag = true)]
    Checkout(CheckoutArgs),
    /// Run cmake in the build folder
    ///
    /// Anything after `--` is passed to cmake as-is.
    #[clap(disable_version_flag = true)]
    Configure(ConfigureArgs),
    /// Build in the build folder
    #[clap(disable_version_flag = true)]
    Build,
    /// Clean the build folder
    #[clap(disable_version_flag = true)]
    Clean,
    /// Delete the build folder
    #[clap(disable_version_flag = true)]
    Reset,
    /// Print the name this release would get
    ///
    /// This is the exact git tag if HEAD is at one, and otherwise today's date
    /// plus `git describe`, marked dirty.
    #[clap(disable_version_flag = true)]
    ReleaseName,
    /// Gather the installer into a release folder
    #[clap(disable_version_flag = true)]
    ReleaseFolder,
    /// Install the installer on this machine
    #[clap(disable_version_flag = true)]
    Install(InstallArgs),
    /// Remove the previous build's installers and install
    #[clap(disable_version_flag = true)]
    RemovePrevious,
    /// Copy a release folder to the publish server
    #[clap(disable_version_flag = true)]
    Publish(PublishCmdArgs),
    /// Print the JSON schema of the reports `--output-format=json` prints
    #[clap(disable_version_flag = true)]
    #[clap(hide = true)]
    Schema,
}

#[derive(Args, Clone, Debug)]
pub struct CheckoutArgs {
    /// Also sync and update submodules
    #[clap(long)]
    pub submodules: bool,
}

#[derive(Args, Clone, Debug)]
pub struct ConfigureArgs {
    /// Extra arguments for cmake
    #[clap(last = true)]
    pub cmake_args: Vec<String>,
}

#[derive(Args, Clone, Debug)]
pub struct InstallArgs {
    /// Remove the previously installed product first
    #[clap(long)]
    pub fresh: bool,
}

#[derive(Args, Clone, Debug)]
pub struct PublishCmdArgs {
    /// Server to publish to
    #[clap(long)]
    pub server: Option<String>,
    /// Base folder on the server
    #[clap(long)]
    pub path: Option<String>,
    /// User to log in as
    #[clap(long)]
    pub user: Option<String>,
    /// Folder to publish (default: a freshly created release folder)
    #[clap(long)]
    pub source: Option<Utf8PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}
