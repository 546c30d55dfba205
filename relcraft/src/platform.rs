//! The three host platforms we build on, and everything that differs between them.
//!
//! Rather than asking "are we on windows?" all over the place, each platform has a
//! [`PlatformCaps`][] entry in a single table, and everything else consults that.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::GeneratorChoice;
use crate::errors::{RelResult, RelcraftError};

/// A host operating system
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Platform {
    /// Microsoft Windows
    Windows,
    /// Apple macOS
    #[serde(rename = "macos")]
    MacOs,
    /// Any Linux
    Linux,
}

/// Which install procedure a platform's installer artifacts need
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InstallProcedure {
    /// A .tar.gz that gets unpacked and copied into place
    Archive,
    /// A .dmg with a .mpkg inside it
    DiskImage,
    /// An NSIS .exe that supports a silent mode
    SilentInstaller,
}

impl InstallProcedure {
    /// A short name for reports
    pub fn name(self) -> &'static str {
        match self {
            InstallProcedure::Archive => "archive",
            InstallProcedure::DiskImage => "disk-image",
            InstallProcedure::SilentInstaller => "silent-installer",
        }
    }
}

/// Where installs land
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InstallRoot {
    /// Always the same place
    Fixed(&'static str),
    /// `{root_dir}{separator}Installed`
    UnderRootDir {
        /// path separator to glue on with
        separator: &'static str,
    },
}

impl InstallRoot {
    /// The install root for a given root dir
    pub fn resolve(self, root_dir: &Utf8Path) -> Utf8PathBuf {
        match self {
            InstallRoot::Fixed(path) => Utf8PathBuf::from(path),
            InstallRoot::UnderRootDir { separator } => {
                Utf8PathBuf::from(format!("{root_dir}{separator}Installed"))
            }
        }
    }
}

/// Everything that varies by platform
#[derive(Debug, Clone)]
pub struct PlatformCaps {
    /// The generator cmake gets when nothing else was asked for
    pub default_generator: &'static str,
    /// Generators that make sense here
    pub supported_generators: &'static [GeneratorChoice],
    /// File suffix of installer artifacts (no leading dot)
    pub installer_suffix: &'static str,
    /// How installer artifacts get installed
    pub install_procedure: InstallProcedure,
    /// Whether to hush `-Wdeprecated` in CXX_FLAGS
    pub quiet_deprecation_warnings: bool,
    /// Whether a 32 bit build needs CMAKE_OSX_ARCHITECTURES
    pub needs_32_bit_arch_flag: bool,
    /// Whether paths are short by default (MAX_PATH, sigh)
    pub short_pathnames_by_default: bool,
    /// Whether ninja is assumed to be present
    pub assume_ninja: bool,
    /// Name to show users, e.g. in publish folders
    pub display_name: &'static str,
    /// Where installs land, given the root dir
    pub install_root: InstallRoot,
}

static WINDOWS: PlatformCaps = PlatformCaps {
    default_generator: "Eclipse CDT4 - NMake Makefiles",
    supported_generators: &[
        GeneratorChoice::Make,
        GeneratorChoice::Ninja,
        GeneratorChoice::Jom,
    ],
    installer_suffix: "exe",
    install_procedure: InstallProcedure::SilentInstaller,
    quiet_deprecation_warnings: false,
    needs_32_bit_arch_flag: false,
    short_pathnames_by_default: true,
    assume_ninja: true,
    display_name: "Windows",
    install_root: InstallRoot::UnderRootDir { separator: "\\" },
};

static MACOS: PlatformCaps = PlatformCaps {
    default_generator: "Eclipse CDT4 - Unix Makefiles",
    supported_generators: &[
        GeneratorChoice::Make,
        GeneratorChoice::Ninja,
        GeneratorChoice::Xcode,
    ],
    installer_suffix: "dmg",
    install_procedure: InstallProcedure::DiskImage,
    quiet_deprecation_warnings: true,
    needs_32_bit_arch_flag: true,
    short_pathnames_by_default: false,
    assume_ninja: false,
    display_name: "MacOSX",
    install_root: InstallRoot::Fixed("/Applications"),
};

static LINUX: PlatformCaps = PlatformCaps {
    default_generator: "Eclipse CDT4 - Unix Makefiles",
    supported_generators: &[GeneratorChoice::Make, GeneratorChoice::Ninja],
    installer_suffix: "tar.gz",
    install_procedure: InstallProcedure::Archive,
    quiet_deprecation_warnings: true,
    needs_32_bit_arch_flag: false,
    short_pathnames_by_default: false,
    assume_ninja: false,
    display_name: "Linux",
    install_root: InstallRoot::UnderRootDir { separator: "/" },
};

impl Platform {
    /// The platform this binary is running on
    pub fn host() -> RelResult<Self> {
        Self::from_os(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` value to a Platform
    pub fn from_os(os: &str) -> RelResult<Self> {
        match os {
            "windows" => Ok(Platform::Windows),
            "macos" => Ok(Platform::MacOs),
            "linux" => Ok(Platform::Linux),
            other => Err(RelcraftError::UnsupportedPlatform {
                os: other.to_owned(),
            }),
        }
    }

    /// Look up this platform's row in the capability table
    pub fn caps(self) -> &'static PlatformCaps {
        match self {
            Platform::Windows => &WINDOWS,
            Platform::MacOs => &MACOS,
            Platform::Linux => &LINUX,
        }
    }

    /// Whether this is windows
    pub fn is_windows(self) -> bool {
        self == Platform::Windows
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.caps().display_name)
    }
}
