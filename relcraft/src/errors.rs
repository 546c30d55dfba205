//! Errors!

use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// An alias for the common Result type for this crate
pub type RelResult<T> = std::result::Result<T, RelcraftError>;

/// Errors relcraft can have
#[derive(Debug, Error, Diagnostic)]
pub enum RelcraftError {
    /// random i/o error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// random axoasset error
    #[error(transparent)]
    #[diagnostic(transparent)]
    Asset(#[from] axoasset::AxoassetError),

    /// An external process failed to run, or exited non-zero
    #[error(transparent)]
    #[diagnostic(transparent)]
    Process(#[from] axoprocess::AxoprocessError),

    /// A process printed something that wasn't utf8
    #[error(transparent)]
    FromUtf8(#[from] std::string::FromUtf8Error),

    /// The installer search pattern wasn't valid
    #[error(transparent)]
    Glob(#[from] glob::PatternError),

    /// Couldn't work out the user's home dir
    #[error(transparent)]
    Homedir(#[from] homedir::GetHomeError),

    /// There's no home dir to put the default root dir in
    #[error("couldn't determine a default root dir")]
    #[diagnostic(help("pass --root-dir explicitly"))]
    NoDefaultRootDir,

    /// A path we had to work with wasn't utf8
    #[error("path isn't valid utf8: {path:?}")]
    NonUtf8Path {
        /// the offending path
        path: std::path::PathBuf,
    },

    /// A walk over a directory tree failed
    #[error("couldn't walk {dir}")]
    WalkDir {
        /// the dir being walked
        dir: Utf8PathBuf,
        /// underlying error
        #[source]
        details: walkdir::Error,
    },

    /// The requested generator can't be used on this platform
    #[error("the {generator} generator isn't supported on {platform}")]
    #[diagnostic(help("supported generators on {platform}: {supported}"))]
    UnsupportedGenerator {
        /// the generator that was requested
        generator: String,
        /// the platform we're on
        platform: String,
        /// what would have been fine
        supported: String,
    },

    /// Not one of the four cmake build types
    #[error("{value} is not a valid build type")]
    #[diagnostic(help("choose one of {allowed}"))]
    InvalidBuildType {
        /// what we got
        value: String,
        /// what we accept (comma separated)
        allowed: String,
    },

    /// Not an eclipse version cmake knows about
    #[error("{value} is not a supported eclipse version")]
    #[diagnostic(help("choose one of {allowed}"))]
    InvalidEclipseVersion {
        /// what we got
        value: String,
        /// what we accept (comma separated)
        allowed: String,
    },

    /// We only know how to build on three operating systems
    #[error("relcraft doesn't support building on {os}")]
    #[diagnostic(help("supported hosts are windows, macos and linux"))]
    UnsupportedPlatform {
        /// value of std::env::consts::OS
        os: String,
    },

    /// `-D` flags need an `=`
    #[error("cmake option {option} isn't of the form KEY=VALUE")]
    MalformedCmakeOption {
        /// the raw flag
        option: String,
    },

    /// Installer discovery needs exactly one match
    #[error("found {} install files, requiring 1:\n pattern: {pattern}\n found:\n {}", .found.len(), .found.join("\n "))]
    #[diagnostic(help("remove stale installers or point --installer-dir somewhere else"))]
    InstallerDiscovery {
        /// the glob we searched with
        pattern: String,
        /// everything that matched
        found: Vec<String>,
    },

    /// publish was asked for without anywhere to publish to
    #[error("no publish target was configured")]
    #[diagnostic(help(
        "pass --server and --path, or set them in the [publish] table of relcraft.toml"
    ))]
    MissingPublishTarget,

    /// git describe succeeded but said nothing
    #[error("git describe produced no output in {dir}")]
    #[diagnostic(help("does the repository have any tags?"))]
    EmptyDescribe {
        /// the checkout we asked
        dir: Utf8PathBuf,
    },

    /// The remote server couldn't be reached at all
    #[error("couldn't connect to {server}")]
    #[diagnostic(help("check that you can ssh to the server without a password prompt"))]
    RemoteConnect {
        /// user@server
        server: String,
        /// underlying error
        #[source]
        details: Box<RelcraftError>,
    },

    /// We reached the server, but putting files there failed
    #[error("couldn't copy {source_path} to {server}:{remote_path}")]
    RemoteCopy {
        /// local thing being copied
        source_path: Utf8PathBuf,
        /// user@server
        server: String,
        /// where it was going
        remote_path: String,
        /// underlying error
        #[source]
        details: Box<RelcraftError>,
    },
}

impl RelcraftError {
    /// Whether this error is a bad combination of options,
    /// as opposed to something going wrong while running.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            RelcraftError::UnsupportedGenerator { .. }
                | RelcraftError::InvalidBuildType { .. }
                | RelcraftError::InvalidEclipseVersion { .. }
                | RelcraftError::UnsupportedPlatform { .. }
                | RelcraftError::MalformedCmakeOption { .. }
                | RelcraftError::MissingPublishTarget
        )
    }
}
