//! Finding the installer we just built and installing it on this machine
//!
//! Each platform has one procedure ([`InstallProcedure`][]). A procedure is planned
//! as a list of [`InstallStep`][]s, which are then run in order. Planning never
//! touches the disk, so what an install would do can be inspected up front.

use axoasset::LocalAsset;
use camino::{Utf8Path, Utf8PathBuf};
use relcraft_schema::InstallReport;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::Config;
use crate::errors::{RelResult, RelcraftError};
use crate::platform::InstallProcedure;
use crate::process::{Invocation, Runner};

pub mod archive;
pub mod dmg;
pub mod nsis;

/// One step of an install
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallStep {
    /// Delete a dir (if present) and create it empty
    ClearDir(Utf8PathBuf),
    /// Create a dir and its parents
    CreateDir(Utf8PathBuf),
    /// Run something
    Run(Invocation),
    /// Copy the contents of `src_path` into `dest_path`, overwriting
    MergeDir {
        /// copy from
        src_path: Utf8PathBuf,
        /// copy into
        dest_path: Utf8PathBuf,
    },
}

impl Config {
    /// Where installs land on this platform
    pub fn install_root(&self) -> Utf8PathBuf {
        self.build
            .platform
            .caps()
            .install_root
            .resolve(&self.root_dir)
    }

    /// The glob installers must match, `{installer_dir}/{product}*.{suffix}`
    pub fn installer_pattern(&self) -> String {
        format!(
            "{}/{}*.{}",
            self.installer_dir,
            self.product_name,
            self.build.platform.caps().installer_suffix
        )
    }

    /// Scratch space archives get unpacked into
    pub fn install_scratch_dir(&self) -> Utf8PathBuf {
        self.root_dir.join("temp").join("Install")
    }
}

/// Find the one installer in the installer dir.
///
/// Zero or several matches is an error that lists everything that matched.
pub fn find_installer_file(config: &Config) -> RelResult<Utf8PathBuf> {
    let pattern = config.installer_pattern();
    info!("looking for installers with pattern: {pattern}");
    let mut found = glob_files(&pattern)?;
    if found.len() != 1 {
        return Err(RelcraftError::InstallerDiscovery {
            pattern,
            found: found.iter().map(|path| path.to_string()).collect(),
        });
    }
    Ok(found.remove(0))
}

/// Everything matching `pattern`, sorted
fn glob_files(pattern: &str) -> RelResult<Vec<Utf8PathBuf>> {
    let mut found = vec![];
    // unreadable entries just don't match
    for path in glob::glob(pattern)?.flatten() {
        let path =
            Utf8PathBuf::from_path_buf(path).map_err(|path| RelcraftError::NonUtf8Path { path })?;
        found.push(path);
    }
    found.sort();
    Ok(found)
}

/// Remove whatever a previous install left behind: the installed product,
/// old installers, and the unpack scratch dir. Missing things are fine.
///
/// This deletes installers, so it belongs before a build, not before an install.
pub fn remove_previous_install(config: &Config) -> RelResult<()> {
    for old in glob_files(&config.installer_pattern())? {
        debug!("removing old installer {old}");
        LocalAsset::remove_file(&old)?;
    }
    remove_installed_product(config)
}

/// Remove the installed product and the unpack scratch dir
pub fn remove_installed_product(config: &Config) -> RelResult<()> {
    let installed = config.install_root().join(&config.product_name);
    info!("removing previous install at {installed}");
    LocalAsset::remove_dir_all(&installed)?;
    LocalAsset::remove_dir_all(config.install_scratch_dir())?;
    Ok(())
}

/// Plan how to install `file` on this platform
pub fn plan_install(config: &Config, file: &Utf8Path) -> Vec<InstallStep> {
    match config.build.platform.caps().install_procedure {
        InstallProcedure::Archive => archive::plan(config, file),
        InstallProcedure::DiskImage => dmg::plan(config, file, std::process::id()),
        InstallProcedure::SilentInstaller => nsis::plan(config, file),
    }
}

/// Find the installer and install it
pub fn install_package(config: &Config, runner: &mut dyn Runner) -> RelResult<InstallReport> {
    let file = find_installer_file(config)?;
    info!("installing file {file}");
    install_file(config, runner, &file)?;
    let install_root = config.install_root();
    info!("installed {file} to {install_root}");
    Ok(InstallReport {
        installer: file.to_string(),
        procedure: config
            .build
            .platform
            .caps()
            .install_procedure
            .name()
            .to_owned(),
        install_root: install_root.to_string(),
    })
}

/// Install a specific installer file
pub fn install_file(config: &Config, runner: &mut dyn Runner, file: &Utf8Path) -> RelResult<()> {
    for step in plan_install(config, file) {
        run_install_step(runner, &step)?;
    }
    Ok(())
}

/// Run one step of an install
pub fn run_install_step(runner: &mut dyn Runner, step: &InstallStep) -> RelResult<()> {
    match step {
        InstallStep::ClearDir(dir) => {
            LocalAsset::remove_dir_all(dir)?;
            LocalAsset::create_dir_all(dir)?;
        }
        InstallStep::CreateDir(dir) => {
            LocalAsset::create_dir_all(dir)?;
        }
        InstallStep::Run(invocation) => runner.run(invocation)?,
        InstallStep::MergeDir {
            src_path,
            dest_path,
        } => merge_dir(src_path, dest_path)?,
    }
    Ok(())
}

/// Recursively copy the contents of `src_path` into `dest_path`.
///
/// Unlike [`LocalAsset::copy_dir_to_dir`][] the destination may already exist,
/// existing files are overwritten and everything else is left alone.
pub fn merge_dir(src_path: &Utf8Path, dest_path: &Utf8Path) -> RelResult<()> {
    debug!("copying {src_path} into {dest_path}");
    LocalAsset::create_dir_all(dest_path)?;
    for entry in WalkDir::new(src_path).min_depth(1) {
        let entry = entry.map_err(|details| RelcraftError::WalkDir {
            dir: src_path.to_owned(),
            details,
        })?;
        let from = Utf8Path::from_path(entry.path()).ok_or_else(|| RelcraftError::NonUtf8Path {
            path: entry.path().to_owned(),
        })?;
        let Ok(rel_path) = from.strip_prefix(src_path) else {
            continue;
        };
        let to = dest_path.join(rel_path);
        if entry.file_type().is_dir() {
            LocalAsset::create_dir_all(&to)?;
        } else if entry.file_type().is_file() {
            LocalAsset::copy_file_to_file(from, &to)?;
        } else {
            debug!("skipping {from}, not a file or dir");
        }
    }
    Ok(())
}
