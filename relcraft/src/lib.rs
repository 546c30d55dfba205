#![deny(missing_docs)]
#![allow(clippy::result_large_err)]

//! # relcraft
//!
//! This is the library at the core of the `relcraft` CLI, which builds, packages,
//! installs and publishes releases of a CMake-built desktop product on Windows,
//! macOS and Linux.
//!
//! It's mostly glue: it works out what git, cmake, make/ninja/jom, hdiutil, tar,
//! NSIS and ssh should be asked to do, and then asks them. Working out what to
//! run is kept apart from running it (see [`process`][]) so the former can be
//! checked without a toolchain in sight.
//!
//! The `do_*` functions are what the CLI's subcommands call. Each returns one of
//! the reports in [`relcraft_schema`][].

use camino::{Utf8Path, Utf8PathBuf};
use relcraft_schema::{ConfigReport, InstallReport, PublishReport, ReleaseReport, StepReport};
use tracing::info;

use config::Config;
use errors::{RelResult, RelcraftError};
use process::{Runner, Transcript};
use vcs::GitRepo;

pub mod config;
pub mod errors;
pub mod installer;
pub mod platform;
pub mod process;
pub mod release;
pub mod remote;
pub mod resolve;
pub mod vcs;
pub mod version;
#[cfg(test)]
mod tests;

/// relcraft config -- describe the resolved configuration
pub fn do_config(cfg: &Config) -> RelResult<ConfigReport> {
    let build = &cfg.build;
    Ok(ConfigReport {
        platform: build.platform.to_string(),
        root_dir: cfg.root_dir.to_string(),
        source_dir: cfg.source_dir.to_string(),
        build_dir: cfg.build_dir.to_string(),
        installer_dir: cfg.installer_dir.to_string(),
        install_root: cfg.install_root().to_string(),
        build_type: build.build_type.to_string(),
        build_externals_type: build.build_externals_type().to_string(),
        is_static: build.is_static,
        is_32_bit: build.is_32_bit,
        short_pathnames: build.short_pathnames,
        generator: build.generator_identifier()?.to_owned(),
        build_folder: build.build_folder_name(),
        threads: build.threads,
        git_tag: cfg.git_tag.clone(),
        main_branch: cfg.main_branch.clone(),
        cmake_options: build.cmake_options(),
    })
}

fn step_report(step: &str, dir: &Utf8Path, commands: Vec<String>) -> StepReport {
    StepReport {
        step: step.to_owned(),
        dir: dir.to_string(),
        commands,
    }
}

/// relcraft checkout -- get the configured tag or branch
pub fn do_checkout(cfg: &Config, runner: &mut dyn Runner, submodules: bool) -> RelResult<StepReport> {
    let repo = GitRepo::for_config(cfg);
    let mut transcript = Transcript::new(runner);
    repo.checkout_default(&mut transcript, cfg, submodules)?;
    Ok(step_report("checkout", &repo.path, transcript.commands))
}

/// relcraft configure -- run cmake
pub fn do_configure(
    cfg: &Config,
    runner: &mut dyn Runner,
    extra_args: &[String],
) -> RelResult<StepReport> {
    let invocation = cfg.configure(runner, extra_args)?;
    Ok(step_report("configure", &cfg.build_dir, vec![invocation.render()]))
}

/// relcraft build -- build in the build dir
pub fn do_build(cfg: &Config, runner: &mut dyn Runner) -> RelResult<StepReport> {
    let invocation = cfg.build(runner)?;
    Ok(step_report("build", &cfg.build_dir, vec![invocation.render()]))
}

/// relcraft clean -- clean the build dir
pub fn do_clean(cfg: &Config, runner: &mut dyn Runner) -> RelResult<StepReport> {
    let invocation = cfg.clean(runner)?;
    Ok(step_report("clean", &cfg.build_dir, vec![invocation.render()]))
}

/// relcraft reset -- delete the build dir
pub fn do_reset(cfg: &Config) -> RelResult<StepReport> {
    let dir = cfg.reset()?;
    Ok(step_report("reset", &dir, vec![]))
}

/// relcraft release-name -- what would this release be called?
pub fn do_release_name(cfg: &Config, runner: &mut dyn Runner) -> RelResult<ReleaseReport> {
    let identity = release::release_identity(cfg, runner)?;
    let folder = release::release_folder_path(cfg, &identity);
    Ok(release_report(identity, folder))
}

/// relcraft release-folder -- gather the installer into a release folder
pub fn do_release_folder(cfg: &Config, runner: &mut dyn Runner) -> RelResult<ReleaseReport> {
    let folder = release::create_release_folder(cfg, runner)?;
    Ok(release_report(folder.identity, folder.path))
}

fn release_report(identity: version::ReleaseIdentity, folder: Utf8PathBuf) -> ReleaseReport {
    ReleaseReport {
        tag_name: identity.tag_name,
        describe: identity.describe,
        is_dirty: identity.is_dirty,
        resolved_name: identity.resolved_name,
        folder: Some(folder.to_string()),
    }
}

/// relcraft install -- install the freshly built installer on this machine
pub fn do_install(cfg: &Config, runner: &mut dyn Runner, fresh: bool) -> RelResult<InstallReport> {
    if fresh {
        installer::remove_installed_product(cfg)?;
    }
    installer::install_package(cfg, runner)
}

/// relcraft remove-previous -- clear out the last build's installers and install
pub fn do_remove_previous(cfg: &Config) -> RelResult<StepReport> {
    installer::remove_previous_install(cfg)?;
    Ok(step_report("remove-previous", &cfg.installer_dir, vec![]))
}

/// Arguments for `relcraft publish`
#[derive(Debug, Clone, Default)]
pub struct PublishArgs {
    /// Folder whose contents get published (default: a fresh release folder)
    pub source: Option<Utf8PathBuf>,
}

/// relcraft publish -- copy a release folder to the publish server
pub fn do_publish(
    cfg: &Config,
    runner: &mut dyn Runner,
    args: &PublishArgs,
) -> RelResult<PublishReport> {
    let target = cfg
        .publish
        .as_ref()
        .ok_or(RelcraftError::MissingPublishTarget)?;
    let source = match &args.source {
        Some(source) => source.clone(),
        None => release::create_release_folder(cfg, runner)?.path,
    };
    let folder_name = source.file_name().unwrap_or(source.as_str()).to_owned();
    info!("publishing {folder_name}");
    release::publish_release_folder(cfg, runner, &source, &folder_name, target)
}
