//! Gathering a release into a folder and publishing it

use axoasset::LocalAsset;
use camino::{Utf8Path, Utf8PathBuf};
use relcraft_schema::PublishReport;
use tracing::info;

use crate::config::{Config, RemoteTarget};
use crate::errors::RelResult;
use crate::installer::find_installer_file;
use crate::process::Runner;
use crate::remote::RemoteTransfer;
use crate::vcs::GitRepo;
use crate::version::{ReleaseIdentity, VersionNamer};

/// A release folder on local disk
#[derive(Debug, Clone)]
pub struct ReleaseFolder {
    /// where it is
    pub path: Utf8PathBuf,
    /// what release it holds
    pub identity: ReleaseIdentity,
}

/// Refresh tags and work out what the checkout's release is called
pub fn release_identity(config: &Config, runner: &mut dyn Runner) -> RelResult<ReleaseIdentity> {
    let repo = GitRepo::for_config(config);
    VersionNamer::new(&repo).resolve_release_identity(runner)
}

/// `{installer_dir}/Release/{product}_{name}`
pub fn release_folder_path(config: &Config, identity: &ReleaseIdentity) -> Utf8PathBuf {
    identity.release_folder_path(config.installer_dir.as_str(), &config.product_name)
}

/// Create the release folder and put the installer in it
pub fn create_release_folder(config: &Config, runner: &mut dyn Runner) -> RelResult<ReleaseFolder> {
    let identity = release_identity(config, runner)?;
    let path = release_folder_path(config, &identity);
    info!("creating folder {path}");
    LocalAsset::create_dir_all(&path)?;
    let installer = find_installer_file(config)?;
    LocalAsset::copy_file_to_dir(&installer, &path)?;
    info!("copied file {installer} into {path}");
    Ok(ReleaseFolder { path, identity })
}

/// Where a release's contents go on the server: `{path}/{folder}/{platform}`
pub fn publish_destination(config: &Config, folder_name: &str, target: &RemoteTarget) -> String {
    format!(
        "{}/{folder_name}/{}",
        target.path,
        config.build.platform.caps().display_name
    )
}

/// Copy the contents of `source` to the server, under `folder_name`
pub fn publish_release_folder(
    config: &Config,
    runner: &mut dyn Runner,
    source: &Utf8Path,
    folder_name: &str,
    target: &RemoteTarget,
) -> RelResult<PublishReport> {
    let remote_path = publish_destination(config, folder_name, target);
    info!("publishing contents of {source} to {}:{remote_path}", target.server);
    let entries = RemoteTransfer::new(target).copy_folder_contents(runner, source, &remote_path)?;
    Ok(PublishReport {
        source: source.to_string(),
        server: target.server.clone(),
        remote_path,
        entries,
    })
}
