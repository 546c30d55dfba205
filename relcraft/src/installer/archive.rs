//! .tar.gz installs: unpack to scratch space, then copy over the install root

use camino::Utf8Path;

use super::InstallStep;
use crate::config::Config;
use crate::process::Invocation;

const SUFFIX: &str = ".tar.gz";

/// Plan the install of a .tar.gz
pub fn plan(config: &Config, file: &Utf8Path) -> Vec<InstallStep> {
    let scratch = config.install_scratch_dir();
    let install_root = config.install_root();
    let file_name = file.file_name().unwrap_or(file.as_str());
    let core_name = file_name.strip_suffix(SUFFIX).unwrap_or(file_name);
    let unpacked = scratch.join(core_name);

    vec![
        InstallStep::ClearDir(scratch.clone()),
        InstallStep::Run(
            Invocation::new("tar", "unpack the installer")
                .arg("-zxvf")
                .arg(file.as_str())
                .current_dir(&scratch),
        ),
        InstallStep::CreateDir(install_root.clone()),
        InstallStep::MergeDir {
            src_path: unpacked,
            dest_path: install_root,
        },
    ]
}
