//! .dmg installs: mount, run the package installer, unmount

use camino::Utf8Path;

use super::InstallStep;
use crate::config::Config;
use crate::process::Invocation;

/// Plan the install of a .dmg.
///
/// `session` goes in the mount point name so two installs of the same image
/// don't fight over `/Volumes`.
pub fn plan(config: &Config, file: &Utf8Path, session: u32) -> Vec<InstallStep> {
    let core_name = file.file_stem().unwrap_or(file.as_str());
    let package = config
        .package_name
        .clone()
        .unwrap_or_else(|| format!("{core_name}.mpkg"));
    let mount_point = format!("/Volumes/{core_name}-{session}");

    vec![
        InstallStep::Run(
            Invocation::new("hdiutil", "mount the disk image")
                .args(["attach", "-mountpoint", mount_point.as_str(), file.as_str()]),
        ),
        InstallStep::Run(
            Invocation::new("sudo", "run the package installer").args([
                "installer".to_owned(),
                "-pkg".to_owned(),
                format!("{mount_point}/{package}"),
                "-target".to_owned(),
                "/".to_owned(),
            ]),
        ),
        InstallStep::Run(
            Invocation::new("hdiutil", "unmount the disk image").args(["detach", mount_point.as_str()]),
        ),
    ]
}
