//! NSIS .exe installs, run silently

use camino::Utf8Path;

use super::InstallStep;
use crate::config::Config;
use crate::process::Invocation;

/// Plan the install of an NSIS installer
pub fn plan(config: &Config, file: &Utf8Path) -> Vec<InstallStep> {
    let install_folder = format!("{}\\{}", config.install_root(), config.product_name);
    let install_folder = to_backslashes(&install_folder);
    let file = to_backslashes(file.as_str());

    vec![InstallStep::Run(
        Invocation::new(file, "run the installer")
            .arg("/S")
            .arg(format!("/D={install_folder}")),
    )]
}

fn to_backslashes(path: &str) -> String {
    path.replace('/', "\\")
}
