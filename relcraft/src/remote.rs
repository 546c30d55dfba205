//! Copying things to another machine with ssh/scp

use camino::{Utf8Path, Utf8PathBuf};
use tracing::info;
use walkdir::WalkDir;

use crate::config::RemoteTarget;
use crate::errors::{RelResult, RelcraftError};
use crate::process::{Invocation, Runner};

/// Transfers to one remote server
pub struct RemoteTransfer<'a> {
    target: &'a RemoteTarget,
}

impl<'a> RemoteTransfer<'a> {
    /// Talk to `target`'s server
    pub fn new(target: &'a RemoteTarget) -> Self {
        Self { target }
    }

    fn ssh(&self, summary: &str) -> Invocation {
        Invocation::new("ssh", summary)
            .args(["-o", "BatchMode=yes"])
            .arg(self.target.login())
    }

    /// `ssh` in and do nothing, to see if we can
    pub fn check_connection(&self, runner: &mut dyn Runner) -> RelResult<()> {
        runner
            .run_checked(&self.ssh("connect to the server").arg("true"))
            .map_err(|details| RelcraftError::RemoteConnect {
                server: self.target.login(),
                details: Box::new(details),
            })
    }

    /// Copy every top-level entry of `source` into `remote_path`,
    /// creating `remote_path` first. Returns the names of what was copied.
    pub fn copy_folder_contents(
        &self,
        runner: &mut dyn Runner,
        source: &Utf8Path,
        remote_path: &str,
    ) -> RelResult<Vec<String>> {
        let copy_error = |details: RelcraftError| RelcraftError::RemoteCopy {
            source_path: source.to_owned(),
            server: self.target.login(),
            remote_path: remote_path.to_owned(),
            details: Box::new(details),
        };

        self.check_connection(runner)?;
        runner
            .run_checked(
                &self
                    .ssh("create the remote folder")
                    .args(["mkdir", "-p", remote_path]),
            )
            .map_err(copy_error)?;

        let entries = top_level_entries(source)?;
        for entry in &entries {
            info!("copying {entry} to {}:{remote_path}", self.target.server);
            runner
                .run_checked(
                    &Invocation::new("scp", "copy to the server")
                        .args(["-r", "-o", "BatchMode=yes"])
                        .arg(entry.as_str())
                        .arg(format!("{}:{remote_path}/", self.target.login())),
                )
                .map_err(copy_error)?;
        }
        Ok(entries
            .iter()
            .filter_map(|entry| entry.file_name().map(str::to_owned))
            .collect())
    }
}

/// The immediate children of `dir`, sorted by name
fn top_level_entries(dir: &Utf8Path) -> RelResult<Vec<Utf8PathBuf>> {
    let mut entries = vec![];
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|details| RelcraftError::WalkDir {
            dir: dir.to_owned(),
            details,
        })?;
        let path = Utf8PathBuf::from_path_buf(entry.into_path())
            .map_err(|path| RelcraftError::NonUtf8Path { path })?;
        entries.push(path);
    }
    Ok(entries)
}
