//! Details for the git checkout of the product

use camino::{Utf8Path, Utf8PathBuf};
use tracing::info;

use crate::config::Config;
use crate::errors::{RelResult, RelcraftError};
use crate::process::{Invocation, Runner};

/// A git checkout we run commands in
#[derive(Clone, Debug)]
pub struct GitRepo {
    /// The checkout's path on disk
    pub path: Utf8PathBuf,
}

impl GitRepo {
    /// A checkout at `path` (which may not exist yet, see [`GitRepo::clone_from`][])
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The product's checkout
    pub fn for_config(config: &Config) -> Self {
        Self::new(config.source_dir.clone())
    }

    fn git(&self, summary: &str) -> Invocation {
        Invocation::new("git", summary).current_dir(&self.path)
    }

    /// `git clone <repository> [<folder>]`, run in `parent`
    pub fn clone_from(
        runner: &mut dyn Runner,
        parent: &Utf8Path,
        repository: &str,
        folder: Option<&str>,
    ) -> RelResult<Self> {
        let mut clone = Invocation::new("git", "clone the repository")
            .arg("clone")
            .arg(repository)
            .current_dir(parent);
        if let Some(folder) = folder {
            clone = clone.arg(folder);
        }
        runner.run(&clone)?;
        let name = folder.unwrap_or_else(|| repo_dir_name(repository));
        Ok(Self::new(parent.join(name)))
    }

    /// Point origin somewhere else and track `branch` there
    pub fn set_remote_url(&self, runner: &mut dyn Runner, url: &str, branch: &str) -> RelResult<()> {
        runner.run_all(&[
            self.git("change the origin remote")
                .args(["remote", "set-url", "origin", url]),
            self.git("fetch from origin").arg("fetch"),
            self.git("set the upstream branch").args([
                "branch".to_owned(),
                "--set-upstream-to".to_owned(),
                format!("origin/{branch}"),
                branch.to_owned(),
            ]),
        ])
    }

    /// Check out the configured tag, or failing that the main branch
    pub fn checkout_default(
        &self,
        runner: &mut dyn Runner,
        config: &Config,
        submodules: bool,
    ) -> RelResult<()> {
        match &config.git_tag {
            Some(tag) => self.checkout_tag(runner, tag, submodules),
            None if config.main_branch.is_empty() => {
                info!("no tag or branch configured, leaving {} alone", self.path);
                Ok(())
            }
            None => self.checkout_branch(runner, &config.main_branch, submodules),
        }
    }

    /// Check out and pull `branch`.
    ///
    /// Not every repo has every branch, so the checkout and pull are allowed to fail.
    pub fn checkout_branch(
        &self,
        runner: &mut dyn Runner,
        branch: &str,
        submodules: bool,
    ) -> RelResult<()> {
        runner.run_all(&[
            self.git("fetch from origin").arg("fetch"),
            self.git("check out the branch")
                .args(["checkout", branch])
                .tolerate_failure(),
            self.git("pull the branch")
                .args(["pull", "origin", branch])
                .tolerate_failure(),
        ])?;
        if submodules {
            self.update_submodules(runner)?;
        }
        Ok(())
    }

    /// Check out `tag`, unless HEAD is already there
    pub fn checkout_tag(&self, runner: &mut dyn Runner, tag: &str, submodules: bool) -> RelResult<()> {
        if self.exact_tag(runner)?.as_deref() == Some(tag) {
            info!("skipping git update: tag {tag} already at HEAD in {}", self.path);
            return Ok(());
        }
        runner.run_all(&[
            self.git("fetch from origin").arg("fetch"),
            self.git("check out the tag").args(["checkout", tag]),
        ])?;
        if submodules {
            self.update_submodules(runner)?;
        }
        Ok(())
    }

    /// Sync and update submodules, recursively
    pub fn update_submodules(&self, runner: &mut dyn Runner) -> RelResult<()> {
        runner.run_all(&[
            self.git("sync submodules").args(["submodule", "sync"]),
            self.git("update submodules")
                .args(["submodule", "update", "--init", "--recursive"]),
        ])
    }

    /// Drop local tags that origin doesn't have any more
    pub fn refresh_tags(&self, runner: &mut dyn Runner) -> RelResult<()> {
        runner.run(
            &self
                .git("refresh tags from origin")
                .args(["fetch", "origin", "--prune", "--tags"]),
        )
    }

    /// The tag HEAD is exactly at, if any
    pub fn exact_tag(&self, runner: &mut dyn Runner) -> RelResult<Option<String>> {
        let tag = runner.probe(
            &self
                .git("check for a tag at HEAD")
                .args(["describe", "--tags", "--exact-match"]),
        )?;
        Ok(tag.filter(|tag| !tag.is_empty()))
    }

    /// The nearest tag plus distance and hash, e.g. `v15-04-245-gabc123`
    pub fn describe(&self, runner: &mut dyn Runner) -> RelResult<String> {
        let desc = runner.capture(&self.git("describe HEAD").args(["describe", "--tags"]))?;
        if desc.is_empty() {
            return Err(RelcraftError::EmptyDescribe {
                dir: self.path.clone(),
            });
        }
        Ok(desc)
    }
}

/// The folder `git clone <repository>` creates
fn repo_dir_name(repository: &str) -> &str {
    let last = repository
        .trim_end_matches('/')
        .rsplit(['/', ':'])
        .next()
        .unwrap_or(repository);
    last.strip_suffix(".git").unwrap_or(last)
}
