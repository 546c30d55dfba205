//! Naming releases after the state of the git checkout

use camino::Utf8PathBuf;
use chrono::{Local, NaiveDate};
use tracing::info;

use crate::errors::RelResult;
use crate::process::Runner;
use crate::vcs::GitRepo;

/// What a release is called
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseIdentity {
    /// The exact tag HEAD is at, if any
    pub tag_name: Option<String>,
    /// The nearest-tag descriptor, when HEAD isn't at a tag
    pub describe: Option<String>,
    /// HEAD isn't exactly at a tag
    pub is_dirty: bool,
    /// The name the release is filed under
    pub resolved_name: String,
}

impl ReleaseIdentity {
    /// A release exactly at `tag`
    pub fn tagged(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        Self {
            resolved_name: tag.clone(),
            tag_name: Some(tag),
            describe: None,
            is_dirty: false,
        }
    }

    /// A release somewhere past a tag, built on `date`
    pub fn dirty(describe: impl Into<String>, date: NaiveDate) -> Self {
        let describe = describe.into();
        Self {
            resolved_name: format!("{}.{describe}-dirty", date.format("%Y-%m-%d")),
            tag_name: None,
            describe: Some(describe),
            is_dirty: true,
        }
    }

    /// `{base}/Release/{product}_{resolved_name}`.
    ///
    /// This only builds the path, it doesn't create anything.
    pub fn release_folder_path(&self, base: &str, product: &str) -> Utf8PathBuf {
        Utf8PathBuf::from(format!("{base}/Release/{product}_{}", self.resolved_name))
    }
}

/// Works out [`ReleaseIdentity`][]s for a checkout
pub struct VersionNamer<'a> {
    repo: &'a GitRepo,
}

impl<'a> VersionNamer<'a> {
    /// Name releases of this checkout
    pub fn new(repo: &'a GitRepo) -> Self {
        Self { repo }
    }

    /// Prune local tags origin no longer has. Do this before asking about tags.
    pub fn refresh_tags(&self, runner: &mut dyn Runner) -> RelResult<()> {
        self.repo.refresh_tags(runner)
    }

    /// Refresh tags, then work out the identity of HEAD as of today
    pub fn resolve_release_identity(&self, runner: &mut dyn Runner) -> RelResult<ReleaseIdentity> {
        self.refresh_tags(runner)?;
        self.resolve_release_identity_on(runner, Local::now().date_naive())
    }

    /// Work out the identity of HEAD, dating dirty releases with `today`.
    ///
    /// This asks git every time, nothing is remembered between calls.
    pub fn resolve_release_identity_on(
        &self,
        runner: &mut dyn Runner,
        today: NaiveDate,
    ) -> RelResult<ReleaseIdentity> {
        let identity = match self.repo.exact_tag(runner)? {
            Some(tag) => ReleaseIdentity::tagged(tag),
            None => ReleaseIdentity::dirty(self.repo.describe(runner)?, today),
        };
        info!("release name: {}", identity.resolved_name);
        Ok(identity)
    }
}
