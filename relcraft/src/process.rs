//! Running external programs
//!
//! Everything relcraft does to the outside world (git, cmake, make, hdiutil, ssh...)
//! is described as an [`Invocation`][] first and handed to a [`Runner`][] second.
//! This keeps the "what would we run" logic pure, and lets tests swap in a runner
//! that just records what it was asked to do.

use std::process::{Command, Stdio};

use axoprocess::Cmd;
use camino::{Utf8Path, Utf8PathBuf};
use itertools::Itertools;
use tracing::warn;

use crate::errors::RelResult;

/// A program to run, with everything it needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// The program (looked up on PATH if not a path)
    pub program: String,
    /// Arguments, one per argv entry
    pub args: Vec<String>,
    /// Directory to run in (inherited if None)
    pub cwd: Option<Utf8PathBuf>,
    /// Extra environment variables
    pub env: Vec<(String, String)>,
    /// What this is trying to do, for errors ("failed to {summary}")
    pub summary: String,
    /// A non-zero exit is logged and otherwise ignored
    pub tolerate_failure: bool,
}

impl Invocation {
    /// Start describing a run of `program`
    pub fn new(program: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: vec![],
            cwd: None,
            env: vec![],
            summary: summary.into(),
            tolerate_failure: false,
        }
    }

    /// Add an argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run in this directory
    pub fn current_dir(mut self, dir: impl AsRef<Utf8Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    /// Set an environment variable
    pub fn env(mut self, key: impl Into<String>, val: impl Into<String>) -> Self {
        self.env.push((key.into(), val.into()));
        self
    }

    /// Don't abort if this exits non-zero
    pub fn tolerate_failure(mut self) -> Self {
        self.tolerate_failure = true;
        self
    }

    /// The command line, roughly as a shell would show it
    pub fn render(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|part| {
                if part.is_empty() || part.contains(char::is_whitespace) {
                    format!("\"{part}\"")
                } else {
                    part.clone()
                }
            })
            .join(" ")
    }

    fn to_cmd(&self) -> Cmd {
        let mut cmd = Cmd::new(&self.program, &self.summary);
        cmd.envs(self.env.iter().map(|(k, v)| (k, v)));
        for arg in &self.args {
            cmd.arg(arg);
        }
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }
        cmd
    }
}

/// Something that can run [`Invocation`][]s
pub trait Runner {
    /// Run to completion, failing on a non-zero exit
    fn run_checked(&mut self, invocation: &Invocation) -> RelResult<()>;

    /// Run to completion, returning whether it exited zero
    fn run_unchecked(&mut self, invocation: &Invocation) -> RelResult<bool>;

    /// Run and return trimmed stdout, or None if it exited non-zero
    fn probe(&mut self, invocation: &Invocation) -> RelResult<Option<String>>;

    /// Run and return trimmed stdout, failing on a non-zero exit
    fn capture(&mut self, invocation: &Invocation) -> RelResult<String>;

    /// Run, honouring [`Invocation::tolerate_failure`][]
    fn run(&mut self, invocation: &Invocation) -> RelResult<()> {
        if !invocation.tolerate_failure {
            return self.run_checked(invocation);
        }
        if !self.run_unchecked(invocation)? {
            warn!("ignoring failure of `{}`", invocation.render());
        }
        Ok(())
    }

    /// Run several in order, stopping at the first failure
    fn run_all(&mut self, invocations: &[Invocation]) -> RelResult<()> {
        for invocation in invocations {
            self.run(invocation)?;
        }
        Ok(())
    }
}

/// Runs things for real
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl Runner for SystemRunner {
    fn run_checked(&mut self, invocation: &Invocation) -> RelResult<()> {
        invocation.to_cmd().run()?;
        Ok(())
    }

    fn run_unchecked(&mut self, invocation: &Invocation) -> RelResult<bool> {
        let status = invocation.to_cmd().check(false).status()?;
        Ok(status.success())
    }

    fn probe(&mut self, invocation: &Invocation) -> RelResult<Option<String>> {
        let mut cmd = invocation.to_cmd();
        cmd.stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .check(false);
        let output = cmd.output()?;
        if !output.status.success() {
            return Ok(None);
        }
        let stdout = String::from_utf8(output.stdout)?;
        Ok(Some(stdout.trim().to_owned()))
    }

    fn capture(&mut self, invocation: &Invocation) -> RelResult<String> {
        let mut cmd = invocation.to_cmd();
        cmd.stdout(Stdio::piped());
        let output = cmd.output()?;
        let stdout = String::from_utf8(output.stdout)?;
        Ok(stdout.trim().to_owned())
    }
}

/// A tool we found on the system
#[derive(Debug, Clone)]
pub struct Tool {
    /// The string to pass to Cmd::new
    pub cmd: String,
    /// The version the tool reported (in case useful)
    pub version: String,
}

/// Look for a tool by asking it for its version
pub fn find_tool(name: &str, version_flag: &str) -> Option<Tool> {
    let output = Command::new(name)
        .arg(version_flag)
        .stderr(Stdio::null())
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let string_output = String::from_utf8(output.stdout).ok()?;
    let version = string_output.lines().next()?;
    Some(Tool {
        cmd: name.to_owned(),
        version: version.to_owned(),
    })
}

/// Whether a working ninja is on PATH
pub fn ninja_on_path() -> bool {
    find_tool("ninja", "--version").is_some()
}

/// Wraps another [`Runner`][] and remembers the command lines it ran
pub struct Transcript<'a> {
    inner: &'a mut dyn Runner,
    /// Rendered command lines, in order
    pub commands: Vec<String>,
}

impl<'a> Transcript<'a> {
    /// Start recording what `inner` runs
    pub fn new(inner: &'a mut dyn Runner) -> Self {
        Self {
            inner,
            commands: vec![],
        }
    }
}

impl Runner for Transcript<'_> {
    fn run_checked(&mut self, invocation: &Invocation) -> RelResult<()> {
        self.commands.push(invocation.render());
        self.inner.run_checked(invocation)
    }

    fn run_unchecked(&mut self, invocation: &Invocation) -> RelResult<bool> {
        self.commands.push(invocation.render());
        self.inner.run_unchecked(invocation)
    }

    fn probe(&mut self, invocation: &Invocation) -> RelResult<Option<String>> {
        self.inner.probe(invocation)
    }

    fn capture(&mut self, invocation: &Invocation) -> RelResult<String> {
        self.inner.capture(invocation)
    }
}
