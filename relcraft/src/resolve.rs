//! Turning a [`BuildConfig`][] into names and cmake/make command lines
//!
//! Everything in here is pure: it computes what should be run and never runs it.
//! The `Config::{reset, configure, build, clean}` operations at the bottom are the
//! only bits that touch the outside world, and they do it through a [`Runner`][].

use std::collections::BTreeMap;

use axoasset::LocalAsset;
use camino::Utf8PathBuf;
use itertools::Itertools;
use tracing::info;

use crate::config::{BuildConfig, BuildType, Config, GeneratorChoice};
use crate::errors::{RelResult, RelcraftError};
use crate::process::{Invocation, Runner};

/// Generator id for an Xcode project
pub const XCODE_GENERATOR: &str = "Xcode";
/// Generator id for jom
pub const JOM_GENERATOR: &str = "NMake Makefiles JOM";
/// Generator id for ninja
pub const NINJA_GENERATOR: &str = "Eclipse CDT4 - Ninja";

impl BuildConfig {
    /// The name of the folder this configuration builds in, e.g. `build_Release_static32`.
    ///
    /// With short pathnames every token with a short form uses it (`b_Release_s32`).
    pub fn build_folder_name(&self) -> String {
        let short = self.short_pathnames;
        let pick = |long: &'static str, abbrev: &'static str| if short { abbrev } else { long };

        let mut tokens = vec![pick("build", "b").to_owned(), self.build_type.to_string()];
        if self.is_static {
            tokens.push(pick("static", "s").to_owned());
        }
        if self.is_32_bit {
            // glued onto whatever came before, no separator
            if let Some(last) = tokens.last_mut() {
                last.push_str("32");
            }
        }
        match self.generator {
            GeneratorChoice::Xcode => tokens.push(pick("xcode", "x").to_owned()),
            GeneratorChoice::Jom => tokens.push(pick("jom", "j").to_owned()),
            GeneratorChoice::Make | GeneratorChoice::Ninja => {}
        }
        tokens.join("_")
    }

    /// The cmake generator name to pass to `-G`
    pub fn generator_identifier(&self) -> RelResult<&'static str> {
        self.generator.check_supported(self.platform)?;
        Ok(match self.generator {
            GeneratorChoice::Xcode => XCODE_GENERATOR,
            GeneratorChoice::Jom => JOM_GENERATOR,
            GeneratorChoice::Ninja => NINJA_GENERATOR,
            GeneratorChoice::Make => self.platform.caps().default_generator,
        })
    }

    /// Build type for third party libraries.
    ///
    /// Windows can't link debug and release objects together, so there it follows
    /// the main build. Everywhere else externals are always Release.
    pub fn build_externals_type(&self) -> BuildType {
        if self.platform.is_windows() {
            self.build_type
        } else {
            BuildType::Release
        }
    }

    /// The options we always pass to cmake
    pub fn baseline_cmake_options(&self) -> Vec<(String, String)> {
        let caps = self.platform.caps();
        let mut opts = vec![];
        let mut add = |key: &str, val: &str| opts.push((key.to_owned(), val.to_owned()));
        if caps.quiet_deprecation_warnings {
            add("CMAKE_CXX_FLAGS:STRING", "-Wno-deprecated");
        }
        add("CMAKE_BUILD_TYPE:STRING", self.build_type.as_str());
        if self.is_32_bit && caps.needs_32_bit_arch_flag {
            add("CMAKE_OSX_ARCHITECTURES", "i386");
        }
        add(
            "BUILD_SHARED_LIBS:BOOL",
            if self.is_static { "OFF" } else { "ON" },
        );
        add("CMAKE_ECLIPSE_VERSION", self.eclipse_version.as_str());
        add("CMAKE_ECLIPSE_GENERATE_LINKED_RESOURCES", "OFF");
        opts
    }

    /// Baseline options with `overrides` layered on top.
    ///
    /// An override replaces a baseline option with the same name, whether or not
    /// either of them spells out a `:TYPE` suffix.
    pub fn resolve_cmake_options(
        &self,
        overrides: &BTreeMap<String, String>,
    ) -> BTreeMap<String, String> {
        let mut opts: BTreeMap<String, String> = self.baseline_cmake_options().into_iter().collect();
        for (key, val) in overrides {
            let name = option_name(key);
            opts.retain(|existing, _| option_name(existing) != name);
            opts.insert(key.clone(), val.clone());
        }
        opts
    }

    /// Baseline options with this config's own overrides on top
    pub fn cmake_options(&self) -> BTreeMap<String, String> {
        self.resolve_cmake_options(&self.cmake_overrides)
    }
}

/// `CMAKE_BUILD_TYPE:STRING` => `CMAKE_BUILD_TYPE`
fn option_name(key: &str) -> &str {
    key.split_once(':').map_or(key, |(name, _ty)| name)
}

/// Parse a `KEY=VALUE` cmake option from the command line
pub fn parse_cmake_option(raw: &str) -> RelResult<(String, String)> {
    match raw.split_once('=') {
        Some((key, val)) if !key.is_empty() => Ok((key.to_owned(), val.to_owned())),
        _ => Err(RelcraftError::MalformedCmakeOption {
            option: raw.to_owned(),
        }),
    }
}

impl Config {
    /// `cmake -G <generator> <extra args> -D<k>=<v>... <source>`, run in the build dir
    pub fn configure_invocation(&self, extra_args: &[String]) -> RelResult<Invocation> {
        let generator = self.build.generator_identifier()?;
        let defines = self
            .build
            .cmake_options()
            .into_iter()
            .map(|(key, val)| format!("-D{key}={val}"));
        Ok(Invocation::new("cmake", "configure with cmake")
            .arg("-G")
            .arg(generator)
            .args(extra_args.iter().cloned())
            .args(defines)
            .arg(self.source_dir.as_str())
            .current_dir(&self.build_dir))
    }

    /// Whatever drives the generated build files
    pub fn build_invocation(&self) -> RelResult<Invocation> {
        self.build.generator_identifier()?;
        let threads = self.build.threads.to_string();
        let inv = match (self.build.platform.is_windows(), self.build.generator) {
            (_, GeneratorChoice::Xcode) => Invocation::new("cmake", "build the xcode project")
                .args(["--build", ".", "--config", self.build.build_type.as_str()]),
            (true, GeneratorChoice::Jom) => Invocation::new("jom", "build with jom")
                .arg("-k")
                .arg(format!("-j{threads}")),
            (true, GeneratorChoice::Ninja) => Invocation::new("ninja", "build with ninja"),
            (true, _) => Invocation::new("nmake", "build with nmake"),
            (false, generator) => {
                let inv = if generator == GeneratorChoice::Ninja {
                    Invocation::new("ninja", "build with ninja")
                } else {
                    Invocation::new("make", "build with make").arg(format!("-j{threads}"))
                };
                inv.env("DYLD_LIBRARY_PATH", self.build_dir.join("bin").as_str())
            }
        };
        Ok(inv.current_dir(&self.build_dir))
    }

    /// Whatever cleans the generated build files
    pub fn clean_invocation(&self) -> RelResult<Invocation> {
        self.build.generator_identifier()?;
        let inv = match (self.build.platform.is_windows(), self.build.generator) {
            (_, GeneratorChoice::Xcode) => Invocation::new("cmake", "clean the xcode project")
                .args(["--build", ".", "--target", "clean"]),
            (_, GeneratorChoice::Ninja) => {
                Invocation::new("ninja", "clean with ninja").args(["-t", "clean"])
            }
            (true, GeneratorChoice::Jom) => Invocation::new("jom", "clean with jom").arg("-clean"),
            (true, _) => Invocation::new("nmake", "clean with nmake").arg("-clean"),
            (false, _) => Invocation::new("make", "clean with make").arg("clean"),
        };
        Ok(inv.current_dir(&self.build_dir))
    }

    /// Delete the build dir
    pub fn reset(&self) -> RelResult<Utf8PathBuf> {
        info!("removing {}", self.build_dir);
        LocalAsset::remove_dir_all(&self.build_dir)?;
        Ok(self.build_dir.clone())
    }

    /// Run cmake in the build dir, creating it if needed
    pub fn configure(
        &self,
        runner: &mut dyn Runner,
        extra_args: &[String],
    ) -> RelResult<Invocation> {
        // validate before touching the disk
        let invocation = self.configure_invocation(extra_args)?;
        let opts = self.build.cmake_options();
        info!(
            "cmake options:\n{}",
            opts.iter()
                .map(|(key, val)| format!("    {key} = {val}"))
                .join("\n")
        );
        LocalAsset::create_dir_all(&self.build_dir)?;
        runner.run(&invocation)?;
        Ok(invocation)
    }

    /// Build in the build dir
    pub fn build(&self, runner: &mut dyn Runner) -> RelResult<Invocation> {
        let invocation = self.build_invocation()?;
        runner.run(&invocation)?;
        Ok(invocation)
    }

    /// Clean the build dir
    pub fn clean(&self, runner: &mut dyn Runner) -> RelResult<Invocation> {
        let invocation = self.clean_invocation()?;
        runner.run(&invocation)?;
        Ok(invocation)
    }
}
