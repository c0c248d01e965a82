//! Build configuration
//!
//! [`BuildOptions`] is what a build call takes. [`PackConfig`] is its on-disk
//! form, a small TOML document:
//!
//! ```toml
//! [pack]
//! version = "1.0.0"
//! base_dir = "assets"
//!
//! [log]
//! console = true
//! debug_output = false
//! ```
//!
//! A relative `base_dir` is taken relative to the config file. When set, it
//! replaces the manifest's own directory as the root for relative locators.

use crate::error::{ArchiveError, Result};
use crate::header::PackVersion;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Which library events are emitted through `tracing`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Lifecycle events (archive built, archive opened) at info level
    pub console: bool,

    /// Per-entry events at debug level
    pub debug_output: bool,
}

impl LogConfig {
    /// No events at all
    pub fn silent() -> Self {
        LogConfig {
            console: false,
            debug_output: false,
        }
    }

    /// Lifecycle and per-entry events
    pub fn verbose() -> Self {
        LogConfig {
            console: true,
            debug_output: true,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            console: true,
            debug_output: false,
        }
    }
}

/// Options for building or opening an archive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
    pub version: PackVersion,
    pub log: LogConfig,
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(mut self, version: PackVersion) -> Self {
        self.version = version;
        self
    }

    pub fn with_log(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackSection {
    /// Semver string; each component must fit in a byte
    pub version: Option<String>,

    /// Directory relative locators resolve against
    pub base_dir: Option<PathBuf>,
}

/// TOML configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackConfig {
    pub pack: PackSection,
    pub log: LogConfig,
}

impl PackConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read a config file, anchoring a relative `base_dir` at its directory
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&text)?;

        if let (Some(base_dir), Some(parent)) = (config.pack.base_dir.as_mut(), path.parent()) {
            if base_dir.is_relative() {
                *base_dir = parent.join(&*base_dir);
            }
        }
        Ok(config)
    }

    /// Pack version named by the config, or the current version
    pub fn version(&self) -> Result<PackVersion> {
        match &self.pack.version {
            Some(text) => {
                let parsed = semver::Version::parse(text)
                    .map_err(|_| ArchiveError::InvalidVersion(text.clone()))?;
                PackVersion::try_from(&parsed)
            }
            None => Ok(PackVersion::current()),
        }
    }

    pub fn build_options(&self) -> Result<BuildOptions> {
        Ok(BuildOptions::new()
            .with_version(self.version()?)
            .with_log(self.log))
    }
}
