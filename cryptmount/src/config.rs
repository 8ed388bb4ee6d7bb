// SPDX-License-Identifier: GPL-3.0-only

//! Optional configuration file
//!
//! ```toml
//! mount_options = "-o softdep,noatime"
//!
//! [tools]
//! softraid_device = "softraid0"
//! fsck = "fsck"
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cryptmount_sys::Tools;
use serde::Deserialize;
use tracing::debug;

pub(crate) const DEFAULT_CONFIG_PATH: &str = "/etc/cryptmount.toml";

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    pub mount_options: Option<String>,
    pub tools: Tools,
}

impl Config {
    /// Load `path`, or the default file if it exists.
    ///
    /// A missing default file yields the built-in defaults; a missing file
    /// named explicitly is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound && !explicit => {
                debug!("No config file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("read config {}", path.display()));
            }
        };

        Self::parse(&content).with_context(|| format!("parse config {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
