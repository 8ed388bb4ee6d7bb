// SPDX-License-Identifier: GPL-3.0-only

//! Disk specification types
//!
//! A disk is addressed by its DUID (the disklabel unique identifier) and a
//! partition letter, written `DUID.PART`, e.g. `a3a6acb427840bc0.a`.
//! Kernel device names (`sd0`, `sd3`) are never stored here since they can
//! change between boots.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of hexadecimal characters in a DUID
pub const DUID_LEN: usize = 16;

/// Reasons a `DUID.PART` string is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DiskSpecError {
    #[error("missing partition spec")]
    MissingPartition,

    #[error("too many separators")]
    TooManySeparators,

    #[error("bad DUID length")]
    BadDuidLength,

    #[error("DUID not hexadecimal")]
    DuidNotHex,

    #[error("bad partition spec length")]
    BadPartitionLength,

    #[error("partition is not a letter")]
    PartitionNotLetter,
}

/// A partition on a disk identified by DUID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DiskSpec {
    duid: String,
    partition: char,
}

impl DiskSpec {
    /// Validate and split a `DUID.PART` string.
    pub fn parse(input: &str) -> Result<Self, DiskSpecError> {
        let mut parts = input.split('.');
        let duid = parts.next().unwrap_or_default();
        let partition = parts.next().ok_or(DiskSpecError::MissingPartition)?;
        if parts.next().is_some() {
            return Err(DiskSpecError::TooManySeparators);
        }

        if duid.len() != DUID_LEN {
            return Err(DiskSpecError::BadDuidLength);
        }
        if !duid.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(DiskSpecError::DuidNotHex);
        }

        let mut letters = partition.chars();
        let (Some(letter), None) = (letters.next(), letters.next()) else {
            return Err(DiskSpecError::BadPartitionLength);
        };
        if !letter.is_ascii_lowercase() {
            return Err(DiskSpecError::PartitionNotLetter);
        }

        Ok(Self {
            duid: duid.to_string(),
            partition: letter,
        })
    }

    pub fn duid(&self) -> &str {
        &self.duid
    }

    pub fn partition(&self) -> char {
        self.partition
    }

    /// Partition name on the disk currently known to the kernel as `base`,
    /// e.g. `sd2a` for base `sd2`.
    pub fn device_name(&self, base: &str) -> String {
        format!("{base}{}", self.partition)
    }

    /// Device node path, e.g. `/dev/sd2a` for base `sd2`.
    pub fn device_path(&self, base: &str) -> String {
        format!("/dev/{}", self.device_name(base))
    }
}

impl fmt::Display for DiskSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.duid, self.partition)
    }
}

impl FromStr for DiskSpec {
    type Err = DiskSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DiskSpec {
    type Error = DiskSpecError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DiskSpec> for String {
    fn from(spec: DiskSpec) -> Self {
        spec.to_string()
    }
}
