// SPDX-License-Identifier: GPL-3.0-only

//! External command lines
//!
//! Program names are configurable so the tools can be wrapped (e.g. with
//! `doas`-style shims) without touching the orchestration code.

use serde::{Deserialize, Serialize};

use crate::command::CommandSpec;

/// Names of the programs used to query and change the system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tools {
    pub sysctl: String,
    pub bioctl: String,
    pub mount: String,
    pub umount: String,
    pub fsck: String,
    /// Softraid controller the crypto volumes live on
    pub softraid_device: String,
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            sysctl: "sysctl".to_string(),
            bioctl: "bioctl".to_string(),
            mount: "mount".to_string(),
            umount: "umount".to_string(),
            fsck: "fsck".to_string(),
            softraid_device: "softraid0".to_string(),
        }
    }
}

impl Tools {
    /// `sysctl hw.disknames`
    pub fn disknames(&self) -> CommandSpec {
        CommandSpec::new(&self.sysctl, ["hw.disknames"])
    }

    /// `bioctl softraid0`
    pub fn softraid_status(&self) -> CommandSpec {
        CommandSpec::new(&self.bioctl, [self.softraid_device.as_str()])
    }

    /// `bioctl -c C -l /dev/sd2a softraid0`
    pub fn attach(&self, physical_path: &str) -> CommandSpec {
        CommandSpec::new(
            &self.bioctl,
            ["-c", "C", "-l", physical_path, self.softraid_device.as_str()],
        )
    }

    /// `bioctl -d sd3`
    pub fn detach(&self, logical_device: &str) -> CommandSpec {
        CommandSpec::new(&self.bioctl, ["-d", logical_device])
    }

    /// `mount` with no arguments lists the mount table
    pub fn mount_table(&self) -> CommandSpec {
        CommandSpec::new(&self.mount, Vec::<String>::new())
    }

    /// `mount -o softdep /dev/sd3a /backup`
    pub fn mount(&self, options: &[String], device_path: &str, dir: &str) -> CommandSpec {
        let args = options
            .iter()
            .cloned()
            .chain([device_path.to_string(), dir.to_string()]);
        CommandSpec::new(&self.mount, args)
    }

    /// `umount /dev/sd3a`
    pub fn unmount(&self, device_path: &str) -> CommandSpec {
        CommandSpec::new(&self.umount, [device_path])
    }

    /// `fsck -p /dev/sd3a`
    pub fn fsck(&self, device_path: &str) -> CommandSpec {
        CommandSpec::new(&self.fsck, ["-p", device_path])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_command_lines() {
        let tools = Tools::default();
        assert_eq!(tools.disknames().to_string(), "sysctl hw.disknames");
        assert_eq!(tools.softraid_status().to_string(), "bioctl softraid0");
        assert_eq!(
            tools.attach("/dev/sd2a").to_string(),
            "bioctl -c C -l /dev/sd2a softraid0"
        );
        assert_eq!(tools.detach("sd3").to_string(), "bioctl -d sd3");
        assert_eq!(tools.mount_table().to_string(), "mount");
        assert_eq!(
            tools
                .mount(&["-o".into(), "softdep".into()], "/dev/sd3a", "/backup")
                .to_string(),
            "mount -o softdep /dev/sd3a /backup"
        );
        assert_eq!(tools.unmount("/dev/sd3a").to_string(), "umount /dev/sd3a");
        assert_eq!(tools.fsck("/dev/sd3a").to_string(), "fsck -p /dev/sd3a");
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let tools: Tools = toml::from_str("softraid_device = \"softraid1\"").expect("valid toml");
        assert_eq!(tools.softraid_device, "softraid1");
        assert_eq!(tools.bioctl, "bioctl");
        assert_eq!(tools.softraid_status().to_string(), "bioctl softraid1");
    }
}
