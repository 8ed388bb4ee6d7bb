// SPDX-License-Identifier: GPL-3.0-only

//! In-memory OpenBSD host used to drive the probes and the orchestrator.
//!
//! It answers `sysctl hw.disknames`, `bioctl softraid0` and `mount` from
//! its state, and applies `bioctl -c/-d`, `fsck`, `mount` and `umount` to
//! that state, recording every command it is asked to run.

#![allow(dead_code)]

use std::cell::RefCell;

use cryptmount_sys::{CommandOutcome, CommandRunner, CommandSpec, CommandStatus, Result};
use cryptmount_types::{DiskSpec, MountRequest};

pub const PHYSICAL_DUID: &str = "e072adf1dcc1be16";
pub const LOGICAL_DUID: &str = "4a9f12a79235b9bd";
pub const PHYSICAL_DEVICE: &str = "sd2";
pub const LOGICAL_DEVICE: &str = "sd3";
pub const TARGET_DIR: &str = "/backup";

pub fn request() -> MountRequest {
    MountRequest::new(
        DiskSpec::parse(&format!("{PHYSICAL_DUID}.a")).expect("valid physical spec"),
        DiskSpec::parse(&format!("{LOGICAL_DUID}.d")).expect("valid logical spec"),
        TARGET_DIR,
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Query(String),
    Mutate(String),
}

#[derive(Debug, Default)]
struct HostState {
    /// `(device, duid)` as reported by `hw.disknames`
    disks: Vec<(String, String)>,
    /// `(logical device, chunk)` crypto volumes
    volumes: Vec<(String, String)>,
    /// `(device path, dir)`
    mounts: Vec<(String, String)>,
    attach_reveals_logical: bool,
    failing: Option<(String, i32)>,
    stderr: Option<(String, String)>,
}

pub struct FakeHost {
    state: RefCell<HostState>,
    calls: RefCell<Vec<Call>>,
}

impl FakeHost {
    /// Physical disk plugged in, nothing attached or mounted.
    pub fn new() -> Self {
        let state = HostState {
            disks: vec![
                ("sd0".to_string(), "0123456789abcdef".to_string()),
                ("cd0".to_string(), String::new()),
                (PHYSICAL_DEVICE.to_string(), PHYSICAL_DUID.to_string()),
            ],
            attach_reveals_logical: true,
            ..HostState::default()
        };
        Self {
            state: RefCell::new(state),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn attached(self) -> Self {
        {
            let mut state = self.state.borrow_mut();
            state.volumes.push((
                LOGICAL_DEVICE.to_string(),
                format!("{PHYSICAL_DEVICE}a"),
            ));
            state
                .disks
                .push((LOGICAL_DEVICE.to_string(), LOGICAL_DUID.to_string()));
        }
        self
    }

    pub fn mounted(self) -> Self {
        let host = self.attached();
        host.state.borrow_mut().mounts.push((
            format!("/dev/{LOGICAL_DEVICE}d"),
            TARGET_DIR.to_string(),
        ));
        host
    }

    pub fn without_physical_disk(self) -> Self {
        self.state
            .borrow_mut()
            .disks
            .retain(|(device, _)| device != PHYSICAL_DEVICE);
        self
    }

    /// Attach succeeds but the logical disk does not show up yet.
    pub fn slow_logical_disk(self) -> Self {
        self.state.borrow_mut().attach_reveals_logical = false;
        self
    }

    /// Commands whose rendered form starts with `prefix` exit with `code`.
    pub fn failing(self, prefix: &str, code: i32) -> Self {
        self.state.borrow_mut().failing = Some((prefix.to_string(), code));
        self
    }

    /// Queries starting with `prefix` succeed but print `text` on stderr.
    pub fn noisy(self, prefix: &str, text: &str) -> Self {
        self.state.borrow_mut().stderr = Some((prefix.to_string(), text.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn mutations(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::Mutate(command) => Some(command.clone()),
                Call::Query(_) => None,
            })
            .collect()
    }

    pub fn queries(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::Query(command) => Some(command.clone()),
                Call::Mutate(_) => None,
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn is_attached(&self) -> bool {
        !self.state.borrow().volumes.is_empty()
    }

    pub fn is_mounted(&self) -> bool {
        !self.state.borrow().mounts.is_empty()
    }

    fn failure_for(&self, rendered: &str) -> Option<i32> {
        let state = self.state.borrow();
        state
            .failing
            .as_ref()
            .filter(|(prefix, _)| rendered.starts_with(prefix.as_str()))
            .map(|(_, code)| *code)
    }

    fn report(&self, spec: &CommandSpec) -> String {
        let state = self.state.borrow();
        match spec.program.as_str() {
            "sysctl" => {
                let entries: Vec<String> = state
                    .disks
                    .iter()
                    .map(|(device, duid)| format!("{device}:{duid}"))
                    .collect();
                format!("hw.disknames={}\n", entries.join(","))
            }
            "bioctl" => {
                let mut out = String::from("Volume      Status               Size Device\n");
                for (index, (logical, chunk)) in state.volumes.iter().enumerate() {
                    out.push_str(&format!(
                        "softraid0 {index} Online      1000202665472 {logical}     CRYPTO\n"
                    ));
                    out.push_str(&format!(
                        "          0 Online      1000202665472 {index}:0.0   noencl <{chunk}>\n"
                    ));
                }
                out
            }
            "mount" => {
                let mut out = String::from("/dev/sd0a on / type ffs (local)\n");
                for (device, dir) in &state.mounts {
                    out.push_str(&format!(
                        "{device} on {dir} type ffs (local, nodev, nosuid, softdep)\n"
                    ));
                }
                out
            }
            other => panic!("unexpected query program {other}"),
        }
    }

    fn apply(&self, spec: &CommandSpec) {
        let mut state = self.state.borrow_mut();
        let args: Vec<&str> = spec.args.iter().map(String::as_str).collect();

        match (spec.program.as_str(), args.as_slice()) {
            ("bioctl", ["-c", "C", "-l", path, _controller]) => {
                let chunk = path.trim_start_matches("/dev/").to_string();
                state.volumes.push((LOGICAL_DEVICE.to_string(), chunk));
                if state.attach_reveals_logical {
                    state
                        .disks
                        .push((LOGICAL_DEVICE.to_string(), LOGICAL_DUID.to_string()));
                }
            }
            ("bioctl", ["-d", logical]) => {
                state.volumes.retain(|(device, _)| device != *logical);
                state.disks.retain(|(device, _)| device != *logical);
            }
            ("fsck", ["-p", _device]) => {}
            ("mount", [.., device, dir]) => {
                state.mounts.push((device.to_string(), dir.to_string()));
            }
            ("umount", [device]) => {
                state.mounts.retain(|(mounted, _)| mounted != *device);
            }
            _ => panic!("unexpected command {spec}"),
        }
    }
}

impl CommandRunner for FakeHost {
    fn capture(&self, spec: &CommandSpec) -> Result<CommandOutcome> {
        let rendered = spec.to_string();
        self.calls.borrow_mut().push(Call::Query(rendered.clone()));

        if let Some(code) = self.failure_for(&rendered) {
            return Ok(CommandOutcome {
                command: rendered,
                status: CommandStatus::exited(code),
                stdout: String::new(),
                stderr: format!("{}: failed", spec.program),
            });
        }

        let stderr = self
            .state
            .borrow()
            .stderr
            .as_ref()
            .filter(|(prefix, _)| rendered.starts_with(prefix.as_str()))
            .map(|(_, text)| text.clone())
            .unwrap_or_default();

        Ok(CommandOutcome {
            stdout: self.report(spec),
            command: rendered,
            status: CommandStatus::SUCCESS,
            stderr,
        })
    }

    fn run_interactive(&self, spec: &CommandSpec) -> Result<CommandStatus> {
        let rendered = spec.to_string();
        self.calls.borrow_mut().push(Call::Mutate(rendered.clone()));

        if let Some(code) = self.failure_for(&rendered) {
            return Ok(CommandStatus::exited(code));
        }

        self.apply(spec);
        Ok(CommandStatus::SUCCESS)
    }
}
