// SPDX-License-Identifier: GPL-3.0-only

//! Attach/check/mount and unmount/detach sequences
//!
//! Both sequences observe the system once, derive the current [`Stage`]
//! from it and then walk the stage machine one transition at a time.
//! Steps that are already done are never run, which makes both sequences
//! safe to repeat. A transition is checked against the machine before its
//! command runs and only recorded once the command succeeded. A failed
//! step ends the sequence; earlier steps are not rolled back, so a disk
//! that attached but failed its check stays attached for inspection.

use cryptmount_types::{AttachmentState, MountRequest, MountState, Stage, Transition};
use tracing::{debug, info, warn};

use crate::command::{CommandRunner, CommandSpec};
use crate::error::{Result, SysError};
use crate::probe::Probe;
use crate::tools::Tools;

/// Picks the next transition from a stage, `None` when the sequence is done
type Step = fn(Stage) -> Option<Transition>;

/// Where a sequence ended and which mutating steps it ran
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceOutcome {
    pub stage: Stage,
    pub performed: Vec<Transition>,
}

impl SequenceOutcome {
    fn starting_at(stage: Stage) -> Self {
        Self {
            stage,
            performed: Vec::new(),
        }
    }

    fn commit(&mut self, transition: Transition, next: Stage) {
        self.stage = next;
        self.performed.push(transition);
    }

    /// True when nothing had to change.
    pub fn was_noop(&self) -> bool {
        self.performed.is_empty()
    }
}

/// Drives one physical/logical disk pair through its stages
pub struct Orchestrator<R> {
    runner: R,
    tools: Tools,
}

impl<R: CommandRunner> Orchestrator<R> {
    pub fn new(runner: R, tools: Tools) -> Self {
        Self { runner, tools }
    }

    pub fn probe(&self) -> Probe<'_, R> {
        Probe::new(&self.runner, &self.tools)
    }

    /// Attach the physical partition, check the logical filesystem and
    /// mount it on the target directory.
    pub fn mount(&self, request: &MountRequest) -> Result<SequenceOutcome> {
        let probe = self.probe();
        let (attachment, mount_state) = observe(&probe, request)?;

        if let AttachmentState::Attached { logical_device } = &attachment {
            warn!(
                "attach softraid: {} is already attached as {}",
                request.physical, logical_device
            );
        }
        // A mounted filesystem must not be checked.
        if mount_state.is_mounted() {
            warn!(
                "mount filesystem: {} is already mounted on {}, skipping fsck",
                request.logical, request.target_dir
            );
        }

        let start = Stage::observed(&attachment, mount_state);
        let outcome = self.drive(&probe, request, &attachment, start, Stage::mount_step)?;

        if !outcome.was_noop() {
            info!(
                "{} mounted on {} via {}",
                request.logical, request.target_dir, request.physical
            );
        }
        Ok(outcome)
    }

    /// Unmount the logical filesystem, then detach the physical partition.
    pub fn unmount(&self, request: &MountRequest) -> Result<SequenceOutcome> {
        let probe = self.probe();
        let (attachment, mount_state) = observe(&probe, request)?;

        if !mount_state.is_mounted() {
            warn!(
                "unmount filesystem: {} is already unmounted from {}",
                request.logical, request.target_dir
            );
        }
        if !attachment.is_attached() {
            warn!("detach softraid: {} is already detached", request.physical);
        }

        let start = Stage::observed(&attachment, mount_state);
        self.drive(&probe, request, &attachment, start, Stage::unmount_step)
    }

    /// Walk from `start` until `step` has nothing left to do.
    fn drive(
        &self,
        probe: &Probe<'_, R>,
        request: &MountRequest,
        attachment: &AttachmentState,
        start: Stage,
        step: Step,
    ) -> Result<SequenceOutcome> {
        let mut outcome = SequenceOutcome::starting_at(start);

        while let Some(transition) = step(outcome.stage) {
            let next = outcome.stage.apply(transition)?;
            let spec = self.command_for(transition, probe, request, attachment)?;
            self.perform(transition, spec)?;
            outcome.commit(transition, next);
        }

        Ok(outcome)
    }

    /// Command line for `transition`, resolving device paths just before use.
    fn command_for(
        &self,
        transition: Transition,
        probe: &Probe<'_, R>,
        request: &MountRequest,
        attachment: &AttachmentState,
    ) -> Result<CommandSpec> {
        let spec = match transition {
            Transition::Attach => self.tools.attach(&probe.require(&request.physical)?),
            Transition::Check => self.tools.fsck(&probe.require(&request.logical)?),
            Transition::Mount => self.tools.mount(
                &request.mount_option_args(),
                &probe.require(&request.logical)?,
                &request.target_dir,
            ),
            Transition::Unmount => self.tools.unmount(&probe.require(&request.logical)?),
            // Mounted but no longer attached through this physical disk.
            Transition::Detach => match attachment.logical_device() {
                Some(logical_device) => self.tools.detach(logical_device),
                None => return Err(SysError::DiskNotPresent(request.physical.clone())),
            },
        };
        Ok(spec)
    }

    fn perform(&self, transition: Transition, spec: CommandSpec) -> Result<()> {
        info!("{}: '{}'", transition, spec);

        let status = self.runner.run_interactive(&spec)?;
        if !status.success() {
            return Err(SysError::StageFailed {
                transition,
                command: spec.to_string(),
                status,
            });
        }

        Ok(())
    }
}

fn observe<R: CommandRunner + ?Sized>(
    probe: &Probe<'_, R>,
    request: &MountRequest,
) -> Result<(AttachmentState, MountState)> {
    let attachment = probe.attachment(&request.physical)?;
    let mount_state = probe.mount_state(&request.logical, &request.target_dir)?;
    debug!(
        "Observed {:?}, {:?}: {}",
        attachment,
        mount_state,
        Stage::observed(&attachment, mount_state)
    );
    Ok((attachment, mount_state))
}
