// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Worker task owning a light controller.
//!
//! Everything that touches the controller runs here, one message at a time:
//! handle requests, timer expiry and delayed occupancy reports. Expiry is
//! just another wake-up of this loop, so it can never interleave with a
//! request half-way through.

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;

use crate::config::LightCtrlConfig;
use crate::controller::{LightCtrl, Snapshot};
use crate::error::ValueError;

/// Requests accepted by the worker.
#[derive(Debug)]
pub(crate) enum Command {
    On,
    Off,
    Occupancy,
    Enable,
    Disable,
    SetOccupancyMode(bool),
    SetConfig(Box<LightCtrlConfig>),
    Reset,
    Restart,
    Snapshot,
}

/// A command and the channel its acknowledgement goes to.
#[derive(Debug)]
pub(crate) struct Request {
    pub command: Command,
    pub reply: oneshot::Sender<Result<Snapshot, ValueError>>,
}

/// Runs the controller until every handle is gone, then hands it back.
pub(crate) async fn run(
    mut ctrl: LightCtrl,
    mut requests: mpsc::Receiver<Request>,
    snapshots: watch::Sender<Snapshot>,
) -> LightCtrl {
    ctrl.start();
    ctrl.flush();
    snapshots.send_replace(ctrl.snapshot());

    let mut occupancy_at: Option<Instant> = None;

    loop {
        let timer = ctrl.timer_deadline();

        tokio::select! {
            biased;

            () = sleep_until_some(timer) => {
                ctrl.on_timer_expired();
            }

            () = sleep_until_some(occupancy_at) => {
                occupancy_at = None;
                tracing::trace!(controller = %ctrl.id(), "Occupancy delay elapsed");
                ctrl.occupancy_detected();
            }

            request = requests.recv() => {
                let Some(Request { command, reply }) = request else {
                    break;
                };
                let result = handle(&mut ctrl, command, &mut occupancy_at);
                // The requester may have given up waiting
                let _ = reply.send(result.map(|()| ctrl.snapshot()));
            }
        }

        ctrl.flush();
        snapshots.send_replace(ctrl.snapshot());
    }

    tracing::debug!(controller = %ctrl.id(), "Light control worker stopped");
    ctrl
}

fn handle(
    ctrl: &mut LightCtrl,
    command: Command,
    occupancy_at: &mut Option<Instant>,
) -> Result<(), ValueError> {
    match command {
        Command::On => ctrl.on(),
        Command::Off => ctrl.off(),
        Command::Occupancy => {
            let delay = ctrl.config().occupancy_delay;
            if delay.is_zero() {
                ctrl.occupancy_detected();
            } else if occupancy_at.is_none() {
                tracing::trace!(controller = %ctrl.id(), delay = %delay, "Delaying occupancy report");
                *occupancy_at = Some(Instant::now() + delay.as_duration());
            }
        }
        Command::Enable => ctrl.enable(),
        Command::Disable => {
            *occupancy_at = None;
            ctrl.disable();
        }
        Command::SetOccupancyMode(enabled) => ctrl.set_occupancy_mode(enabled),
        Command::SetConfig(config) => ctrl.set_config(*config)?,
        Command::Reset => {
            *occupancy_at = None;
            ctrl.reset();
        }
        Command::Restart => {
            *occupancy_at = None;
            ctrl.init();
            ctrl.start();
        }
        Command::Snapshot => {}
    }
    Ok(())
}

/// Sleeps until `deadline`, or forever if there is none.
async fn sleep_until_some(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
