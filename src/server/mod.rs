// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Async light control server.
//!
//! [`LightCtrlServer`] moves a [`LightCtrl`] onto its own tokio task and
//! talks to it through a channel. The task is the controller's single
//! logical thread: requests, fade expiry, hold and resume timers and
//! delayed occupancy reports are all processed there in turn. Dirty
//! records are flushed by the task after each step, after the requester
//! has been answered.
//!
//! # Examples
//!
//! ```no_run
//! # use lumictl::collaborator::Collaborators;
//! use lumictl::config::LightCtrlConfig;
//! use lumictl::controller::LightCtrl;
//! use lumictl::server::LightCtrlServer;
//!
//! # async fn example(collaborators: Collaborators) -> lumictl::Result<()> {
//! let ctrl = LightCtrl::new(LightCtrlConfig::default(), collaborators);
//! let server = LightCtrlServer::spawn(ctrl);
//!
//! let mut events = server.subscribe();
//! tokio::spawn(async move {
//!     while let Ok(event) = events.recv().await {
//!         println!("{event:?}");
//!     }
//! });
//!
//! server.enable().await?;
//! server.on().await?;
//! # Ok(())
//! # }
//! ```

mod worker;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::config::LightCtrlConfig;
use crate::controller::{LightCtrl, Snapshot};
use crate::error::{Error, Result};
use crate::event::{ControllerId, CtrlEvent, EventBus};

use worker::{Command, Request};

/// Capacity of the request channel.
const REQUEST_CHANNEL_SIZE: usize = 64;

/// Handle to a light controller running on its own task.
///
/// Every request is answered with the controller snapshot taken right
/// after the request was processed.
#[derive(Debug)]
pub struct LightCtrlServer {
    id: ControllerId,
    requests: mpsc::Sender<Request>,
    snapshots: watch::Receiver<Snapshot>,
    events: EventBus,
    task: JoinHandle<LightCtrl>,
}

impl LightCtrlServer {
    /// Starts `ctrl` on a new task.
    ///
    /// The task runs the controller's `start` hook before serving requests.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn spawn(ctrl: LightCtrl) -> Self {
        let id = ctrl.id();
        let events = ctrl.events().clone();
        let (requests, rx) = mpsc::channel(REQUEST_CHANNEL_SIZE);
        let (snapshot_tx, snapshots) = watch::channel(ctrl.snapshot());

        let task = tokio::spawn(worker::run(ctrl, rx, snapshot_tx));
        tracing::debug!(controller = %id, "Light control server spawned");

        Self {
            id,
            requests,
            snapshots,
            events,
            task,
        }
    }

    /// Returns the controller's identifier.
    #[must_use]
    pub fn id(&self) -> ControllerId {
        self.id
    }

    /// Subscribes to controller events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CtrlEvent> {
        self.events.subscribe()
    }

    /// Returns a receiver that tracks the latest controller snapshot.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Turns the light on.
    ///
    /// # Errors
    ///
    /// Returns `Error::ServerClosed` if the worker has stopped.
    pub async fn on(&self) -> Result<Snapshot> {
        self.request(Command::On).await
    }

    /// Turns the light off.
    ///
    /// # Errors
    ///
    /// Returns `Error::ServerClosed` if the worker has stopped.
    pub async fn off(&self) -> Result<Snapshot> {
        self.request(Command::Off).await
    }

    /// Reports occupancy, honouring the configured occupancy delay.
    ///
    /// # Errors
    ///
    /// Returns `Error::ServerClosed` if the worker has stopped.
    pub async fn occupancy_detected(&self) -> Result<Snapshot> {
        self.request(Command::Occupancy).await
    }

    /// Enables the controller.
    ///
    /// # Errors
    ///
    /// Returns `Error::ServerClosed` if the worker has stopped.
    pub async fn enable(&self) -> Result<Snapshot> {
        self.request(Command::Enable).await
    }

    /// Disables the controller and drops any delayed occupancy report.
    ///
    /// # Errors
    ///
    /// Returns `Error::ServerClosed` if the worker has stopped.
    pub async fn disable(&self) -> Result<Snapshot> {
        self.request(Command::Disable).await
    }

    /// Permits or forbids occupancy automation.
    ///
    /// # Errors
    ///
    /// Returns `Error::ServerClosed` if the worker has stopped.
    pub async fn set_occupancy_mode(&self, enabled: bool) -> Result<Snapshot> {
        self.request(Command::SetOccupancyMode(enabled)).await
    }

    /// Replaces the controller configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Value` if the configuration is invalid, or
    /// `Error::ServerClosed` if the worker has stopped.
    pub async fn set_config(&self, config: LightCtrlConfig) -> Result<Snapshot> {
        self.request(Command::SetConfig(Box::new(config))).await
    }

    /// Resets the controller, clearing its flags and persisted records.
    ///
    /// # Errors
    ///
    /// Returns `Error::ServerClosed` if the worker has stopped.
    pub async fn reset(&self) -> Result<Snapshot> {
        self.request(Command::Reset).await
    }

    /// Re-initializes and restarts a controller, typically after a reset.
    ///
    /// # Errors
    ///
    /// Returns `Error::ServerClosed` if the worker has stopped.
    pub async fn restart(&self) -> Result<Snapshot> {
        self.request(Command::Restart).await
    }

    /// Returns the current controller snapshot.
    ///
    /// Goes through the worker, so any timer that has already expired is
    /// processed first.
    ///
    /// # Errors
    ///
    /// Returns `Error::ServerClosed` if the worker has stopped.
    pub async fn snapshot(&self) -> Result<Snapshot> {
        self.request(Command::Snapshot).await
    }

    /// Stops the worker and returns the controller.
    ///
    /// # Errors
    ///
    /// Returns `Error::ServerClosed` if the worker task panicked or was
    /// cancelled.
    pub async fn shutdown(self) -> Result<LightCtrl> {
        let Self {
            id, requests, task, ..
        } = self;
        drop(requests);
        let ctrl = task.await.map_err(|e| {
            tracing::warn!(controller = %id, error = %e, "Light control worker failed");
            Error::ServerClosed
        })?;
        Ok(ctrl)
    }

    async fn request(&self, command: Command) -> Result<Snapshot> {
        let (reply, rx) = oneshot::channel();
        self.requests
            .send(Request { command, reply })
            .await
            .map_err(|_| Error::ServerClosed)?;
        let result = rx.await.map_err(|_| Error::ServerClosed)?;
        result.map_err(Error::from)
    }
}
