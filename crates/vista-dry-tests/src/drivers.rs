// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Driver tap: a driver identity whose inbox the test reads directly.

use tokio::sync::mpsc;
use vista_core::{DriverId, DriverMsg, DriverRef, ViewPort, ViewPortError};

use crate::TAP_TIMEOUT;

/// Registered driver with no task of its own. Dropping it closes the inbox,
/// which the viewport observes as the driver stopping.
#[derive(Debug)]
pub struct DriverTap {
    me: DriverRef,
    inbox: mpsc::UnboundedReceiver<DriverMsg>,
}

impl DriverTap {
    /// Driver identity.
    pub fn id(&self) -> DriverId {
        self.me.id()
    }

    /// Handle the viewport sends to.
    pub fn handle(&self) -> &DriverRef {
        &self.me
    }

    /// Next message, or `None` if nothing arrives within [`crate::TAP_TIMEOUT`].
    pub async fn next(&mut self) -> Option<DriverMsg> {
        tokio::time::timeout(TAP_TIMEOUT, self.inbox.recv())
            .await
            .ok()
            .flatten()
    }

    /// Messages already queued, without waiting.
    pub fn drain(&mut self) -> Vec<DriverMsg> {
        let mut out = Vec::new();
        while let Ok(msg) = self.inbox.try_recv() {
            out.push(msg);
        }
        out
    }
}

/// Allocate a driver on `viewport` and announce it ready.
pub fn connect_driver(viewport: &ViewPort) -> Result<DriverTap, ViewPortError> {
    let (me, inbox) = viewport.driver_channel();
    viewport.driver_ready(&me)?;
    Ok(DriverTap { me, inbox })
}
