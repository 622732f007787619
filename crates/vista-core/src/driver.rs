// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Driver contract and the registry of connected drivers.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use tokio::sync::mpsc;
use tracing::trace;

use crate::graph::GraphKey;
use crate::viewport::ViewPort;

/// Identity of a connected driver, unique within a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DriverId(pub u64);

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "driver-{}", self.0)
    }
}

/// Messages the viewport sends to drivers.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverMsg {
    /// Render this graph as the root; `None` means blank.
    SetRoot(Option<GraphKey>),
    /// Application message relayed through `driver_cast`.
    Cast(Value),
    /// Shut down (sent by `stop_driver`).
    Stop,
}

/// Address of a driver task.
#[derive(Debug, Clone)]
pub struct DriverRef {
    id: DriverId,
    tx: mpsc::UnboundedSender<DriverMsg>,
}

impl DriverRef {
    /// Fresh handle plus the inbox the driver should drain.
    pub fn channel(id: DriverId) -> (Self, mpsc::UnboundedReceiver<DriverMsg>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { id, tx }, rx)
    }

    /// Driver identity.
    pub fn id(&self) -> DriverId {
        self.id
    }

    /// Best-effort send. Returns false if the driver is gone.
    pub fn send(&self, msg: DriverMsg) -> bool {
        self.tx.send(msg).is_ok()
    }

    /// False once the driver's inbox has been dropped.
    pub fn is_alive(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Resolves when the driver's inbox is dropped.
    pub async fn closed(&self) {
        self.tx.closed().await;
    }
}

/// A device adapter run by [`ViewPort::start_driver`].
///
/// Implementations announce themselves with [`ViewPort::driver_ready`] once
/// they can render, and call [`ViewPort::driver_stopped`] on the way out.
pub trait Driver: Send + 'static {
    /// Drive the device until the inbox closes or `DriverMsg::Stop` arrives.
    fn run(
        self,
        viewport: ViewPort,
        me: DriverRef,
        inbox: mpsc::UnboundedReceiver<DriverMsg>,
    ) -> impl Future<Output = ()> + Send;
}

/// Deduplicated set of registered drivers; the fan-out target for broadcasts.
#[derive(Debug, Default)]
pub struct DriverRegistry {
    drivers: BTreeMap<DriverId, DriverRef>,
}

impl DriverRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a driver. Returns false if it was already present.
    pub fn add(&mut self, driver: DriverRef) -> bool {
        if self.drivers.contains_key(&driver.id) {
            return false;
        }
        self.drivers.insert(driver.id, driver);
        true
    }

    /// Unregister a driver; absent ids are ignored.
    pub fn remove(&mut self, id: DriverId) -> Option<DriverRef> {
        self.drivers.remove(&id)
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: DriverId) -> bool {
        self.drivers.contains_key(&id)
    }

    /// Registered driver ids in ascending order.
    pub fn ids(&self) -> Vec<DriverId> {
        self.drivers.keys().copied().collect()
    }

    /// Number of registered drivers.
    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    /// True when no driver is registered.
    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    /// Send `msg` to every driver. Returns how many sends succeeded.
    ///
    /// Dead drivers are skipped, not removed; removal happens through
    /// `driver_stopped` or monitoring.
    pub fn broadcast(&self, msg: &DriverMsg) -> usize {
        let mut delivered = 0;
        for driver in self.drivers.values() {
            if driver.send(msg.clone()) {
                delivered += 1;
            } else {
                trace!(driver = %driver.id, "broadcast skipped closed driver");
            }
        }
        delivered
    }
}
