// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Root scene bookkeeping and the ordered retirement of replaced roots.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::context::{TransformContext, ViewPortId};
use crate::graph::GraphKey;
use crate::scene::{Deactivation, PendingDeactivation, SceneMsg, SceneRef};
use crate::supervisor::{DynamicScene, SceneSupervisor, SupervisorError};

/// Which scene `set_root` should install.
#[derive(Debug, Clone)]
pub enum SceneDescriptor {
    /// An already-running, externally supervised scene.
    Static(SceneRef),
    /// A scene the viewport starts through its supervisor.
    Dynamic(DynamicScene),
}

impl From<SceneRef> for SceneDescriptor {
    fn from(scene: SceneRef) -> Self {
        Self::Static(scene)
    }
}

impl From<DynamicScene> for SceneDescriptor {
    fn from(spec: DynamicScene) -> Self {
        Self::Dynamic(spec)
    }
}

/// The installed root.
#[derive(Debug, Clone)]
pub struct RootState {
    /// Graph drivers render as the root.
    pub graph_key: GraphKey,
    /// Handle of the root scene.
    pub scene: SceneRef,
    /// Whether the viewport started (and must terminate) this scene.
    pub dynamic: bool,
}

/// Outcome of [`RootManager::install`].
#[derive(Debug)]
pub(crate) struct RootSwap {
    pub installed: RootState,
    pub previous: Option<RootState>,
}

pub(crate) struct RootManager {
    viewport: ViewPortId,
    current: Option<RootState>,
    supervisor: Arc<dyn SceneSupervisor>,
    deactivate_timeout: Duration,
}

impl RootManager {
    pub(crate) fn new(
        viewport: ViewPortId,
        supervisor: Arc<dyn SceneSupervisor>,
        deactivate_timeout: Duration,
    ) -> Self {
        Self {
            viewport,
            current: None,
            supervisor,
            deactivate_timeout,
        }
    }

    pub(crate) fn current(&self) -> Option<&RootState> {
        self.current.as_ref()
    }

    pub(crate) fn graph_key(&self) -> Option<&GraphKey> {
        self.current.as_ref().map(|r| &r.graph_key)
    }

    /// Identity context for the current root graph.
    pub(crate) fn context(&self) -> Option<TransformContext> {
        self.graph_key()
            .map(|key| TransformContext::new(self.viewport, key.clone()))
    }

    /// Resolve `descriptor`, activate it, and make it current.
    ///
    /// A supervisor failure leaves the current root untouched.
    pub(crate) fn install(
        &mut self,
        descriptor: SceneDescriptor,
        args: Value,
    ) -> Result<RootSwap, SupervisorError> {
        let (scene, dynamic) = match descriptor {
            SceneDescriptor::Static(scene) => (scene, false),
            SceneDescriptor::Dynamic(spec) => (self.supervisor.start_child(&spec)?, true),
        };
        let graph_key = GraphKey::new(scene.id().clone());
        let context = TransformContext::new(self.viewport, graph_key.clone());
        if !scene.send(SceneMsg::Activate { args, context }) {
            debug!(scene = %scene.id(), "activation undeliverable; scene already gone");
        }
        let installed = RootState {
            graph_key,
            scene,
            dynamic,
        };
        let previous = self.current.replace(installed.clone());
        Ok(RootSwap {
            installed,
            previous,
        })
    }

    /// Forget the root if `scene` is it. Returns the forgotten root.
    pub(crate) fn clear_if(&mut self, scene: &SceneRef) -> Option<RootState> {
        if self
            .current
            .as_ref()
            .is_some_and(|r| r.scene.same_instance(scene))
        {
            self.current.take()
        } else {
            None
        }
    }

    /// Queue `previous`'s deactivation on the caller's task, then wait for the
    /// acknowledgement and terminate it (if the viewport started it) off it.
    ///
    /// The request is sent before this returns, so an `Activate` the caller
    /// sends afterwards cannot be overtaken by it.
    pub(crate) fn retire(&self, previous: RootState) -> JoinHandle<()> {
        let pending = previous.scene.request_deactivate();
        tokio::spawn(retire(
            previous,
            pending,
            Arc::clone(&self.supervisor),
            self.deactivate_timeout,
        ))
    }

    /// Release supervisor resources held by a root that exited by itself.
    pub(crate) fn reap(&self, dead: &RootState) {
        if !dead.dynamic {
            return;
        }
        if let Err(err) = self.supervisor.terminate_child(dead.scene.id()) {
            debug!(scene = %dead.scene.id(), %err, "dead root already released");
        }
    }
}

async fn retire(
    previous: RootState,
    pending: PendingDeactivation,
    supervisor: Arc<dyn SceneSupervisor>,
    timeout: Duration,
) {
    let id = previous.scene.id().clone();
    match pending.wait(timeout).await {
        Deactivation::Acknowledged => debug!(scene = %id, "retired root deactivated"),
        Deactivation::Gone => debug!(scene = %id, "retired root already gone"),
        Deactivation::TimedOut => {
            warn!(scene = %id, ?timeout, "retired root did not acknowledge deactivation");
        }
    }
    if previous.dynamic {
        if let Err(err) = supervisor.terminate_child(&id) {
            warn!(scene = %id, %err, "could not terminate retired root");
        }
    }
}
