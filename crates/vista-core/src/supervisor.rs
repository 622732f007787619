// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Dynamic-scene supervision port plus a tokio-task implementation.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::graph::SceneId;
use crate::scene::{run_scene, Scene, SceneRef};

/// Descriptor of a scene to be started on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicScene {
    /// Registered module name.
    pub module: String,
    /// Data handed to the module's factory.
    pub init: Value,
}

impl DynamicScene {
    /// Descriptor for `module` with `init` data.
    pub fn new(module: impl Into<String>, init: Value) -> Self {
        Self {
            module: module.into(),
            init,
        }
    }
}

/// Errors surfaced by a [`SceneSupervisor`].
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// No factory registered under this module name.
    #[error("unknown scene module: {0}")]
    UnknownModule(String),
    /// The supervisor has no child with this reference.
    #[error("no such child: {0}")]
    NoSuchChild(SceneId),
    /// The supervisor cannot start children at all.
    #[error("supervisor unavailable: {0}")]
    Unavailable(String),
}

/// Contract used by the viewport to start and stop dynamic root scenes.
pub trait SceneSupervisor: Send + Sync {
    /// Start a child for `spec`, returning its handle. The handle's id is the
    /// reference used in its graph key and for termination.
    fn start_child(&self, spec: &DynamicScene) -> Result<SceneRef, SupervisorError>;

    /// Terminate a previously started child.
    fn terminate_child(&self, id: &SceneId) -> Result<(), SupervisorError>;
}

/// Supervisor for viewports that only ever use static scenes.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSupervisor;

impl SceneSupervisor for NoSupervisor {
    fn start_child(&self, spec: &DynamicScene) -> Result<SceneRef, SupervisorError> {
        Err(SupervisorError::Unavailable(format!(
            "cannot start {}: no dynamic supervisor configured",
            spec.module
        )))
    }

    fn terminate_child(&self, id: &SceneId) -> Result<(), SupervisorError> {
        Err(SupervisorError::NoSuchChild(id.clone()))
    }
}

/// Builds a scene from the reference it was assigned and its init data.
pub type SceneFactory = Arc<dyn Fn(&SceneId, Value) -> Box<dyn Scene> + Send + Sync>;

/// Runs dynamic scenes as tokio tasks, one per child.
///
/// `start_child` must be called from within a tokio runtime.
pub struct TaskSupervisor {
    factories: HashMap<String, SceneFactory>,
    children: Mutex<HashMap<SceneId, JoinHandle<()>>>,
    next_child: AtomicU64,
}

impl Default for TaskSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskSupervisor {
    /// Supervisor with no registered modules.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
            children: Mutex::new(HashMap::new()),
            next_child: AtomicU64::new(0),
        }
    }

    /// Register `factory` under `module`, replacing any previous one.
    #[must_use]
    pub fn with_module<F, S>(mut self, module: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&SceneId, Value) -> S + Send + Sync + 'static,
        S: Scene,
    {
        let factory: SceneFactory =
            Arc::new(move |id: &SceneId, init: Value| -> Box<dyn Scene> {
                Box::new(factory(id, init))
            });
        self.factories.insert(module.into(), factory);
        self
    }

    /// References of running children, sorted.
    pub fn children(&self) -> Vec<SceneId> {
        let mut children = self.children.lock().unwrap_or_else(PoisonError::into_inner);
        reap_finished(&mut children);
        let mut ids: Vec<_> = children.keys().cloned().collect();
        ids.sort();
        ids
    }
}

/// Drop handles of children whose task already ended on its own.
fn reap_finished(children: &mut HashMap<SceneId, JoinHandle<()>>) {
    children.retain(|id, task| {
        let running = !task.is_finished();
        if !running {
            debug!(scene = %id, "reaped exited dynamic scene");
        }
        running
    });
}

impl SceneSupervisor for TaskSupervisor {
    fn start_child(&self, spec: &DynamicScene) -> Result<SceneRef, SupervisorError> {
        let factory = self
            .factories
            .get(&spec.module)
            .ok_or_else(|| SupervisorError::UnknownModule(spec.module.clone()))?;
        let n = self.next_child.fetch_add(1, Ordering::Relaxed);
        let id = SceneId::new(format!("{}-{}", spec.module, n));
        let scene = factory(&id, spec.init.clone());
        let (handle, inbox) = SceneRef::channel(id.clone());
        let task = tokio::spawn(run_scene(id.clone(), scene, inbox));
        let mut children = self.children.lock().unwrap_or_else(PoisonError::into_inner);
        reap_finished(&mut children);
        children.insert(id.clone(), task);
        drop(children);
        info!(scene = %id, module = %spec.module, "started dynamic scene");
        Ok(handle)
    }

    fn terminate_child(&self, id: &SceneId) -> Result<(), SupervisorError> {
        let task = self
            .children
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .ok_or_else(|| SupervisorError::NoSuchChild(id.clone()))?;
        task.abort();
        debug!(scene = %id, "terminated dynamic scene");
        Ok(())
    }
}

impl std::fmt::Debug for TaskSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut modules: Vec<_> = self.factories.keys().collect();
        modules.sort();
        f.debug_struct("TaskSupervisor")
            .field("modules", &modules)
            .field("children", &self.children())
            .finish_non_exhaustive()
    }
}
