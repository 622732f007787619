// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Supervisor fake that starts [`RecordingScene`]s and logs its lifecycle calls.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use vista_core::{spawn_scene, DynamicScene, SceneId, SceneRef, SceneSupervisor, SupervisorError};

use crate::log::CallLog;
use crate::scenes::{RecordingScene, SceneTap};

#[derive(Debug, Default)]
struct Children {
    tasks: HashMap<SceneId, JoinHandle<()>>,
    taps: HashMap<SceneId, SceneTap>,
}

/// Starts one [`RecordingScene`] per `start_child`, named `{module}-{n}`.
///
/// Every start and termination is appended to the shared [`CallLog`] as
/// `start:<id>` / `terminate:<id>`; the scenes themselves add
/// `deactivate:<id>`.
#[derive(Debug, Default)]
pub struct RecordingSupervisor {
    log: CallLog,
    children: Mutex<Children>,
    next_child: AtomicU64,
    fail_start: AtomicBool,
}

impl RecordingSupervisor {
    /// Supervisor writing to `log`.
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    fn lock(&self) -> MutexGuard<'_, Children> {
        self.children.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make `start_child` fail until reset.
    pub fn set_fail_start(&self, fail: bool) {
        self.fail_start.store(fail, Ordering::SeqCst);
    }

    /// Take the tap of a started child. Each tap can be taken once.
    pub fn take_tap(&self, id: &SceneId) -> Option<SceneTap> {
        self.lock().taps.remove(id)
    }

    /// Abort a child's task without going through `terminate_child`, as if it
    /// had exited by itself. Returns false for unknown ids.
    pub fn crash(&self, id: &SceneId) -> bool {
        self.lock().tasks.get(id).map(JoinHandle::abort).is_some()
    }

    /// Ids of children started and not yet terminated, sorted.
    pub fn running(&self) -> Vec<SceneId> {
        let mut ids: Vec<_> = self.lock().tasks.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl SceneSupervisor for RecordingSupervisor {
    fn start_child(&self, spec: &DynamicScene) -> Result<SceneRef, SupervisorError> {
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(SupervisorError::Unavailable("start disabled".into()));
        }
        let n = self.next_child.fetch_add(1, Ordering::Relaxed);
        let id = SceneId::new(format!("{}-{n}", spec.module));
        let (scene, tap) = RecordingScene::new(id.clone());
        let (handle, task) = spawn_scene(id.clone(), scene.with_log(self.log.clone()));
        self.log.push(format!("start:{id}"));
        let mut children = self.lock();
        children.tasks.insert(id.clone(), task);
        children.taps.insert(id, tap);
        Ok(handle)
    }

    fn terminate_child(&self, id: &SceneId) -> Result<(), SupervisorError> {
        let task = self
            .lock()
            .tasks
            .remove(id)
            .ok_or_else(|| SupervisorError::NoSuchChild(id.clone()))?;
        task.abort();
        self.log.push(format!("terminate:{id}"));
        Ok(())
    }
}
