// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! A scene that reports everything it receives.

use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use vista_core::{spawn_scene, Input, PrimitiveId, Scene, SceneId, SceneRef, TransformContext};

use crate::log::CallLog;
use crate::TAP_TIMEOUT;

/// One callback observed by a [`RecordingScene`].
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    /// `activate` ran.
    Activated {
        /// Arguments passed to `set_root`.
        args: Value,
        /// Root context handed over with them.
        context: TransformContext,
    },
    /// `deactivate` ran.
    Deactivated,
    /// Input was delivered.
    Input {
        /// The event in local coordinates.
        input: Input,
        /// Context it was resolved against.
        context: TransformContext,
    },
    /// Hover entered a primitive.
    Enter(PrimitiveId),
    /// Hover left a primitive.
    Exit(PrimitiveId),
}

/// Scene that forwards each callback to a [`SceneTap`] and, optionally,
/// records `deactivate:<id>` in a [`CallLog`].
#[derive(Debug)]
pub struct RecordingScene {
    id: SceneId,
    events: mpsc::UnboundedSender<SceneEvent>,
    log: Option<CallLog>,
}

impl RecordingScene {
    /// Scene plus the tap observing it.
    pub fn new(id: impl Into<SceneId>) -> (Self, SceneTap) {
        let (events, rx) = mpsc::unbounded_channel();
        let scene = Self {
            id: id.into(),
            events,
            log: None,
        };
        (scene, SceneTap { rx })
    }

    /// Also record deactivations in `log`.
    #[must_use]
    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = Some(log);
        self
    }

    /// Spawn a recording scene; returns its handle, tap and task.
    pub fn spawn(id: impl Into<SceneId>) -> (SceneRef, SceneTap, JoinHandle<()>) {
        let id = id.into();
        let (scene, tap) = Self::new(id.clone());
        let (handle, task) = spawn_scene(id, scene);
        (handle, tap, task)
    }

    fn emit(&self, event: SceneEvent) {
        // The tap may have been dropped by a test that does not care.
        let _ = self.events.send(event);
    }
}

impl Scene for RecordingScene {
    fn activate(&mut self, args: Value, context: TransformContext) {
        self.emit(SceneEvent::Activated { args, context });
    }

    fn deactivate(&mut self) {
        if let Some(log) = &self.log {
            log.push(format!("deactivate:{}", self.id));
        }
        self.emit(SceneEvent::Deactivated);
    }

    fn input(&mut self, input: Input, context: TransformContext) {
        self.emit(SceneEvent::Input { input, context });
    }

    fn cursor_enter(&mut self, primitive: PrimitiveId, _context: TransformContext) {
        self.emit(SceneEvent::Enter(primitive));
    }

    fn cursor_exit(&mut self, primitive: PrimitiveId, _context: TransformContext) {
        self.emit(SceneEvent::Exit(primitive));
    }
}

/// Receiving end of a [`RecordingScene`].
#[derive(Debug)]
pub struct SceneTap {
    rx: mpsc::UnboundedReceiver<SceneEvent>,
}

impl SceneTap {
    /// Next event, or `None` if nothing arrives within [`TAP_TIMEOUT`].
    pub async fn next(&mut self) -> Option<SceneEvent> {
        tokio::time::timeout(TAP_TIMEOUT, self.rx.recv())
            .await
            .ok()
            .flatten()
    }

    /// Next input event, skipping activations and hover notifications.
    pub async fn next_input(&mut self) -> Option<(Input, TransformContext)> {
        loop {
            match self.next().await? {
                SceneEvent::Input { input, context } => return Some((input, context)),
                SceneEvent::Activated { .. } | SceneEvent::Enter(_) | SceneEvent::Exit(_) => {}
                _ => return None,
            }
        }
    }

    /// Whether no event arrives for `window`.
    pub async fn quiet_for(&mut self, window: Duration) -> bool {
        !matches!(
            tokio::time::timeout(window, self.rx.recv()).await,
            Ok(Some(_))
        )
    }
}
