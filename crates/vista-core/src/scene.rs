// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Scene contract: messages a scene accepts and the handle used to reach it.

use serde_json::Value;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::context::TransformContext;
use crate::graph::{PrimitiveId, SceneId};
use crate::input::Input;

/// Messages the viewport sends to a scene.
#[derive(Debug)]
pub enum SceneMsg {
    /// Become active (fire-and-forget).
    Activate {
        /// Application arguments passed to `set_root`.
        args: Value,
        /// Root context of the scene's graph.
        context: TransformContext,
    },
    /// Stop being active; the scene must answer on `reply`.
    Deactivate {
        /// Acknowledgement channel.
        reply: oneshot::Sender<()>,
    },
    /// Routed input, already projected into the scene's local space.
    Input {
        /// The event.
        input: Input,
        /// Context the event was resolved against.
        context: TransformContext,
    },
    /// Pointer started hovering a primitive of this scene.
    CursorEnter {
        /// Hovered primitive.
        primitive: PrimitiveId,
        /// Context of the hovered primitive.
        context: TransformContext,
    },
    /// Pointer stopped hovering a primitive of this scene.
    CursorExit {
        /// Previously hovered primitive.
        primitive: PrimitiveId,
        /// Context the primitive was hovered with.
        context: TransformContext,
    },
}

/// Result of a bounded deactivation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deactivation {
    /// The scene answered.
    Acknowledged,
    /// The scene did not answer in time.
    TimedOut,
    /// The scene was already gone (or dropped the request).
    Gone,
}

/// Address of a running scene.
///
/// Cloning shares the underlying channel. Two handles refer to the same scene
/// instance only if [`SceneRef::same_instance`] holds; equal ids are not
/// enough because a static scene can be restarted under the same name.
#[derive(Debug, Clone)]
pub struct SceneRef {
    id: SceneId,
    tx: mpsc::UnboundedSender<SceneMsg>,
}

impl SceneRef {
    /// Fresh handle plus the inbox the scene task should drain.
    pub fn channel(id: impl Into<SceneId>) -> (Self, mpsc::UnboundedReceiver<SceneMsg>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { id: id.into(), tx }, rx)
    }

    /// Scene reference.
    pub fn id(&self) -> &SceneId {
        &self.id
    }

    /// Best-effort send. Returns false if the scene is gone.
    pub fn send(&self, msg: SceneMsg) -> bool {
        self.tx.send(msg).is_ok()
    }

    /// Whether both handles address the same scene instance.
    pub fn same_instance(&self, other: &Self) -> bool {
        self.tx.same_channel(&other.tx)
    }

    /// False once the scene's inbox has been dropped.
    pub fn is_alive(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Resolves when the scene's inbox is dropped.
    pub async fn closed(&self) {
        self.tx.closed().await;
    }

    /// Ask the scene to deactivate and wait up to `timeout` for the answer.
    pub async fn deactivate(&self, timeout: Duration) -> Deactivation {
        self.request_deactivate().wait(timeout).await
    }

    /// Queue a deactivation request without waiting for it.
    ///
    /// The request is ordered against every later message sent through this
    /// handle, so a following `Activate` is always seen after it.
    pub fn request_deactivate(&self) -> PendingDeactivation {
        let (reply, ack) = oneshot::channel();
        let ack = self.send(SceneMsg::Deactivate { reply }).then_some(ack);
        PendingDeactivation { ack }
    }
}

/// A deactivation request already in the scene's inbox.
#[derive(Debug)]
#[must_use = "the acknowledgement is lost unless waited on"]
pub struct PendingDeactivation {
    ack: Option<oneshot::Receiver<()>>,
}

impl PendingDeactivation {
    /// Wait up to `timeout` for the scene to acknowledge.
    pub async fn wait(self, timeout: Duration) -> Deactivation {
        let Some(ack) = self.ack else {
            return Deactivation::Gone;
        };
        match tokio::time::timeout(timeout, ack).await {
            Ok(Ok(())) => Deactivation::Acknowledged,
            Ok(Err(_)) => Deactivation::Gone,
            Err(_) => Deactivation::TimedOut,
        }
    }
}

/// Application logic driven by [`spawn_scene`].
///
/// All callbacks default to no-ops; deactivation is acknowledged by the
/// runner after [`Scene::deactivate`] returns.
pub trait Scene: Send + 'static {
    /// Called on `SceneMsg::Activate`.
    fn activate(&mut self, _args: Value, _context: TransformContext) {}
    /// Called on `SceneMsg::Deactivate`, before the acknowledgement.
    fn deactivate(&mut self) {}
    /// Called with routed input.
    fn input(&mut self, _input: Input, _context: TransformContext) {}
    /// Hover began on `primitive`.
    fn cursor_enter(&mut self, _primitive: PrimitiveId, _context: TransformContext) {}
    /// Hover ended on `primitive`.
    fn cursor_exit(&mut self, _primitive: PrimitiveId, _context: TransformContext) {}
}

impl<S: Scene + ?Sized> Scene for Box<S> {
    fn activate(&mut self, args: Value, context: TransformContext) {
        (**self).activate(args, context);
    }

    fn deactivate(&mut self) {
        (**self).deactivate();
    }

    fn input(&mut self, input: Input, context: TransformContext) {
        (**self).input(input, context);
    }

    fn cursor_enter(&mut self, primitive: PrimitiveId, context: TransformContext) {
        (**self).cursor_enter(primitive, context);
    }

    fn cursor_exit(&mut self, primitive: PrimitiveId, context: TransformContext) {
        (**self).cursor_exit(primitive, context);
    }
}

/// Run `scene` on its own task. The task ends when every handle is dropped
/// or the task is aborted; either way the inbox closes and monitors fire.
pub fn spawn_scene<S: Scene>(id: impl Into<SceneId>, scene: S) -> (SceneRef, JoinHandle<()>) {
    let (handle, inbox) = SceneRef::channel(id);
    let task = tokio::spawn(run_scene(handle.id().clone(), scene, inbox));
    (handle, task)
}

pub(crate) async fn run_scene<S: Scene>(
    id: SceneId,
    mut scene: S,
    mut inbox: mpsc::UnboundedReceiver<SceneMsg>,
) {
    while let Some(msg) = inbox.recv().await {
        match msg {
            SceneMsg::Activate { args, context } => scene.activate(args, context),
            SceneMsg::Deactivate { reply } => {
                scene.deactivate();
                if reply.send(()).is_err() {
                    trace!(scene = %id, "deactivation ack dropped by requester");
                }
            }
            SceneMsg::Input { input, context } => scene.input(input, context),
            SceneMsg::CursorEnter { primitive, context } => scene.cursor_enter(primitive, context),
            SceneMsg::CursorExit { primitive, context } => scene.cursor_exit(primitive, context),
        }
    }
    debug!(scene = %id, "scene inbox closed");
}
