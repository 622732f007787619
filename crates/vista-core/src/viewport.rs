// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The viewport coordinator: one task, one mailbox, all state owned here.
//!
//! [`ViewPort`] is the cloneable handle scenes and drivers talk through. Every
//! operation is a message to the coordinator task, which handles one message
//! to completion before reading the next; that ordering is the only
//! synchronization the state needs. Nothing in the handler blocks. The single
//! request/response step (deactivating a replaced root) runs on a spawned
//! teardown task.

use glam::Affine2;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, trace, warn};

use crate::capture::CaptureTable;
use crate::config::{HitMissPolicy, ViewPortConfig};
use crate::context::{TransformContext, ViewPortId};
use crate::driver::{Driver, DriverId, DriverMsg, DriverRef, DriverRegistry};
use crate::graph::{GraphKey, GraphSource, PrimitiveId, SceneId};
use crate::hit::{hit_test, Hit, HitOutcome};
use crate::input::{Input, InputType};
use crate::root::{RootManager, SceneDescriptor};
use crate::scene::{SceneMsg, SceneRef};
use crate::supervisor::SceneSupervisor;

static NEXT_VIEWPORT: AtomicU64 = AtomicU64::new(1);

/// Errors returned by [`ViewPort`] operations.
#[derive(Debug, Error)]
pub enum ViewPortError {
    /// The coordinator task has exited.
    #[error("{0} has stopped")]
    Closed(ViewPortId),
    /// The coordinator exited before answering.
    #[error("{0} stopped before replying")]
    NoReply(ViewPortId),
}

/// Currently hovered primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverTarget {
    /// Scene owning the primitive.
    pub scene: SceneId,
    /// Graph the primitive lives in.
    pub graph_key: GraphKey,
    /// The primitive.
    pub primitive: PrimitiveId,
}

/// Point-in-time view of the coordinator state.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewPortInfo {
    /// Viewport identity.
    pub id: ViewPortId,
    /// Configured name.
    pub name: String,
    /// Current size in device pixels.
    pub size: (u32, u32),
    /// Current root graph, if any.
    pub root: Option<GraphKey>,
    /// Whether the root was started by the viewport.
    pub root_is_dynamic: bool,
    /// Registered drivers.
    pub drivers: Vec<DriverId>,
    /// Captured input types and their holders.
    pub captures: BTreeMap<InputType, SceneId>,
    /// Hovered primitive, if any.
    pub hover: Option<HoverTarget>,
    /// Scenes addressable by hit-testing.
    pub scenes: Vec<SceneId>,
}

#[derive(Debug)]
enum Command {
    SetRoot {
        descriptor: SceneDescriptor,
        args: Value,
    },
    RequestRoot {
        reply: oneshot::Sender<Option<GraphKey>>,
    },
    CaptureInput {
        scene: SceneRef,
        context: TransformContext,
        types: Vec<InputType>,
    },
    ReleaseInput {
        scene: SceneRef,
        types: Vec<InputType>,
    },
    DriverCast(Value),
    DriverReady(DriverRef),
    DriverStopped(DriverId),
    StopDriver(DriverId),
    Input {
        context: TransformContext,
        input: Input,
    },
    Monitor(SceneRef),
    SceneDown(SceneRef),
    Info {
        reply: oneshot::Sender<ViewPortInfo>,
    },
}

/// Handle to a running viewport coordinator.
///
/// Cheap to clone. The coordinator task exits once every handle is dropped.
#[derive(Debug, Clone)]
pub struct ViewPort {
    id: ViewPortId,
    tx: mpsc::UnboundedSender<Command>,
    next_driver: Arc<AtomicU64>,
}

impl ViewPort {
    /// Spawn a coordinator on the current tokio runtime.
    pub fn start(
        config: ViewPortConfig,
        supervisor: Arc<dyn SceneSupervisor>,
        graphs: Arc<dyn GraphSource>,
    ) -> (Self, JoinHandle<()>) {
        let id = ViewPortId(NEXT_VIEWPORT.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::unbounded_channel();
        let coordinator = Coordinator::new(id, config, supervisor, graphs, tx.downgrade());
        let task = tokio::spawn(coordinator.run(rx));
        let handle = Self {
            id,
            tx,
            next_driver: Arc::new(AtomicU64::new(1)),
        };
        (handle, task)
    }

    /// Viewport identity.
    pub fn id(&self) -> ViewPortId {
        self.id
    }

    fn cast(&self, cmd: Command) -> Result<(), ViewPortError> {
        self.tx.send(cmd).map_err(|_| ViewPortError::Closed(self.id))
    }

    /// Install a new root scene and retire the previous one.
    pub fn set_root(
        &self,
        descriptor: impl Into<SceneDescriptor>,
        args: Value,
    ) -> Result<(), ViewPortError> {
        self.cast(Command::SetRoot {
            descriptor: descriptor.into(),
            args,
        })
    }

    /// Current root graph key; `None` before any root is set.
    pub async fn request_root(&self) -> Result<Option<GraphKey>, ViewPortError> {
        let (reply, rx) = oneshot::channel();
        self.cast(Command::RequestRoot { reply })?;
        rx.await.map_err(|_| ViewPortError::NoReply(self.id))
    }

    /// Route every event of `types` to `scene`, bypassing hit-testing.
    ///
    /// Positions are projected with `context`. A later capture of the same
    /// type by any scene replaces this one.
    pub fn capture_input(
        &self,
        scene: &SceneRef,
        context: &TransformContext,
        types: &[InputType],
    ) -> Result<(), ViewPortError> {
        self.cast(Command::CaptureInput {
            scene: scene.clone(),
            context: context.clone(),
            types: types.to_vec(),
        })
    }

    /// Release the captures in `types` that `scene` holds.
    pub fn release_input(&self, scene: &SceneRef, types: &[InputType]) -> Result<(), ViewPortError> {
        self.cast(Command::ReleaseInput {
            scene: scene.clone(),
            types: types.to_vec(),
        })
    }

    /// Relay `message` to every registered driver, best-effort.
    pub fn driver_cast(&self, message: Value) -> Result<(), ViewPortError> {
        self.cast(Command::DriverCast(message))
    }

    /// Register `driver`; it immediately receives the current root.
    pub fn driver_ready(&self, driver: &DriverRef) -> Result<(), ViewPortError> {
        self.cast(Command::DriverReady(driver.clone()))
    }

    /// Unregister a driver.
    pub fn driver_stopped(&self, id: DriverId) -> Result<(), ViewPortError> {
        self.cast(Command::DriverStopped(id))
    }

    /// Allocate a driver identity and inbox without spawning anything.
    pub fn driver_channel(&self) -> (DriverRef, mpsc::UnboundedReceiver<DriverMsg>) {
        DriverRef::channel(DriverId(self.next_driver.fetch_add(1, Ordering::Relaxed)))
    }

    /// Run `driver` on its own task.
    pub fn start_driver<D: Driver>(&self, driver: D) -> (DriverRef, JoinHandle<()>) {
        let (me, inbox) = self.driver_channel();
        let task = tokio::spawn(driver.run(self.clone(), me.clone(), inbox));
        (me, task)
    }

    /// Ask a driver to stop and unregister it.
    pub fn stop_driver(&self, id: DriverId) -> Result<(), ViewPortError> {
        self.cast(Command::StopDriver(id))
    }

    /// Context for input originating at a driver whose device space maps to
    /// viewport space through `device`.
    pub fn device_context(&self, device: Affine2) -> TransformContext {
        TransformContext::new(self.id, GraphKey::viewport()).with_transform(device)
    }

    /// Deliver raw input observed by a driver.
    ///
    /// Positions are in the driver space described by `context`.
    pub fn input(&self, context: &TransformContext, input: Input) -> Result<(), ViewPortError> {
        self.cast(Command::Input {
            context: context.clone(),
            input,
        })
    }

    /// Make `scene` addressable by hit-testing and watch it for termination.
    pub fn monitor(&self, scene: &SceneRef) -> Result<(), ViewPortError> {
        self.cast(Command::Monitor(scene.clone()))
    }

    /// Snapshot of the coordinator state.
    pub async fn info(&self) -> Result<ViewPortInfo, ViewPortError> {
        let (reply, rx) = oneshot::channel();
        self.cast(Command::Info { reply })?;
        rx.await.map_err(|_| ViewPortError::NoReply(self.id))
    }
}

struct Hover {
    scene: SceneRef,
    hit: Hit,
}

impl Hover {
    fn target(&self) -> HoverTarget {
        HoverTarget {
            scene: self.hit.scene.clone(),
            graph_key: self.hit.context.graph_key().clone(),
            primitive: self.hit.primitive,
        }
    }

    fn exit(self) {
        self.scene.send(SceneMsg::CursorExit {
            primitive: self.hit.primitive,
            context: self.hit.context,
        });
    }
}

struct Coordinator {
    id: ViewPortId,
    config: ViewPortConfig,
    size: (u32, u32),
    mailbox: mpsc::WeakUnboundedSender<Command>,
    graphs: Arc<dyn GraphSource>,
    root: RootManager,
    drivers: DriverRegistry,
    captures: CaptureTable,
    hover: Option<Hover>,
    /// Scene directory. Every entry has a watcher task reporting its exit.
    scenes: BTreeMap<SceneId, SceneRef>,
}

impl Coordinator {
    fn new(
        id: ViewPortId,
        config: ViewPortConfig,
        supervisor: Arc<dyn SceneSupervisor>,
        graphs: Arc<dyn GraphSource>,
        mailbox: mpsc::WeakUnboundedSender<Command>,
    ) -> Self {
        let root = RootManager::new(id, supervisor, config.deactivate_timeout());
        Self {
            id,
            size: (config.width, config.height),
            config,
            mailbox,
            graphs,
            root,
            drivers: DriverRegistry::new(),
            captures: CaptureTable::new(),
            hover: None,
            scenes: BTreeMap::new(),
        }
    }

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command>) {
        info!(viewport = %self.id, name = %self.config.name, "viewport started");
        while let Some(cmd) = rx.recv().await {
            self.handle(cmd);
        }
        info!(viewport = %self.id, "viewport stopped");
    }

    fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::SetRoot { descriptor, args } => self.set_root(descriptor, args),
            Command::RequestRoot { reply } => {
                if reply.send(self.root.graph_key().cloned()).is_err() {
                    trace!(viewport = %self.id, "root requester went away");
                }
            }
            Command::CaptureInput {
                scene,
                context,
                types,
            } => {
                debug!(viewport = %self.id, scene = %scene.id(), ?types, "capture input");
                self.captures.capture(&scene, &context, &types);
                self.register(&scene);
            }
            Command::ReleaseInput { scene, types } => {
                let released = self.captures.release(&scene, &types);
                debug!(viewport = %self.id, scene = %scene.id(), ?types, released, "release input");
            }
            Command::DriverCast(message) => {
                self.drivers.broadcast(&DriverMsg::Cast(message));
            }
            Command::DriverReady(driver) => self.driver_ready(driver),
            Command::DriverStopped(id) => {
                if self.drivers.remove(id).is_some() {
                    info!(viewport = %self.id, driver = %id, "driver stopped");
                }
            }
            Command::StopDriver(id) => {
                if let Some(driver) = self.drivers.remove(id) {
                    driver.send(DriverMsg::Stop);
                    info!(viewport = %self.id, driver = %id, "driver stop requested");
                }
            }
            Command::Input { context, input } => self.route_input(&context, input),
            Command::Monitor(scene) => self.register(&scene),
            Command::SceneDown(scene) => self.scene_down(&scene),
            Command::Info { reply } => {
                if reply.send(self.info()).is_err() {
                    trace!(viewport = %self.id, "info requester went away");
                }
            }
        }
    }

    #[instrument(skip(self, descriptor, args), fields(viewport = %self.id))]
    fn set_root(&mut self, descriptor: SceneDescriptor, args: Value) {
        self.hover = None;
        self.captures.clear();

        let swap = match self.root.install(descriptor, args) {
            Ok(swap) => swap,
            Err(err) => {
                warn!(%err, "set_root failed; keeping current root");
                return;
            }
        };
        let key = swap.installed.graph_key.clone();
        info!(root = %key, dynamic = swap.installed.dynamic, "root installed");
        self.drivers.broadcast(&DriverMsg::SetRoot(Some(key)));
        self.register(&swap.installed.scene);

        if let Some(previous) = swap.previous {
            if previous.scene.same_instance(&swap.installed.scene) {
                debug!("root re-installed; nothing to retire");
            } else {
                self.root.retire(previous);
            }
        }
    }

    fn driver_ready(&mut self, driver: DriverRef) {
        let id = driver.id();
        if self.drivers.add(driver.clone()) {
            info!(viewport = %self.id, driver = %id, "driver ready");
            self.watch_driver(&driver);
        }
        driver.send(DriverMsg::SetRoot(self.root.graph_key().cloned()));
    }

    /// Add `scene` to the directory and start watching it. A newer instance
    /// replaces the entry for its id.
    fn register(&mut self, scene: &SceneRef) {
        if self
            .scenes
            .get(scene.id())
            .is_some_and(|known| known.same_instance(scene))
        {
            return;
        }
        self.scenes.insert(scene.id().clone(), scene.clone());
        let mailbox = self.mailbox.clone();
        let scene = scene.clone();
        tokio::spawn(async move {
            scene.closed().await;
            if let Some(tx) = mailbox.upgrade() {
                let _ = tx.send(Command::SceneDown(scene));
            }
        });
    }

    fn watch_driver(&self, driver: &DriverRef) {
        let mailbox = self.mailbox.clone();
        let driver = driver.clone();
        tokio::spawn(async move {
            driver.closed().await;
            if let Some(tx) = mailbox.upgrade() {
                let _ = tx.send(Command::DriverStopped(driver.id()));
            }
        });
    }

    fn scene_down(&mut self, scene: &SceneRef) {
        if self
            .scenes
            .get(scene.id())
            .is_some_and(|s| s.same_instance(scene))
        {
            self.scenes.remove(scene.id());
        }
        let released = self.captures.release_all(scene);
        if self
            .hover
            .as_ref()
            .is_some_and(|h| h.scene.same_instance(scene))
        {
            self.hover = None;
        }
        if let Some(root) = self.root.clear_if(scene) {
            warn!(viewport = %self.id, root = %root.graph_key, "root scene died; viewport has no root");
            self.root.reap(&root);
            self.drivers.broadcast(&DriverMsg::SetRoot(None));
        } else {
            debug!(viewport = %self.id, scene = %scene.id(), released, "scene down");
        }
    }

    fn route_input(&mut self, origin: &TransformContext, input: Input) {
        let ty = input.input_type();
        let input = input.map_position(|p| origin.to_global(p));
        if let Input::ViewportReshape { width, height } = input {
            self.size = (width, height);
        }

        if let Some(capture) = self.captures.holder(ty) {
            let context = capture.context.clone();
            let local = input.map_position(|p| context.to_local(p));
            trace!(viewport = %self.id, %ty, scene = %capture.scene.id(), "captured input");
            capture.scene.send(SceneMsg::Input {
                input: local,
                context,
            });
            return;
        }

        let Some(point) = input.position() else {
            self.deliver_to_root(input);
            return;
        };
        let Some(root_context) = self.root.context() else {
            trace!(viewport = %self.id, %ty, "no root; input dropped");
            return;
        };

        let target = match hit_test(&*self.graphs, &root_context, point, self.config.max_depth) {
            HitOutcome::Hit(hit) => match self.scenes.get(&hit.scene) {
                Some(scene) => Some((scene.clone(), hit)),
                None => {
                    debug!(viewport = %self.id, scene = %hit.scene, "hit scene is not registered");
                    None
                }
            },
            HitOutcome::Miss => None,
            HitOutcome::DepthExceeded => {
                warn!(
                    viewport = %self.id,
                    max_depth = self.config.max_depth,
                    "hit-test exceeded depth bound; treating as miss"
                );
                None
            }
        };

        if ty == InputType::CursorPos {
            self.update_hover(target.as_ref());
        }

        match target {
            Some((scene, hit)) => {
                let local = input.map_position(|p| hit.context.to_local(p));
                scene.send(SceneMsg::Input {
                    input: local,
                    context: hit.context,
                });
            }
            None => match self.config.hit_miss {
                HitMissPolicy::Drop => trace!(viewport = %self.id, %ty, "hit-test miss; dropped"),
                HitMissPolicy::Root => self.deliver_to_root(input),
            },
        }
    }

    fn deliver_to_root(&self, input: Input) {
        match (self.root.current(), self.root.context()) {
            (Some(root), Some(context)) => {
                let local = input.map_position(|p| context.to_local(p));
                root.scene.send(SceneMsg::Input {
                    input: local,
                    context,
                });
            }
            _ => trace!(viewport = %self.id, "no root; input dropped"),
        }
    }

    fn update_hover(&mut self, target: Option<&(SceneRef, Hit)>) {
        let next = target.map(|(scene, hit)| Hover {
            scene: scene.clone(),
            hit: hit.clone(),
        });
        let unchanged = match (&self.hover, &next) {
            (Some(old), Some(new)) => old.target() == new.target(),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return;
        }
        if let Some(old) = self.hover.take() {
            old.exit();
        }
        if let Some(new) = &next {
            new.scene.send(SceneMsg::CursorEnter {
                primitive: new.hit.primitive,
                context: new.hit.context.clone(),
            });
        }
        self.hover = next;
    }

    fn info(&self) -> ViewPortInfo {
        ViewPortInfo {
            id: self.id,
            name: self.config.name.clone(),
            size: self.size,
            root: self.root.graph_key().cloned(),
            root_is_dynamic: self.root.current().is_some_and(|r| r.dynamic),
            drivers: self.drivers.ids(),
            captures: self.captures.snapshot(),
            hover: self.hover.as_ref().map(Hover::target),
            scenes: self.scenes.keys().cloned().collect(),
        }
    }
}
