// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Headless viewport host: one viewport, a demo panel scene, a scripted driver.

use anyhow::Result;
use clap::Parser;
use glam::{Affine2, Vec2};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use vista_config_fs::FsConfigStore;
use vista_core::config::{ConfigService, ViewPortConfig};
use vista_core::{
    Action, Bounds, Driver, DriverMsg, DriverRef, DynamicScene, Graph, GraphKey, Input,
    MemoryGraphStore, Modifiers, MouseButton, PrimitiveId, Scene, SceneId, TaskSupervisor,
    TransformContext, ViewPort,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless Vista viewport host")]
struct Args {
    /// Directory holding viewport.json (defaults to the platform config dir)
    #[arg(long)]
    config_dir: Option<PathBuf>,
    /// Label shown by the demo panel
    #[arg(long, default_value = "hello")]
    label: String,
    /// Do not replay the pointer script when a root is installed
    #[arg(long)]
    no_script: bool,
}

const PANEL_MODULE: &str = "panel";

/// Load the viewport config, persisting defaults on first run. Store
/// failures are logged and fall back to defaults.
fn load_config(dir: Option<&Path>) -> ViewPortConfig {
    let store = match dir {
        Some(dir) => FsConfigStore::with_base(dir),
        None => FsConfigStore::new(),
    };
    match store {
        Ok(store) => ConfigService::new(store).load_or_init(ViewPortConfig::KEY),
        Err(err) => {
            warn!(?err, "config store unavailable; using defaults");
            ViewPortConfig::default()
        }
    }
}

/// Publishes a single-button graph under its own key while active.
struct PanelScene {
    id: SceneId,
    label: String,
    graphs: Arc<MemoryGraphStore>,
    button: Option<PrimitiveId>,
}

impl PanelScene {
    fn new(id: &SceneId, init: Value, graphs: Arc<MemoryGraphStore>) -> Self {
        let label = init
            .get("label")
            .and_then(Value::as_str)
            .unwrap_or("panel")
            .to_string();
        Self {
            id: id.clone(),
            label,
            graphs,
            button: None,
        }
    }
}

impl Scene for PanelScene {
    fn activate(&mut self, args: Value, context: TransformContext) {
        let mut graph = Graph::new();
        self.button = graph.add_rect(Graph::ROOT, Bounds::new(20.0, 20.0, 160.0, 60.0));
        self.graphs.put(context.graph_key().clone(), graph);
        info!(scene = %self.id, label = %self.label, %args, "panel activated");
    }

    fn deactivate(&mut self) {
        self.graphs.delete(&GraphKey::new(self.id.clone()));
        info!(scene = %self.id, "panel deactivated");
    }

    fn input(&mut self, input: Input, context: TransformContext) {
        let on_button = self.button.is_some() && context.node() == self.button;
        info!(scene = %self.id, ?input, on_button, "panel input");
    }

    fn cursor_enter(&mut self, primitive: PrimitiveId, _context: TransformContext) {
        debug!(scene = %self.id, primitive, "hover enter");
    }

    fn cursor_exit(&mut self, primitive: PrimitiveId, _context: TransformContext) {
        debug!(scene = %self.id, primitive, "hover exit");
    }
}

/// Replays a fixed input script through the viewport each time a root is set.
struct ScriptedDriver {
    device: Affine2,
    script: Vec<Input>,
}

impl ScriptedDriver {
    fn pointer_walk() -> Vec<Input> {
        let over = Vec2::new(60.0, 40.0);
        let click = |action| Input::CursorButton {
            button: MouseButton::Left,
            action,
            mods: Modifiers::default(),
            pos: over,
        };
        vec![
            Input::ViewportEnter,
            Input::CursorPos(over),
            click(Action::Press),
            click(Action::Release),
            Input::CursorPos(Vec2::new(500.0, 400.0)),
            Input::ViewportExit,
        ]
    }
}

impl Driver for ScriptedDriver {
    async fn run(
        self,
        viewport: ViewPort,
        me: DriverRef,
        mut inbox: mpsc::UnboundedReceiver<DriverMsg>,
    ) {
        if viewport.driver_ready(&me).is_err() {
            return;
        }
        let context = viewport.device_context(self.device);
        while let Some(msg) = inbox.recv().await {
            match msg {
                DriverMsg::SetRoot(Some(root)) => {
                    info!(driver = %me.id(), %root, "rendering root");
                    for input in &self.script {
                        if viewport.input(&context, input.clone()).is_err() {
                            break;
                        }
                    }
                }
                DriverMsg::SetRoot(None) => info!(driver = %me.id(), "no root to render"),
                DriverMsg::Cast(message) => debug!(driver = %me.id(), %message, "driver cast"),
                DriverMsg::Stop => break,
            }
        }
        let _ = viewport.driver_stopped(me.id());
        info!(driver = %me.id(), "driver exiting");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();
    let args = Args::parse();

    let config = load_config(args.config_dir.as_deref());
    let graphs = Arc::new(MemoryGraphStore::new());
    let panel_graphs = Arc::clone(&graphs);
    let supervisor = TaskSupervisor::new().with_module(PANEL_MODULE, move |id: &SceneId, init| {
        PanelScene::new(id, init, Arc::clone(&panel_graphs))
    });

    let (viewport, coordinator) = ViewPort::start(config, Arc::new(supervisor), graphs);
    let script = if args.no_script {
        Vec::new()
    } else {
        ScriptedDriver::pointer_walk()
    };
    let (driver, driver_task) = viewport.start_driver(ScriptedDriver {
        device: Affine2::IDENTITY,
        script,
    });

    viewport.set_root(
        DynamicScene::new(PANEL_MODULE, json!({ "label": args.label })),
        json!({ "started_by": "vista-host" }),
    )?;
    info!(viewport = %viewport.id(), "viewport host running; ctrl-c to stop");

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    viewport.stop_driver(driver.id())?;
    let _ = driver_task.await;
    drop(viewport);
    let _ = coordinator.await;
    Ok(())
}
