// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Vista core: the viewport coordinator that sits between scenes and drivers.
#![forbid(unsafe_code)]
//!
//! A [`ViewPort`] owns the root scene, the set of registered drivers, the
//! input capture table and the hover state. Drivers push raw input in; the
//! viewport resolves each event against the published scene graphs and
//! delivers it, projected into local coordinates, to exactly one scene.
//!
//! # Modules
//!
//! - [`context`] - transform contexts and viewport identity
//! - [`graph`] - scene graphs, graph keys and the read-only graph source
//! - [`hit`] - hit-testing across nested graphs
//! - [`input`] - input events and their types
//! - [`scene`] - scene contract, handles and task runner
//! - [`driver`] - driver contract, handles and the driver registry
//! - [`capture`] - input capture table
//! - [`supervisor`] - dynamic scene supervision
//! - [`root`] - root scene descriptors and state
//! - [`viewport`] - the coordinator
//! - [`config`] - viewport settings and the config storage port

pub mod capture;
pub mod config;
pub mod context;
pub mod driver;
pub mod graph;
pub mod hit;
pub mod input;
pub mod root;
pub mod scene;
pub mod supervisor;
pub mod viewport;

pub use capture::{Capture, CaptureTable};
pub use config::{ConfigError, ConfigService, ConfigStore, HitMissPolicy, ViewPortConfig};
pub use context::{TransformContext, ViewPortId};
pub use driver::{Driver, DriverId, DriverMsg, DriverRef, DriverRegistry};
pub use graph::{
    Bounds, Graph, GraphKey, GraphSource, MemoryGraphStore, Primitive, PrimitiveId,
    PrimitiveSpec, SceneId,
};
pub use hit::{hit_test, Hit, HitOutcome};
pub use input::{Action, Input, InputType, Modifiers, MouseButton};
pub use root::{RootState, SceneDescriptor};
pub use scene::{spawn_scene, Deactivation, PendingDeactivation, Scene, SceneMsg, SceneRef};
pub use supervisor::{
    DynamicScene, NoSupervisor, SceneFactory, SceneSupervisor, SupervisorError, TaskSupervisor,
};
pub use viewport::{HoverTarget, ViewPort, ViewPortError, ViewPortInfo};
