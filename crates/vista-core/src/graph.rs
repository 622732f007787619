// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Graph identity and the read-only graph model consulted by hit-testing.
//!
//! Scenes own their graphs and publish them into some store; the viewport only
//! ever reads structure (for hit-testing) and never writes it. Storage is an
//! adapter concern behind [`GraphSource`].

use glam::{Affine2, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Identifier of a primitive inside a single graph.
pub type PrimitiveId = u32;

/// Textual reference naming a scene.
///
/// Statically supervised scenes are named by the application; dynamically
/// started scenes receive their reference from the supervisor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SceneId(String);

impl SceneId {
    /// Wrap a scene reference.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the reference text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SceneId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SceneId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Composite key naming one scene's current graph: `(graph, scene, sub-id)`.
///
/// The kind component is always "graph"; it is carried by the type rather than
/// stored. Displays as `graph:<scene>` or `graph:<scene>/<sub>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GraphKey {
    scene: SceneId,
    sub: Option<String>,
}

impl GraphKey {
    /// Reserved scene reference for the viewport itself (above any root).
    pub const VIEWPORT_SCENE: &'static str = "$viewport";

    /// Key for a scene's primary graph (no sub-identifier).
    pub fn new(scene: impl Into<SceneId>) -> Self {
        Self {
            scene: scene.into(),
            sub: None,
        }
    }

    /// Key for a named secondary graph of a scene.
    pub fn with_sub(scene: impl Into<SceneId>, sub: impl Into<String>) -> Self {
        Self {
            scene: scene.into(),
            sub: Some(sub.into()),
        }
    }

    /// Key used by drivers for device-level contexts.
    pub fn viewport() -> Self {
        Self::new(Self::VIEWPORT_SCENE)
    }

    /// Scene component of the key.
    pub fn scene(&self) -> &SceneId {
        &self.scene
    }

    /// Optional sub-identifier.
    pub fn sub(&self) -> Option<&str> {
        self.sub.as_deref()
    }
}

impl fmt::Display for GraphKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sub {
            Some(sub) => write!(f, "graph:{}/{}", self.scene, sub),
            None => write!(f, "graph:{}", self.scene),
        }
    }
}

/// Axis-aligned rectangle in a primitive's local space.
///
/// Invariant: `min` components are less than or equal to `max` components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    min: Vec2,
    max: Vec2,
}

impl Bounds {
    /// Rectangle from an origin and a size; negative sizes are normalized.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::from_corners(Vec2::new(x, y), Vec2::new(x + width, y + height))
    }

    /// Rectangle spanning two arbitrary corners.
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Minimum corner.
    pub fn min(&self) -> Vec2 {
        self.min
    }

    /// Maximum corner.
    pub fn max(&self) -> Vec2 {
        self.max
    }

    /// Inclusive containment; non-finite points are never contained.
    pub fn contains(&self, p: Vec2) -> bool {
        p.is_finite()
            && p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
    }
}

/// What a primitive is, as far as input routing cares.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveSpec {
    /// Ordered children; later children draw on top of earlier ones.
    Group(Vec<PrimitiveId>),
    /// Hit-testable leaf.
    Rect(Bounds),
    /// Reference to another scene's graph (a scene boundary).
    Component(GraphKey),
}

/// One node of a graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    /// Identifier within the owning graph.
    pub id: PrimitiveId,
    /// Local → parent transform, identity when absent.
    pub transform: Option<Affine2>,
    /// Node payload.
    pub spec: PrimitiveSpec,
}

/// Id-addressed primitive tree rooted at [`Graph::ROOT`].
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    primitives: BTreeMap<PrimitiveId, Primitive>,
    next_id: PrimitiveId,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Id of the root group.
    pub const ROOT: PrimitiveId = 0;

    /// Graph holding only an empty root group.
    pub fn new() -> Self {
        let mut primitives = BTreeMap::new();
        primitives.insert(
            Self::ROOT,
            Primitive {
                id: Self::ROOT,
                transform: None,
                spec: PrimitiveSpec::Group(Vec::new()),
            },
        );
        Self {
            primitives,
            next_id: Self::ROOT + 1,
        }
    }

    /// Append a primitive under `parent`.
    ///
    /// Returns `None` when `parent` is missing or is not a group.
    pub fn add(
        &mut self,
        parent: PrimitiveId,
        spec: PrimitiveSpec,
        transform: Option<Affine2>,
    ) -> Option<PrimitiveId> {
        let id = self.next_id;
        match self.primitives.get_mut(&parent).map(|p| &mut p.spec) {
            Some(PrimitiveSpec::Group(children)) => children.push(id),
            _ => return None,
        }
        self.next_id += 1;
        self.primitives.insert(
            id,
            Primitive {
                id,
                transform,
                spec,
            },
        );
        Some(id)
    }

    /// Append a rectangle leaf.
    pub fn add_rect(&mut self, parent: PrimitiveId, bounds: Bounds) -> Option<PrimitiveId> {
        self.add(parent, PrimitiveSpec::Rect(bounds), None)
    }

    /// Append an empty group with an optional transform.
    pub fn add_group(
        &mut self,
        parent: PrimitiveId,
        transform: Option<Affine2>,
    ) -> Option<PrimitiveId> {
        self.add(parent, PrimitiveSpec::Group(Vec::new()), transform)
    }

    /// Append a reference to another scene's graph.
    pub fn add_component(
        &mut self,
        parent: PrimitiveId,
        key: GraphKey,
        transform: Option<Affine2>,
    ) -> Option<PrimitiveId> {
        self.add(parent, PrimitiveSpec::Component(key), transform)
    }

    /// Replace a primitive's local transform. Returns false if absent.
    pub fn set_transform(&mut self, id: PrimitiveId, transform: Option<Affine2>) -> bool {
        match self.primitives.get_mut(&id) {
            Some(p) => {
                p.transform = transform;
                true
            }
            None => false,
        }
    }

    /// Look up a primitive.
    pub fn get(&self, id: PrimitiveId) -> Option<&Primitive> {
        self.primitives.get(&id)
    }

    /// Number of primitives, root included.
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    /// True when only the root group exists and it has no children.
    pub fn is_empty(&self) -> bool {
        self.primitives.len() == 1
    }
}

/// Read-only port onto wherever scenes publish their graphs.
pub trait GraphSource: Send + Sync {
    /// Latest graph for `key`, if one has been published.
    fn graph(&self, key: &GraphKey) -> Option<Arc<Graph>>;
}

/// Process-local graph store.
#[derive(Debug, Default)]
pub struct MemoryGraphStore {
    graphs: RwLock<HashMap<GraphKey, Arc<Graph>>>,
}

impl MemoryGraphStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish (or replace) the graph for `key`.
    pub fn put(&self, key: GraphKey, graph: Graph) {
        self.graphs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Arc::new(graph));
    }

    /// Remove the graph for `key`, returning it if present.
    pub fn delete(&self, key: &GraphKey) -> Option<Arc<Graph>> {
        self.graphs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }
}

impl GraphSource for MemoryGraphStore {
    fn graph(&self, key: &GraphKey) -> Option<Arc<Graph>> {
        self.graphs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}
