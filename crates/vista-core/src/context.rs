// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Immutable transform contexts carried alongside input and activation.

use glam::{Affine2, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::graph::{GraphKey, PrimitiveId};

/// Identity of a viewport instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ViewPortId(pub u64);

impl fmt::Display for ViewPortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "viewport-{}", self.0)
    }
}

/// Accumulated coordinate transform of a scene plus the keys identifying it.
///
/// `forward` maps the context's local space into viewport space and `inverse`
/// maps back. The pair is only ever derived together, so it cannot drift. A
/// degenerate forward transform (zero scale) gets a NaN inverse; projected
/// points are then non-finite and never hit anything.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformContext {
    viewport: ViewPortId,
    graph_key: GraphKey,
    forward: Affine2,
    inverse: Affine2,
    node: Option<PrimitiveId>,
    external_id: Option<String>,
}

impl TransformContext {
    /// Identity context for `graph_key` within `viewport`.
    pub fn new(viewport: ViewPortId, graph_key: GraphKey) -> Self {
        Self {
            viewport,
            graph_key,
            forward: Affine2::IDENTITY,
            inverse: Affine2::IDENTITY,
            node: None,
            external_id: None,
        }
    }

    /// Same keys, different forward transform.
    #[must_use]
    pub fn with_transform(mut self, forward: Affine2) -> Self {
        self.forward = forward;
        self.inverse = invert(forward);
        self
    }

    /// Same transform, pointing at a specific primitive.
    #[must_use]
    pub fn with_node(mut self, node: PrimitiveId) -> Self {
        self.node = Some(node);
        self
    }

    /// Attach an application-defined identifier.
    #[must_use]
    pub fn with_external_id(mut self, id: impl Into<String>) -> Self {
        self.external_id = Some(id.into());
        self
    }

    /// Child context: `local` is applied inside the current transform.
    #[must_use]
    pub fn compose(&self, local: Affine2) -> Self {
        let forward = self.forward * local;
        Self {
            viewport: self.viewport,
            graph_key: self.graph_key.clone(),
            forward,
            inverse: invert(forward),
            node: self.node,
            external_id: self.external_id.clone(),
        }
    }

    /// Context for a nested graph reached through a component boundary.
    ///
    /// Keeps the accumulated transform; node and external id are reset.
    #[must_use]
    pub fn enter_graph(&self, graph_key: GraphKey) -> Self {
        Self {
            viewport: self.viewport,
            graph_key,
            forward: self.forward,
            inverse: self.inverse,
            node: None,
            external_id: None,
        }
    }

    /// Owning viewport.
    pub fn viewport(&self) -> ViewPortId {
        self.viewport
    }

    /// Graph this context refers to.
    pub fn graph_key(&self) -> &GraphKey {
        &self.graph_key
    }

    /// Local → viewport transform.
    pub fn forward(&self) -> Affine2 {
        self.forward
    }

    /// Viewport → local transform.
    pub fn inverse(&self) -> Affine2 {
        self.inverse
    }

    /// Primitive within the graph, if any.
    pub fn node(&self) -> Option<PrimitiveId> {
        self.node
    }

    /// Application-defined identifier, if any.
    pub fn external_id(&self) -> Option<&str> {
        self.external_id.as_deref()
    }

    /// Project a viewport-space point into local space.
    pub fn to_local(&self, point: Vec2) -> Vec2 {
        self.inverse.transform_point2(point)
    }

    /// Project a local point into viewport space.
    pub fn to_global(&self, point: Vec2) -> Vec2 {
        self.forward.transform_point2(point)
    }
}

fn invert(forward: Affine2) -> Affine2 {
    let inverse = forward.inverse();
    if inverse.is_finite() {
        inverse
    } else {
        Affine2::NAN
    }
}
