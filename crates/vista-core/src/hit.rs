// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Top-down hit-testing across the graph-of-graphs.
//!
//! The walk starts at the root graph's root primitive with the root context,
//! composes each primitive's local transform on the way down, and tests group
//! children topmost-first. The first rectangle containing the projected point
//! wins. Components switch to the referenced graph and build a new context for
//! it, so the winner's context carries the full accumulated transform.
//!
//! Every primitive level counts toward the depth bound, including levels in
//! nested graphs. Exceeding it aborts the walk; callers treat that as a miss.

use glam::Vec2;

use crate::context::TransformContext;
use crate::graph::{Graph, GraphSource, PrimitiveId, PrimitiveSpec, SceneId};

/// Winning target of a hit-test.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    /// Scene owning the graph the primitive lives in.
    pub scene: SceneId,
    /// Primitive that contained the point.
    pub primitive: PrimitiveId,
    /// Accumulated context of the primitive (node set).
    pub context: TransformContext,
}

/// Result of [`hit_test`].
#[derive(Debug, Clone, PartialEq)]
pub enum HitOutcome {
    /// A primitive contains the point.
    Hit(Hit),
    /// Nothing contains the point.
    Miss,
    /// The walk went deeper than the bound allows.
    DepthExceeded,
}

struct TooDeep;

/// Find the topmost primitive under `point` (viewport space), starting at
/// `root`'s graph. `max_depth` bounds the number of primitive levels visited.
pub fn hit_test(
    graphs: &dyn GraphSource,
    root: &TransformContext,
    point: Vec2,
    max_depth: usize,
) -> HitOutcome {
    let walker = Walker {
        graphs,
        point,
        max_depth,
    };
    match walker.graph(root, 1) {
        Ok(Some(hit)) => HitOutcome::Hit(hit),
        Ok(None) => HitOutcome::Miss,
        Err(TooDeep) => HitOutcome::DepthExceeded,
    }
}

struct Walker<'a> {
    graphs: &'a dyn GraphSource,
    point: Vec2,
    max_depth: usize,
}

impl Walker<'_> {
    fn graph(&self, context: &TransformContext, depth: usize) -> Result<Option<Hit>, TooDeep> {
        let Some(graph) = self.graphs.graph(context.graph_key()) else {
            return Ok(None);
        };
        self.primitive(&graph, Graph::ROOT, context, depth)
    }

    fn primitive(
        &self,
        graph: &Graph,
        id: PrimitiveId,
        parent: &TransformContext,
        depth: usize,
    ) -> Result<Option<Hit>, TooDeep> {
        if depth > self.max_depth {
            return Err(TooDeep);
        }
        let Some(primitive) = graph.get(id) else {
            return Ok(None);
        };
        let context = match primitive.transform {
            Some(local) => parent.compose(local),
            None => parent.clone(),
        };
        match &primitive.spec {
            PrimitiveSpec::Rect(bounds) => {
                if bounds.contains(context.to_local(self.point)) {
                    Ok(Some(Hit {
                        scene: context.graph_key().scene().clone(),
                        primitive: id,
                        context: context.with_node(id),
                    }))
                } else {
                    Ok(None)
                }
            }
            PrimitiveSpec::Group(children) => {
                for &child in children.iter().rev() {
                    if let Some(hit) = self.primitive(graph, child, &context, depth + 1)? {
                        return Ok(Some(hit));
                    }
                }
                Ok(None)
            }
            PrimitiveSpec::Component(key) => {
                self.graph(&context.enter_graph(key.clone()), depth + 1)
            }
        }
    }
}
