// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Small graph layouts used across viewport tests.

use glam::{Affine2, Vec2};
use vista_core::{Bounds, Graph, GraphKey, MemoryGraphStore, PrimitiveId, SceneId};

/// Offset of the left panel inside the root graph.
pub const LEFT_ORIGIN: Vec2 = Vec2::new(10.0, 10.0);
/// Offset of the right panel inside the root graph.
pub const RIGHT_ORIGIN: Vec2 = Vec2::new(200.0, 10.0);
/// Side length of each panel's button.
pub const BUTTON_SIZE: f32 = 100.0;

/// Primitive ids of a published [`split`] layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitLayout {
    /// Full-size background rectangle in the root graph.
    pub background: PrimitiveId,
    /// Button in the left panel's graph.
    pub left_button: PrimitiveId,
    /// Button in the right panel's graph.
    pub right_button: PrimitiveId,
}

/// Publish a 400x300 root graph for `root` with a background rectangle and
/// two components, `left` at [`LEFT_ORIGIN`] and `right` at [`RIGHT_ORIGIN`].
/// Each panel graph holds one `BUTTON_SIZE` square at its origin.
///
/// Returns `None` only if the graph builder rejects a parent, which the
/// fixed layout never does.
pub fn split(
    store: &MemoryGraphStore,
    root: &SceneId,
    left: &SceneId,
    right: &SceneId,
) -> Option<SplitLayout> {
    let mut graph = Graph::new();
    let background = graph.add_rect(Graph::ROOT, Bounds::new(0.0, 0.0, 400.0, 300.0))?;
    graph.add_component(
        Graph::ROOT,
        GraphKey::new(left.clone()),
        Some(Affine2::from_translation(LEFT_ORIGIN)),
    )?;
    graph.add_component(
        Graph::ROOT,
        GraphKey::new(right.clone()),
        Some(Affine2::from_translation(RIGHT_ORIGIN)),
    )?;
    store.put(GraphKey::new(root.clone()), graph);

    let left_button = button(store, left)?;
    let right_button = button(store, right)?;
    Some(SplitLayout {
        background,
        left_button,
        right_button,
    })
}

fn button(store: &MemoryGraphStore, scene: &SceneId) -> Option<PrimitiveId> {
    let mut graph = Graph::new();
    let id = graph.add_rect(Graph::ROOT, Bounds::new(0.0, 0.0, BUTTON_SIZE, BUTTON_SIZE))?;
    store.put(GraphKey::new(scene.clone()), graph);
    Some(id)
}
