// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Exclusive per-input-type claims that bypass hit-testing.

use std::collections::BTreeMap;

use crate::context::TransformContext;
use crate::graph::SceneId;
use crate::input::InputType;
use crate::scene::SceneRef;

/// Current holder of a captured input type.
#[derive(Debug, Clone)]
pub struct Capture {
    /// Capturing scene.
    pub scene: SceneRef,
    /// Context supplied at capture time; positions are projected with it.
    pub context: TransformContext,
}

/// Mapping from input type to the scene that captured it.
#[derive(Debug, Default)]
pub struct CaptureTable {
    entries: BTreeMap<InputType, Capture>,
}

impl CaptureTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim every type in `types` for `scene`, replacing any previous holder.
    pub fn capture(&mut self, scene: &SceneRef, context: &TransformContext, types: &[InputType]) {
        for &ty in types {
            self.entries.insert(
                ty,
                Capture {
                    scene: scene.clone(),
                    context: context.clone(),
                },
            );
        }
    }

    /// Drop the entries in `types` that `scene` holds; others are untouched.
    ///
    /// Returns how many entries were removed.
    pub fn release(&mut self, scene: &SceneRef, types: &[InputType]) -> usize {
        let mut removed = 0;
        for ty in types {
            let held = self
                .entries
                .get(ty)
                .is_some_and(|c| c.scene.same_instance(scene));
            if held {
                self.entries.remove(ty);
                removed += 1;
            }
        }
        removed
    }

    /// Drop everything `scene` holds.
    pub fn release_all(&mut self, scene: &SceneRef) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, c| !c.scene.same_instance(scene));
        before - self.entries.len()
    }

    /// Holder of `ty`, if captured.
    pub fn holder(&self, ty: InputType) -> Option<&Capture> {
        self.entries.get(&ty)
    }

    /// Forget all captures.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of captured types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is captured.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Input type → holder id view, for diagnostics.
    pub fn snapshot(&self) -> BTreeMap<InputType, SceneId> {
        self.entries
            .iter()
            .map(|(ty, c)| (*ty, c.scene.id().clone()))
            .collect()
    }
}
