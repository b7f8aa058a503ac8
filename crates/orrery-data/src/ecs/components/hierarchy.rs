// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use orrery_core::math::Mat4;
use serde::{Deserialize, Serialize};

use crate::ecs::Entity;

/// A parent link, stored only on the child.
///
/// There are no child-list back-pointers anywhere; children of an entity
/// are discovered by scanning the hierarchy table. Per-frame propagation
/// never traverses pointers at all — it relies on the hierarchy manager's
/// dense order keeping every parent record ahead of its children's
/// records, an invariant the attach operation maintains by reordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyComponent {
    /// The parent entity this child follows.
    pub parent_id: Entity,
    /// The child's own layer mask captured at attach time, restored on
    /// detach; the effective mask while attached is this AND the parent's.
    pub layer_mask_bind: u32,
    /// Inverse of the parent's world matrix at attach time. Composing it
    /// into propagation makes "keep the child where it was in world space
    /// when attached" the default binding behavior; identity means the
    /// child's local SRT is already expressed in the parent's space.
    pub inverse_parent_bind: Mat4,
}

impl Default for HierarchyComponent {
    fn default() -> Self {
        Self {
            parent_id: Entity::INVALID,
            layer_mask_bind: u32::MAX,
            inverse_parent_bind: Mat4::IDENTITY,
        }
    }
}
