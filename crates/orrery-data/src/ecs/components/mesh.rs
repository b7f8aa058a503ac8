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

use orrery_core::math::Aabb;
use serde::{Deserialize, Serialize};

use crate::ecs::Entity;

/// The shared shape data the pipeline needs from a mesh: its local-space
/// bounds and an optional link to the armature that deforms it.
///
/// Geometry itself (vertex and index buffers) belongs to the rendering
/// side and is not stored here. Several objects may reference the same
/// mesh entity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeshComponent {
    /// Bounds of the undeformed geometry in mesh-local space.
    pub bounds: Aabb,
    /// The armature deforming this mesh, or [`Entity::INVALID`] for rigid
    /// meshes.
    pub armature_id: Entity,
}

impl MeshComponent {
    /// Whether this mesh is deformed by an armature.
    pub fn is_skinned(&self) -> bool {
        self.armature_id.is_valid()
    }
}
