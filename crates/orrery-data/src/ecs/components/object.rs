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

use orrery_core::math::Vec3;
use serde::{Deserialize, Serialize};

use crate::ecs::Entity;

/// A renderable instance: the pairing of a placement (the entity's
/// transform) with a mesh.
///
/// The bounds pass fills in the derived fields every frame: `skinned`
/// mirrors the referenced mesh's armature link, `dynamic` is latched on
/// for skinned objects, and `center` is the world-space midpoint of the
/// object's bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectComponent {
    /// The mesh entity this object instances.
    pub mesh_id: Entity,
    /// Whether the object should be drawn at all.
    pub renderable: bool,
    /// Whether the object moves at runtime; dynamic objects get a
    /// previous-frame transform snapshot for motion consumers.
    pub dynamic: bool,
    /// Marks this object as wanting a planar reflection; the bounds pass
    /// derives the shared reflection plane from the last such object.
    pub request_planar_reflection: bool,
    /// Derived: whether the referenced mesh is armature-deformed.
    #[serde(skip)]
    pub skinned: bool,
    /// Derived: world-space center of the object's bounds.
    #[serde(skip)]
    pub center: Vec3,
}

impl Default for ObjectComponent {
    fn default() -> Self {
        Self {
            mesh_id: Entity::INVALID,
            renderable: true,
            dynamic: false,
            request_planar_reflection: false,
            skinned: false,
            center: Vec3::ZERO,
        }
    }
}
