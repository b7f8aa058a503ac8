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

use orrery_core::math::{Aabb, Mat4};
use serde::{Deserialize, Serialize};

use crate::ecs::Entity;

/// A skinning rig: an ordered bone collection with the inverse bind
/// matrices that map mesh-space vertices into each bone's rest space.
///
/// Bones are ordinary entities whose transforms carry the `Bone` kind and
/// participate in hierarchy propagation like any other node. The skinning
/// pass combines their world matrices into `bone_data`, expressed relative
/// to the armature entity's own placement so one rig result can deform
/// instanced copies of the mesh.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArmatureComponent {
    /// Bone entities, in the order the skin's vertex weights index them.
    pub bones: Vec<Entity>,
    /// One inverse bind matrix per bone, parallel to `bones`.
    pub inverse_bind_matrices: Vec<Mat4>,
    /// Derived: the per-bone skinning palette rebuilt every frame.
    #[serde(skip)]
    pub bone_data: Vec<Mat4>,
    /// Derived: conservative bounds of the posed rig, in world space.
    #[serde(skip)]
    pub aabb: Aabb,
}
