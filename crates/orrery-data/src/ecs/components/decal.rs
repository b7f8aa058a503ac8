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

use orrery_core::math::{Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// A projected surface marker (bullet hole, splatter, stain).
///
/// A decal projects a unit box through the entity's transform: the
/// transform's scale stretches the box, its -Z axis is the projection
/// direction. The per-kind derivation pass refreshes the world-space
/// fields every frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecalComponent {
    /// Tint applied by the renderer.
    pub color: Vec4,
    /// Derived: the projection box's world matrix.
    #[serde(skip)]
    pub world: Mat4,
    /// Derived: world-space position of the box's center.
    #[serde(skip)]
    pub position: Vec3,
    /// Derived: world-space projection direction.
    #[serde(skip, default = "default_front")]
    pub front: Vec3,
    /// Derived: conservative world-space radius of the projection box.
    #[serde(skip)]
    pub range: f32,
}

fn default_front() -> Vec3 {
    Vec3::NEG_Z
}

impl Default for DecalComponent {
    fn default() -> Self {
        Self {
            color: Vec4::ONE,
            world: Mat4::IDENTITY,
            position: Vec3::ZERO,
            front: Vec3::NEG_Z,
            range: 0.0,
        }
    }
}
