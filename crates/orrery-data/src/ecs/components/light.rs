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

use orrery_core::math::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// The shape of a light source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LightKind {
    /// Sun-like light with parallel rays; position is irrelevant.
    Directional,
    /// Omnidirectional light with a finite range.
    #[default]
    Point,
    /// Cone light along the entity's axis, with a finite range.
    Spot,
}

/// A light source placed by the entity's transform.
///
/// The per-kind derivation pass recomputes the world-space fields and the
/// light's culling bounds from the transform every frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightComponent {
    /// The light's shape.
    pub kind: LightKind,
    /// Linear RGB color.
    pub color: Vec3,
    /// Radiant energy scale applied to the color.
    pub energy: f32,
    /// Influence radius for point and spot lights, in world units.
    pub range: f32,
    /// Derived: world-space position.
    #[serde(skip)]
    pub position: Vec3,
    /// Derived: world-space rotation.
    #[serde(skip)]
    pub rotation: Quat,
    /// Derived: per-axis scale of the world matrix.
    #[serde(skip, default = "default_scale")]
    pub scale: Vec3,
    /// Derived: unit emission axis (the world-transformed +Y axis).
    #[serde(skip, default = "default_direction")]
    pub direction: Vec3,
    /// Derived: influence radius in world units, the authored range scaled
    /// by the largest axis scale.
    #[serde(skip)]
    pub range_world: f32,
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

fn default_direction() -> Vec3 {
    Vec3::Y
}

impl Default for LightComponent {
    fn default() -> Self {
        Self {
            kind: LightKind::Point,
            color: Vec3::ONE,
            energy: 1.0,
            range: 10.0,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            direction: Vec3::Y,
            range_world: 0.0,
        }
    }
}
