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

use orrery_core::math::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// An environment probe capturing its surroundings from a point.
///
/// The probe's influence volume is a unit box pushed through the entity's
/// transform; `inverse_world` maps world-space points back into that box
/// for parallax-corrected lookups. All fields are derived from the
/// transform every frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentProbeComponent {
    /// Derived: world-space capture position.
    #[serde(skip)]
    pub position: Vec3,
    /// Derived: conservative world-space radius of the influence box.
    #[serde(skip)]
    pub range: f32,
    /// Derived: inverse of the influence box's world matrix.
    #[serde(skip)]
    pub inverse_world: Mat4,
}

impl Default for EnvironmentProbeComponent {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            range: 0.0,
            inverse_world: Mat4::IDENTITY,
        }
    }
}
