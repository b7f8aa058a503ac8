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

/// A particle emitter's CPU-side state.
///
/// The per-kind derivation pass steps the emission budget each frame:
/// `accumulated` grows by `rate * dt`, whole particles are handed to the
/// particle backend as `burst`, and the fractional remainder is carried
/// over. Particle simulation itself lives outside this core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmitterComponent {
    /// Particles to emit per second.
    pub rate: f32,
    /// Fractional emission budget carried between frames.
    pub accumulated: f32,
    /// Derived: whole particles to spawn this frame.
    #[serde(skip)]
    pub burst: u32,
    /// Derived: world-space emission origin.
    #[serde(skip)]
    pub center: Vec3,
}

impl Default for EmitterComponent {
    fn default() -> Self {
        Self {
            rate: 10.0,
            accumulated: 0.0,
            burst: 0,
            center: Vec3::ZERO,
        }
    }
}
