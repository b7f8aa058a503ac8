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

//! The per-frame update passes, as free functions over component columns.
//!
//! [`Scene::update`](crate::Scene::update) runs them in a fixed order each
//! tick; the order carries the data dependencies:
//!
//! 1. animation sampling (sequential; writes local SRT only),
//! 2. previous-frame world matrix capture (parallel),
//! 3. local matrix refresh for dirty transforms (parallel),
//! 4. hierarchy propagation (sequential; parents strictly before children),
//! 5. skinning palettes and rig bounds (parallel, one job per armature),
//! 6. object bounds and the scene-wide folds (sequential),
//! 7. per-kind derivations for cameras, lights, decals, probes and
//!    emitters (parallel, mutually independent).
//!
//! Parallel passes fan out over a [`JobScope`](orrery_core::JobScope) and
//! write disjoint dense slots; each pass finishes before the next pass that
//! reads its output starts. Every pass tolerates absent optional
//! components by skipping the entity.

mod animation;
mod armature;
mod bounds;
mod camera;
mod decal;
mod emitter;
mod hierarchy;
mod light;
mod probe;
mod transform;

pub use animation::run_animation_update;
pub use armature::run_armature_update;
pub use bounds::{run_object_update, ScenePassOutputs};
pub use camera::run_camera_update;
pub use decal::run_decal_update;
pub use emitter::run_emitter_update;
pub use hierarchy::run_hierarchy_update;
pub use light::run_light_update;
pub use probe::run_probe_update;
pub use transform::{run_previous_frame_transform_update, run_transform_update};
