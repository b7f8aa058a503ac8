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

use orrery_core::jobs::SMALL_SUBTASK_GROUPSIZE;
use orrery_core::math::{Aabb, Vec3};
use orrery_core::{JobScope, SharedSlice};
use orrery_data::ecs::components::{EnvironmentProbeComponent, TransformComponent};
use orrery_data::ecs::ComponentManager;

/// Places every environment probe's influence box in world space.
///
/// The capture position is the transform's world translation; the inverse
/// world matrix maps world-space points back into the unit influence box
/// for parallax-corrected lookups; the culling bounds are the unit box
/// pushed through the world matrix. Probes without a transform are skipped.
pub fn run_probe_update<'env>(
    scope: &JobScope<'_, 'env>,
    transforms: &'env ComponentManager<TransformComponent>,
    probes: &'env mut ComponentManager<EnvironmentProbeComponent>,
    aabb_probes: &'env mut ComponentManager<Aabb>,
) {
    assert_eq!(
        probes.len(),
        aabb_probes.len(),
        "probe and probe-bounds columns must stay paired"
    );

    let (entities, components) = probes.dense_parts_mut();
    let probe_slice = SharedSlice::new(components);
    let aabb_slice = SharedSlice::new(aabb_probes.components_mut());

    scope.dispatch(
        probe_slice.len() as u32,
        SMALL_SUBTASK_GROUPSIZE,
        move |args| {
            let i = args.job_index as usize;
            // SAFETY: one job invocation per dense index, on both columns;
            // slots never overlap.
            let probe = unsafe { probe_slice.get_mut(i) };
            let aabb = unsafe { aabb_slice.get_mut(i) };
            let Some(transform) = transforms.get_by_entity(entities[i]) else {
                return;
            };

            probe.position = transform.position();
            probe.inverse_world = transform.world.inverse();
            let (scale, _, _) = transform.world.to_scale_rotation_translation();
            probe.range = scale.max_element() * 2.0;

            *aabb =
                Aabb::from_center_half_extents(Vec3::ZERO, Vec3::ONE).transform(&transform.world);
        },
    );
}
