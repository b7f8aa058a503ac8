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
use orrery_data::ecs::components::{LightComponent, LightKind, TransformComponent};
use orrery_data::ecs::ComponentManager;

/// Half extent of the culling box given to lights that reach everywhere.
const UNBOUNDED_HALF_EXTENT: f32 = 10_000.0;

/// Derives every light's world-space placement and culling bounds from its
/// transform.
///
/// Position, rotation and scale come from decomposing the world matrix; the
/// emission axis is the world-transformed +Y axis, and the authored range
/// is scaled into world units by the largest axis scale. Point and spot
/// lights get a range-sized box around their position; directional lights
/// get a practically unbounded one. Lights without a transform are skipped.
pub fn run_light_update<'env>(
    scope: &JobScope<'_, 'env>,
    transforms: &'env ComponentManager<TransformComponent>,
    lights: &'env mut ComponentManager<LightComponent>,
    aabb_lights: &'env mut ComponentManager<Aabb>,
) {
    assert_eq!(
        lights.len(),
        aabb_lights.len(),
        "light and light-bounds columns must stay paired"
    );

    let (entities, components) = lights.dense_parts_mut();
    let light_slice = SharedSlice::new(components);
    let aabb_slice = SharedSlice::new(aabb_lights.components_mut());

    scope.dispatch(
        light_slice.len() as u32,
        SMALL_SUBTASK_GROUPSIZE,
        move |args| {
            let i = args.job_index as usize;
            // SAFETY: one job invocation per dense index, on both columns;
            // slots never overlap.
            let light = unsafe { light_slice.get_mut(i) };
            let aabb = unsafe { aabb_slice.get_mut(i) };
            let Some(transform) = transforms.get_by_entity(entities[i]) else {
                return;
            };

            let (scale, rotation, translation) = transform.world.to_scale_rotation_translation();
            light.position = translation;
            light.rotation = rotation;
            light.scale = scale;
            light.direction = transform
                .world
                .transform_vector3(Vec3::Y)
                .normalize_or(Vec3::Y);
            light.range_world = light.range * scale.max_element();

            *aabb = match light.kind {
                LightKind::Directional => {
                    Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(UNBOUNDED_HALF_EXTENT))
                }
                LightKind::Point | LightKind::Spot => {
                    Aabb::from_center_half_extents(light.position, Vec3::splat(light.range_world))
                }
            };
        },
    );
}
