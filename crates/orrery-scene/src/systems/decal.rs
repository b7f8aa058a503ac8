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
use orrery_data::ecs::components::{DecalComponent, TransformComponent};
use orrery_data::ecs::ComponentManager;

/// Projects every decal's unit box into world space.
///
/// The decal's world matrix is the transform's world matrix verbatim; the
/// projection direction is the world-transformed -Z axis; position and
/// range come from decomposition; the culling bounds are the unit box
/// pushed through the same matrix. Decals without a transform are skipped.
pub fn run_decal_update<'env>(
    scope: &JobScope<'_, 'env>,
    transforms: &'env ComponentManager<TransformComponent>,
    decals: &'env mut ComponentManager<DecalComponent>,
    aabb_decals: &'env mut ComponentManager<Aabb>,
) {
    assert_eq!(
        decals.len(),
        aabb_decals.len(),
        "decal and decal-bounds columns must stay paired"
    );

    let (entities, components) = decals.dense_parts_mut();
    let decal_slice = SharedSlice::new(components);
    let aabb_slice = SharedSlice::new(aabb_decals.components_mut());

    scope.dispatch(
        decal_slice.len() as u32,
        SMALL_SUBTASK_GROUPSIZE,
        move |args| {
            let i = args.job_index as usize;
            // SAFETY: one job invocation per dense index, on both columns;
            // slots never overlap.
            let decal = unsafe { decal_slice.get_mut(i) };
            let aabb = unsafe { aabb_slice.get_mut(i) };
            let Some(transform) = transforms.get_by_entity(entities[i]) else {
                return;
            };

            decal.world = transform.world;
            decal.front = decal
                .world
                .transform_vector3(Vec3::NEG_Z)
                .normalize_or(Vec3::NEG_Z);
            let (scale, _, translation) = decal.world.to_scale_rotation_translation();
            decal.position = translation;
            // Conservative radius: the box spans two units per axis before
            // scaling.
            decal.range = scale.max_element() * 2.0;

            *aabb = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::ONE).transform(&decal.world);
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use orrery_core::math::{Quat, FRAC_PI_2};
    use orrery_core::JobSystem;
    use orrery_data::ecs::EntityAllocator;

    #[test]
    fn test_decal_projection_follows_its_transform() {
        // --- 1. ARRANGE ---
        // A decal stretched to a 2x2x2 box, turned to project along +X,
        // stamped at (5, 0, 0).
        let mut allocator = EntityAllocator::new();
        let entity = allocator.allocate();

        let mut transforms = ComponentManager::<TransformComponent>::new();
        let slot = transforms.create(entity);
        let transform = transforms.get_mut(slot);
        transform.translation = Vec3::new(5.0, 0.0, 0.0);
        transform.rotation = Quat::from_rotation_y(FRAC_PI_2);
        transform.scale = Vec3::splat(2.0);
        transform.update_transform();

        let mut decals = ComponentManager::<DecalComponent>::new();
        decals.create(entity);
        let mut aabb_decals = ComponentManager::<Aabb>::new();
        aabb_decals.create(entity);

        let jobs = JobSystem::with_threads(2);

        // --- 2. ACT ---
        jobs.scope(|scope| {
            run_decal_update(scope, &transforms, &mut decals, &mut aabb_decals)
        });

        // --- 3. ASSERT ---
        let decal = decals.get_by_entity(entity).unwrap();
        assert_relative_eq!(decal.position.x, 5.0, epsilon = 1e-5);
        // -Z rotated a quarter turn about Y points along -X.
        assert_relative_eq!(decal.front.x, -1.0, epsilon = 1e-5);
        assert_relative_eq!(decal.front.length(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(decal.range, 4.0, epsilon = 1e-4);

        let aabb = aabb_decals.get_by_entity(entity).unwrap();
        assert_relative_eq!(aabb.center().x, 5.0, epsilon = 1e-5);
        assert_relative_eq!(aabb.half_extents().y, 2.0, epsilon = 1e-4);
    }

    #[test]
    fn test_decals_without_a_transform_are_left_alone() {
        // --- 1. ARRANGE ---
        let mut allocator = EntityAllocator::new();
        let entity = allocator.allocate();

        let transforms = ComponentManager::<TransformComponent>::new();
        let mut decals = ComponentManager::<DecalComponent>::new();
        decals.create(entity);
        let mut aabb_decals = ComponentManager::<Aabb>::new();
        aabb_decals.create(entity);

        let jobs = JobSystem::with_threads(2);

        // --- 2. ACT ---
        jobs.scope(|scope| {
            run_decal_update(scope, &transforms, &mut decals, &mut aabb_decals)
        });

        // --- 3. ASSERT ---
        let decal = decals.get_by_entity(entity).unwrap();
        assert_eq!(decal.front, Vec3::NEG_Z);
        assert_eq!(decal.range, 0.0);
    }
}
