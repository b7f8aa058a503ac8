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

use orrery_core::math::{Aabb, Mat4, Vec3};
use orrery_core::{JobScope, SharedSlice};
use orrery_data::ecs::components::{ArmatureComponent, TransformComponent, TransformKind};
use orrery_data::ecs::ComponentManager;

/// Rebuilds every armature's skinning palette and world-space rig bounds
/// from the bone transforms settled by the hierarchy pass.
///
/// Palette entry `i` maps mesh-local bind-pose vertices into the armature's
/// local space through bone `i`'s current world matrix:
/// `inverse(armature world) * bone world * inverse bind`. The rig bounds
/// are the union of unit boxes around each bone's world position, which is
/// coarse but cheap and conservative enough for culling a deforming mesh.
///
/// One armature per job: rigs vary wildly in bone count, so finer-grained
/// batching would let one heavy rig stall a whole batch of trivial ones.
pub fn run_armature_update<'env>(
    scope: &JobScope<'_, 'env>,
    transforms: &'env ComponentManager<TransformComponent>,
    armatures: &'env mut ComponentManager<ArmatureComponent>,
) {
    let (entities, components) = armatures.dense_parts_mut();
    let armature_slice = SharedSlice::new(components);

    scope.dispatch(armature_slice.len() as u32, 1, move |args| {
        let i = args.job_index as usize;
        // SAFETY: group size 1 gives each dense index to exactly one job.
        let armature = unsafe { armature_slice.get_mut(i) };

        let inverse_armature_world = transforms
            .get_by_entity(entities[i])
            .map(|t| t.world.inverse())
            .unwrap_or(Mat4::IDENTITY);

        armature.bone_data.clear();
        let mut bounds = Aabb::INVALID;

        for (bone_index, &bone) in armature.bones.iter().enumerate() {
            debug_assert!(
                transforms.contains(bone),
                "armature bone {} has no transform",
                bone.raw()
            );
            let Some(bone_transform) = transforms.get_by_entity(bone) else {
                // Keep the palette aligned with the bone list regardless.
                armature.bone_data.push(Mat4::IDENTITY);
                continue;
            };
            debug_assert!(
                bone_transform.kind == TransformKind::Bone,
                "armature bone {} is not tagged as a bone transform",
                bone.raw()
            );

            let inverse_bind = armature
                .inverse_bind_matrices
                .get(bone_index)
                .copied()
                .unwrap_or(Mat4::IDENTITY);
            armature
                .bone_data
                .push(inverse_armature_world * bone_transform.world * inverse_bind);

            let bone_position = bone_transform.world.w_axis.truncate();
            bounds = bounds.merge(&Aabb::from_center_half_extents(bone_position, Vec3::ONE));
        }

        armature.aabb = bounds;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use orrery_core::JobSystem;
    use orrery_data::ecs::{Entity, EntityAllocator};

    fn bone_at(
        transforms: &mut ComponentManager<TransformComponent>,
        entity: Entity,
        translation: Vec3,
    ) {
        let slot = transforms.create(entity);
        let transform = transforms.get_mut(slot);
        transform.kind = TransformKind::Bone;
        transform.translation = translation;
        transform.update_transform();
    }

    #[test]
    fn test_palette_maps_bind_pose_through_current_bone_world() {
        // --- 1. ARRANGE ---
        // One bone bound at the origin, now sitting at (0, 3, 0): a vertex
        // rigidly weighted to it must move up by three units.
        let mut allocator = EntityAllocator::new();
        let rig = allocator.allocate();
        let bone = allocator.allocate();

        let mut transforms = ComponentManager::<TransformComponent>::new();
        let slot = transforms.create(rig);
        transforms.get_mut(slot).update_transform();
        bone_at(&mut transforms, bone, Vec3::new(0.0, 3.0, 0.0));

        let mut armatures = ComponentManager::<ArmatureComponent>::new();
        let slot = armatures.create(rig);
        let armature = armatures.get_mut(slot);
        armature.bones = vec![bone];
        armature.inverse_bind_matrices = vec![Mat4::IDENTITY];

        let jobs = JobSystem::with_threads(2);

        // --- 2. ACT ---
        jobs.scope(|scope| run_armature_update(scope, &transforms, &mut armatures));

        // --- 3. ASSERT ---
        let armature = armatures.get_by_entity(rig).unwrap();
        assert_eq!(armature.bone_data.len(), 1);
        let skinned = armature.bone_data[0].transform_point3(Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(skinned.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(skinned.y, 3.0, epsilon = 1e-5);
        assert_relative_eq!(skinned.z, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_palette_is_relative_to_the_armature_world() {
        // --- 1. ARRANGE ---
        // Armature and bone moved together by the same offset: relative to
        // the armature nothing changed, so the palette must be identity.
        let mut allocator = EntityAllocator::new();
        let rig = allocator.allocate();
        let bone = allocator.allocate();
        let offset = Vec3::new(8.0, 1.0, -4.0);

        let mut transforms = ComponentManager::<TransformComponent>::new();
        let slot = transforms.create(rig);
        let transform = transforms.get_mut(slot);
        transform.translation = offset;
        transform.update_transform();
        bone_at(&mut transforms, bone, offset);

        let mut armatures = ComponentManager::<ArmatureComponent>::new();
        let slot = armatures.create(rig);
        let armature = armatures.get_mut(slot);
        armature.bones = vec![bone];
        armature.inverse_bind_matrices = vec![Mat4::IDENTITY];

        let jobs = JobSystem::with_threads(2);

        // --- 2. ACT ---
        jobs.scope(|scope| run_armature_update(scope, &transforms, &mut armatures));

        // --- 3. ASSERT ---
        let palette = armatures.get_by_entity(rig).unwrap().bone_data[0];
        let moved = palette.transform_point3(Vec3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(moved.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(moved.y, 2.0, epsilon = 1e-5);
        assert_relative_eq!(moved.z, 3.0, epsilon = 1e-5);
    }

    #[test]
    fn test_rig_bounds_cover_every_bone() {
        // --- 1. ARRANGE ---
        let mut allocator = EntityAllocator::new();
        let rig = allocator.allocate();
        let head = allocator.allocate();
        let foot = allocator.allocate();

        let mut transforms = ComponentManager::<TransformComponent>::new();
        let slot = transforms.create(rig);
        transforms.get_mut(slot).update_transform();
        bone_at(&mut transforms, head, Vec3::new(0.0, 10.0, 0.0));
        bone_at(&mut transforms, foot, Vec3::new(0.0, -10.0, 0.0));

        let mut armatures = ComponentManager::<ArmatureComponent>::new();
        let slot = armatures.create(rig);
        let armature = armatures.get_mut(slot);
        armature.bones = vec![head, foot];
        armature.inverse_bind_matrices = vec![Mat4::IDENTITY, Mat4::IDENTITY];

        let jobs = JobSystem::with_threads(2);

        // --- 2. ACT ---
        jobs.scope(|scope| run_armature_update(scope, &transforms, &mut armatures));

        // --- 3. ASSERT ---
        let bounds = armatures.get_by_entity(rig).unwrap().aabb;
        assert!(bounds.is_valid());
        assert!(
            bounds.contains_point(Vec3::new(0.0, 10.0, 0.0))
                && bounds.contains_point(Vec3::new(0.0, -10.0, 0.0)),
            "the rig bounds must cover both extremities of the rig"
        );
    }
}
