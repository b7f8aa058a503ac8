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

use orrery_core::math::{Aabb, Plane, Vec3};
use orrery_data::ecs::components::{
    ArmatureComponent, MeshComponent, ObjectComponent, TransformComponent,
};
use orrery_data::ecs::ComponentManager;

/// Scene-wide values folded while walking the objects.
#[derive(Debug, Clone, Copy)]
pub struct ScenePassOutputs {
    /// Union of every object's world-space bounds this frame.
    pub bounds: Aabb,
    /// Reflection plane of the last object that requested one, if any.
    pub reflection_plane: Option<Plane>,
}

/// Recomputes every object's world-space bounds and the scene-wide
/// aggregates derived from them.
///
/// Each object's mesh-local bounds are pushed through its world matrix into
/// the paired `aabb_objects` column. Skinned objects additionally swallow
/// their armature's rig bounds, since the deformed geometry can leave the
/// bind-pose box, and are forced dynamic. The per-object results are folded
/// into one scene AABB; objects asking for a planar reflection contribute a
/// plane through their position along their world up axis, last writer wins.
///
/// Runs single-threaded because of the running folds.
pub fn run_object_update(
    transforms: &ComponentManager<TransformComponent>,
    meshes: &ComponentManager<MeshComponent>,
    armatures: &ComponentManager<ArmatureComponent>,
    objects: &mut ComponentManager<ObjectComponent>,
    aabb_objects: &mut ComponentManager<Aabb>,
) -> ScenePassOutputs {
    debug_assert_eq!(
        objects.len(),
        aabb_objects.len(),
        "object and object-bounds columns must stay paired"
    );

    let mut scene_bounds = Aabb::INVALID;
    let mut reflection_plane = None;

    for i in 0..objects.len() {
        let entity = objects.entity(i);
        let object = &mut objects[i];
        object.skinned = false;
        let mut aabb = Aabb::INVALID;

        if object.mesh_id.is_valid() {
            let transform = transforms.get_by_entity(entity);
            let mesh = meshes.get_by_entity(object.mesh_id);
            if let (Some(transform), Some(mesh)) = (transform, mesh) {
                aabb = mesh.bounds.transform(&transform.world);

                if mesh.is_skinned() {
                    object.skinned = true;
                    // A deforming mesh can never be treated as static.
                    object.dynamic = true;
                    if let Some(armature) = armatures.get_by_entity(mesh.armature_id) {
                        aabb = aabb.merge(&armature.aabb);
                    }
                }

                scene_bounds = scene_bounds.merge(&aabb);

                if object.request_planar_reflection {
                    reflection_plane = Some(Plane::from_point_normal(
                        transform.position(),
                        transform.world.transform_vector3(Vec3::Y),
                    ));
                }

                object.center = aabb.center();
            }
        }

        aabb_objects[i] = aabb;
    }

    ScenePassOutputs {
        bounds: scene_bounds,
        reflection_plane,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use orrery_core::math::FRAC_PI_2;
    use orrery_core::math::Quat;
    use orrery_data::ecs::{Entity, EntityAllocator};

    struct Stage {
        allocator: EntityAllocator,
        transforms: ComponentManager<TransformComponent>,
        meshes: ComponentManager<MeshComponent>,
        armatures: ComponentManager<ArmatureComponent>,
        objects: ComponentManager<ObjectComponent>,
        aabb_objects: ComponentManager<Aabb>,
    }

    impl Stage {
        fn new() -> Self {
            Self {
                allocator: EntityAllocator::new(),
                transforms: ComponentManager::new(),
                meshes: ComponentManager::new(),
                armatures: ComponentManager::new(),
                objects: ComponentManager::new(),
                aabb_objects: ComponentManager::new(),
            }
        }

        /// An object at `position` using a unit-cube mesh.
        fn spawn_cube(&mut self, position: Vec3) -> Entity {
            let mesh_entity = self.allocator.allocate();
            let slot = self.meshes.create(mesh_entity);
            self.meshes.get_mut(slot).bounds =
                Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.5));

            let entity = self.allocator.allocate();
            let slot = self.transforms.create(entity);
            let transform = self.transforms.get_mut(slot);
            transform.translation = position;
            transform.update_transform();

            let slot = self.objects.create(entity);
            self.objects.get_mut(slot).mesh_id = mesh_entity;
            self.aabb_objects.create(entity);
            entity
        }

        fn run(&mut self) -> ScenePassOutputs {
            run_object_update(
                &self.transforms,
                &self.meshes,
                &self.armatures,
                &mut self.objects,
                &mut self.aabb_objects,
            )
        }
    }

    #[test]
    fn test_object_bounds_follow_the_world_matrix() {
        // --- 1. ARRANGE ---
        let mut stage = Stage::new();
        let entity = stage.spawn_cube(Vec3::new(10.0, 0.0, 0.0));

        // --- 2. ACT ---
        stage.run();

        // --- 3. ASSERT ---
        let aabb = stage.aabb_objects.get_by_entity(entity).unwrap();
        assert_relative_eq!(aabb.center().x, 10.0, epsilon = 1e-5);
        assert_relative_eq!(aabb.half_extents().x, 0.5, epsilon = 1e-5);
        let object = stage.objects.get_by_entity(entity).unwrap();
        assert_relative_eq!(object.center.x, 10.0, epsilon = 1e-5);
    }

    #[test]
    fn test_scene_bounds_union_every_object() {
        // --- 1. ARRANGE ---
        let mut stage = Stage::new();
        stage.spawn_cube(Vec3::new(-20.0, 0.0, 0.0));
        stage.spawn_cube(Vec3::new(20.0, 0.0, 0.0));

        // --- 2. ACT ---
        let outputs = stage.run();

        // --- 3. ASSERT ---
        assert!(outputs.bounds.is_valid());
        assert!(outputs.bounds.contains_point(Vec3::new(-20.0, 0.0, 0.0)));
        assert!(outputs.bounds.contains_point(Vec3::new(20.0, 0.0, 0.0)));
    }

    #[test]
    fn test_skinned_object_swallows_rig_bounds_and_turns_dynamic() {
        // --- 1. ARRANGE ---
        let mut stage = Stage::new();
        let entity = stage.spawn_cube(Vec3::ZERO);

        let rig = stage.allocator.allocate();
        let slot = stage.armatures.create(rig);
        stage.armatures.get_mut(slot).aabb =
            Aabb::from_center_half_extents(Vec3::new(0.0, 40.0, 0.0), Vec3::ONE);

        let mesh_id = stage.objects.get_by_entity(entity).unwrap().mesh_id;
        stage.meshes.get_by_entity_mut(mesh_id).unwrap().armature_id = rig;

        // --- 2. ACT ---
        stage.run();

        // --- 3. ASSERT ---
        let object = stage.objects.get_by_entity(entity).unwrap();
        assert!(object.skinned, "an armature-driven mesh marks its object");
        assert!(object.dynamic, "skinned objects may never stay static");
        let aabb = stage.aabb_objects.get_by_entity(entity).unwrap();
        assert!(
            aabb.contains_point(Vec3::new(0.0, 40.0, 0.0)),
            "the object bounds must cover wherever the rig currently is"
        );
    }

    #[test]
    fn test_last_reflection_request_wins() {
        // --- 1. ARRANGE ---
        let mut stage = Stage::new();
        let first = stage.spawn_cube(Vec3::new(0.0, 1.0, 0.0));
        let second = stage.spawn_cube(Vec3::new(0.0, 5.0, 0.0));
        for entity in [first, second] {
            stage
                .objects
                .get_by_entity_mut(entity)
                .unwrap()
                .request_planar_reflection = true;
        }
        // Tilt the second requester so the plane is clearly its own.
        let transform = stage.transforms.get_by_entity_mut(second).unwrap();
        transform.rotation = Quat::from_rotation_z(FRAC_PI_2);
        transform.set_dirty();
        transform.update_transform();

        // --- 2. ACT ---
        let outputs = stage.run();

        // --- 3. ASSERT ---
        let plane = outputs
            .reflection_plane
            .expect("a requesting object must produce a plane");
        // The second object's up axis is world -X after the rotation.
        assert_relative_eq!(plane.normal.x, -1.0, epsilon = 1e-5);
        assert_relative_eq!(plane.signed_distance(Vec3::new(0.0, 5.0, 0.0)), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_object_without_mesh_contributes_nothing() {
        // --- 1. ARRANGE ---
        let mut stage = Stage::new();
        let entity = stage.allocator.allocate();
        let slot = stage.transforms.create(entity);
        stage.transforms.get_mut(slot).update_transform();
        stage.objects.create(entity); // mesh_id stays INVALID
        stage.aabb_objects.create(entity);

        // --- 2. ACT ---
        let outputs = stage.run();

        // --- 3. ASSERT ---
        assert!(
            !outputs.bounds.is_valid(),
            "an empty scene-bounds fold stays invalid"
        );
        assert!(!stage.aabb_objects.get_by_entity(entity).unwrap().is_valid());
        assert!(outputs.reflection_plane.is_none());
    }
}
