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

use orrery_core::math::{Aabb, Mat4, Plane, Vec3};
use orrery_core::JobSystem;
use orrery_data::ecs::components::{
    AnimationComponent, ArmatureComponent, CameraComponent, DecalComponent, EmitterComponent,
    EnvironmentProbeComponent, HierarchyComponent, LayerComponent, LightComponent, MeshComponent,
    NameComponent, ObjectComponent, PreviousFrameTransformComponent, TransformComponent,
    TransformKind,
};
use orrery_data::ecs::{ComponentManager, ComponentRef, Entity, EntityAllocator};
use serde::{Deserialize, Serialize};

use crate::systems;

/// A complete scene: one dense component column per kind, the entity id
/// source, and the frame outputs the update pipeline derives.
///
/// The columns are public by design — systems and tools address them
/// directly, and an entity "has" a component of some kind iff the matching
/// column contains it. The aggregate stays internally consistent as long
/// as structural mutations go through the entity helpers
/// ([`Scene::entity_create_object`] and friends, [`Scene::attach`],
/// [`Scene::remove_entity`]); raw column edits are possible, but then the
/// pairing invariants (every object with its bounds slot, every light with
/// its bounds slot) are the caller's to keep.
///
/// [`Scene::update`] advances everything by one frame. Serialization
/// covers the authored state plus the allocator; derived fields are
/// rebuilt by the first update after a restore.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Scene {
    /// Source of fresh entity ids, serialized so a restored scene keeps
    /// issuing unique ones.
    pub allocator: EntityAllocator,
    /// Human-readable labels.
    pub names: ComponentManager<NameComponent>,
    /// Visibility/filter masks.
    pub layers: ComponentManager<LayerComponent>,
    /// Local SRT state and derived world matrices.
    pub transforms: ComponentManager<TransformComponent>,
    /// Last frame's world matrices.
    pub prev_transforms: ComponentManager<PreviousFrameTransformComponent>,
    /// Parent links, kept parent-before-child in dense order.
    pub hierarchy: ComponentManager<HierarchyComponent>,
    /// Shared mesh shape data.
    pub meshes: ComponentManager<MeshComponent>,
    /// Renderable instances.
    pub objects: ComponentManager<ObjectComponent>,
    /// World-space bounds, paired 1:1 with `objects`.
    pub aabb_objects: ComponentManager<Aabb>,
    /// Skinning rigs.
    pub armatures: ComponentManager<ArmatureComponent>,
    /// Light sources.
    pub lights: ComponentManager<LightComponent>,
    /// Culling bounds, paired 1:1 with `lights`.
    pub aabb_lights: ComponentManager<Aabb>,
    /// Perspective cameras.
    pub cameras: ComponentManager<CameraComponent>,
    /// Projected surface markers.
    pub decals: ComponentManager<DecalComponent>,
    /// Culling bounds, paired 1:1 with `decals`.
    pub aabb_decals: ComponentManager<Aabb>,
    /// Environment probes.
    pub probes: ComponentManager<EnvironmentProbeComponent>,
    /// Culling bounds, paired 1:1 with `probes`.
    pub aabb_probes: ComponentManager<Aabb>,
    /// Particle emitters.
    pub emitters: ComponentManager<EmitterComponent>,
    /// Playable animation clips.
    pub animations: ComponentManager<AnimationComponent>,
    /// Derived: union of every object's world bounds, refreshed by
    /// [`Scene::update`].
    #[serde(skip)]
    pub bounds: Aabb,
    /// Derived: the reflection plane requested by the last object that
    /// asked for one this frame, if any.
    #[serde(skip)]
    pub reflection_plane: Option<Plane>,
}

/// Finds `entity`'s slot in `manager`, creating a default component first
/// if it has none.
fn ensure<T: Default>(manager: &mut ComponentManager<T>, entity: Entity) -> ComponentRef {
    let slot = manager.find(entity);
    if slot.is_valid() {
        slot
    } else {
        manager.create(entity)
    }
}

impl Scene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh entity id carrying no components yet.
    pub fn create_entity(&mut self) -> Entity {
        self.allocator.allocate()
    }

    /// Creates a named entity with everything a renderable object needs:
    /// layer, transform, previous-frame slot, object record and its paired
    /// bounds slot. Point the object's `mesh_id` at a mesh entity
    /// afterwards.
    pub fn entity_create_object(&mut self, name: &str) -> Entity {
        let entity = self.allocator.allocate();
        let slot = self.names.create(entity);
        *self.names.get_mut(slot) = name.into();
        self.layers.create(entity);
        self.transforms.create(entity);
        self.prev_transforms.create(entity);
        self.aabb_objects.create(entity);
        self.objects.create(entity);
        entity
    }

    /// Creates a named mesh entity. Fill in its local bounds (and armature
    /// link, for skinned meshes) afterwards.
    pub fn entity_create_mesh(&mut self, name: &str) -> Entity {
        let entity = self.allocator.allocate();
        let slot = self.names.create(entity);
        *self.names.get_mut(slot) = name.into();
        self.meshes.create(entity);
        entity
    }

    /// Creates a point light at `position`. Switch its `kind` afterwards
    /// for directional or spot lights.
    pub fn entity_create_light(
        &mut self,
        name: &str,
        position: Vec3,
        color: Vec3,
        energy: f32,
        range: f32,
    ) -> Entity {
        let entity = self.allocator.allocate();
        let slot = self.names.create(entity);
        *self.names.get_mut(slot) = name.into();
        self.layers.create(entity);

        let slot = self.transforms.create(entity);
        let transform = self.transforms.get_mut(slot);
        transform.translate(position);
        transform.update_transform();

        // Seed the culling box so the light is usable before the first
        // update refreshes it.
        let slot = self.aabb_lights.create(entity);
        *self.aabb_lights.get_mut(slot) =
            Aabb::from_center_half_extents(position, Vec3::splat(range));

        let slot = self.lights.create(entity);
        let light = self.lights.get_mut(slot);
        light.color = color;
        light.energy = energy;
        light.range = range;

        entity
    }

    /// Creates a camera entity with the given projection inputs; pose it
    /// by moving its transform.
    pub fn entity_create_camera(
        &mut self,
        name: &str,
        width: f32,
        height: f32,
        z_near: f32,
        z_far: f32,
        fov: f32,
    ) -> Entity {
        let entity = self.allocator.allocate();
        let slot = self.names.create(entity);
        *self.names.get_mut(slot) = name.into();
        self.layers.create(entity);
        self.transforms.create(entity);
        let slot = self.cameras.create(entity);
        *self.cameras.get_mut(slot) =
            CameraComponent::create_perspective(width, height, z_near, z_far, fov);
        entity
    }

    /// Creates a decal entity; place and stretch its projection box
    /// through its transform.
    pub fn entity_create_decal(&mut self, name: &str) -> Entity {
        let entity = self.allocator.allocate();
        let slot = self.names.create(entity);
        *self.names.get_mut(slot) = name.into();
        self.layers.create(entity);
        self.transforms.create(entity);
        self.aabb_decals.create(entity);
        self.decals.create(entity);
        entity
    }

    /// Creates an environment probe at `position`; scale its transform to
    /// size the influence box.
    pub fn entity_create_probe(&mut self, name: &str, position: Vec3) -> Entity {
        let entity = self.allocator.allocate();
        let slot = self.names.create(entity);
        *self.names.get_mut(slot) = name.into();
        self.layers.create(entity);

        let slot = self.transforms.create(entity);
        let transform = self.transforms.get_mut(slot);
        transform.translate(position);
        transform.update_transform();

        self.aabb_probes.create(entity);
        self.probes.create(entity);
        entity
    }

    /// Creates a particle emitter at `position` with the default emission
    /// rate.
    pub fn entity_create_emitter(&mut self, name: &str, position: Vec3) -> Entity {
        let entity = self.allocator.allocate();
        let slot = self.names.create(entity);
        *self.names.get_mut(slot) = name.into();
        self.emitters.create(entity);

        let slot = self.transforms.create(entity);
        let transform = self.transforms.get_mut(slot);
        transform.translate(position);
        transform.update_transform();

        entity
    }

    /// Creates an empty skinning rig. Add bones with
    /// [`Scene::entity_create_bone`].
    pub fn entity_create_armature(&mut self, name: &str) -> Entity {
        let entity = self.allocator.allocate();
        let slot = self.names.create(entity);
        *self.names.get_mut(slot) = name.into();
        self.layers.create(entity);
        self.transforms.create(entity);
        self.armatures.create(entity);
        entity
    }

    /// Creates a bone entity and registers it as the next bone of
    /// `armature`, with `inverse_bind` mapping mesh-space vertices into
    /// the bone's rest space. Attaching the bone into the rig hierarchy is
    /// a separate step.
    ///
    /// # Panics
    ///
    /// Panics if `armature` has no armature component.
    pub fn entity_create_bone(
        &mut self,
        name: &str,
        armature: Entity,
        inverse_bind: Mat4,
    ) -> Entity {
        let rig_slot = self.armatures.find(armature);
        assert!(
            rig_slot.is_valid(),
            "entity {} has no armature to add bones to",
            armature.raw()
        );

        let entity = self.allocator.allocate();
        let slot = self.names.create(entity);
        *self.names.get_mut(slot) = name.into();
        let slot = self.transforms.create(entity);
        self.transforms.get_mut(slot).kind = TransformKind::Bone;

        let rig = self.armatures.get_mut(rig_slot);
        rig.bones.push(entity);
        rig.inverse_bind_matrices.push(inverse_bind);
        entity
    }

    /// Returns the first entity (in dense order) carrying `name`, or
    /// [`Entity::INVALID`] when none does.
    pub fn find_by_name(&self, name: &str) -> Entity {
        for (entity, record) in self.names.iter() {
            if record.name == name {
                return entity;
            }
        }
        Entity::INVALID
    }

    /// Attaches `entity` under `parent`.
    ///
    /// An entity already attached elsewhere is detached first. The
    /// hierarchy table is then re-sorted so every parent record precedes
    /// its children's records, which is what lets propagation run as one
    /// forward sweep. Missing transform and layer components are created
    /// on both ends, and the child's layer mask is saved on the link for
    /// restoration at detach.
    ///
    /// With `child_already_in_local_space` false (the common case), the
    /// inverse of the parent's current world matrix is captured on the
    /// link, so the child visually stays put and follows the parent from
    /// there on. With it true, the child's local SRT is taken as already
    /// expressed in the parent's space and the captured bind is identity.
    ///
    /// The child's world matrix is refreshed immediately, keeping the
    /// scene coherent for reads between this call and the next update.
    ///
    /// # Panics
    ///
    /// Panics if `entity == parent` or either handle is invalid.
    pub fn attach(&mut self, entity: Entity, parent: Entity, child_already_in_local_space: bool) {
        assert!(
            entity.is_valid() && parent.is_valid(),
            "attach requires valid entities"
        );
        assert!(entity != parent, "cannot attach an entity to itself");

        if self.hierarchy.contains(entity) {
            self.detach(entity);
        }

        let slot = self.hierarchy.create(entity);
        self.hierarchy.get_mut(slot).parent_id = parent;

        // Fix ordering breaks: walk from the tail and hoist any record that
        // parents an earlier record above that record, then re-examine the
        // same index (a different record sits there after the move).
        if self.hierarchy.len() > 1 {
            let mut i = self.hierarchy.len() - 1;
            while i > 0 {
                let parent_candidate = self.hierarchy.entity(i);
                let mut moved = false;
                for j in 0..i {
                    if self.hierarchy[j].parent_id == parent_candidate {
                        self.hierarchy.move_item(i, j);
                        moved = true;
                        break;
                    }
                }
                if !moved {
                    i -= 1;
                }
            }
        }

        let parent_slot = ensure(&mut self.transforms, parent);
        self.transforms.get_mut(parent_slot).update_transform();
        let child_slot = ensure(&mut self.transforms, entity);

        let parent_world = self.transforms.get(parent_slot).world;
        let inverse_parent_bind = if child_already_in_local_space {
            Mat4::IDENTITY
        } else {
            parent_world.inverse()
        };
        self.transforms
            .get_mut(child_slot)
            .update_transform_parented(parent_world, inverse_parent_bind);

        ensure(&mut self.layers, parent);
        let child_layer_slot = ensure(&mut self.layers, entity);
        let layer_mask_bind = self.layers.get(child_layer_slot).layer_mask;

        // The reorder may have moved the link; address it by entity.
        if let Some(link) = self.hierarchy.get_by_entity_mut(entity) {
            link.inverse_parent_bind = inverse_parent_bind;
            link.layer_mask_bind = layer_mask_bind;
        }
    }

    /// Detaches `entity` from its parent, keeping its world placement.
    ///
    /// The current world matrix is baked back into the local SRT (and
    /// flagged dirty), the layer mask saved at attach time is restored,
    /// and the hierarchy record is removed without disturbing the order of
    /// the remaining records. Detaching an unattached entity is a no-op.
    pub fn detach(&mut self, entity: Entity) {
        let Some(link) = self.hierarchy.get_by_entity(entity) else {
            return;
        };
        let layer_mask_bind = link.layer_mask_bind;

        if let Some(transform) = self.transforms.get_by_entity_mut(entity) {
            transform.apply_transform();
        }
        if let Some(layer) = self.layers.get_by_entity_mut(entity) {
            layer.layer_mask = layer_mask_bind;
        }
        self.hierarchy.remove_keep_sorted(entity);
    }

    /// Detaches every direct child of `parent`. Grandchildren stay
    /// attached to their own parents.
    pub fn detach_children(&mut self, parent: Entity) {
        let mut i = 0;
        while i < self.hierarchy.len() {
            if self.hierarchy[i].parent_id == parent {
                let child = self.hierarchy.entity(i);
                self.detach(child);
                // The removal shifted the table left; index i now holds a
                // record not yet examined.
            } else {
                i += 1;
            }
        }
    }

    /// Removes `entity` from every column it appears in.
    ///
    /// The entity is detached first, so it leaves at its world placement
    /// should its data be rebuilt later. Children of the removed entity
    /// keep their now-dangling parent links; propagation skips those
    /// gracefully, and they can be detached or re-attached individually.
    pub fn remove_entity(&mut self, entity: Entity) {
        self.detach(entity);

        self.names.remove(entity);
        self.layers.remove(entity);
        self.transforms.remove(entity);
        self.prev_transforms.remove(entity);
        self.meshes.remove(entity);
        self.objects.remove(entity);
        self.aabb_objects.remove(entity);
        self.armatures.remove(entity);
        self.lights.remove(entity);
        self.aabb_lights.remove(entity);
        self.cameras.remove(entity);
        self.decals.remove(entity);
        self.aabb_decals.remove(entity);
        self.probes.remove(entity);
        self.aabb_probes.remove(entity);
        self.emitters.remove(entity);
        self.animations.remove(entity);
    }

    /// Empties every component column and resets the derived frame
    /// outputs. The allocator is deliberately left untouched so entity ids
    /// stay unique across a clear.
    pub fn clear(&mut self) {
        self.names.clear();
        self.layers.clear();
        self.transforms.clear();
        self.prev_transforms.clear();
        self.hierarchy.clear();
        self.meshes.clear();
        self.objects.clear();
        self.aabb_objects.clear();
        self.armatures.clear();
        self.lights.clear();
        self.aabb_lights.clear();
        self.cameras.clear();
        self.decals.clear();
        self.aabb_decals.clear();
        self.probes.clear();
        self.aabb_probes.clear();
        self.emitters.clear();
        self.animations.clear();

        self.bounds = Aabb::INVALID;
        self.reflection_plane = None;

        log::debug!("Scene cleared.");
    }

    /// Moves every component of `other` into this scene, leaving `other`
    /// empty.
    ///
    /// The caller guarantees the two scenes share no entity ids (build
    /// them from disjoint allocator ranges). This scene's allocator is
    /// raised above the absorbed scene's so future ids stay unique; the
    /// scene bounds are unioned, and the reflection plane falls back to
    /// the absorbed scene's if this one has none.
    pub fn merge(&mut self, other: &mut Scene) {
        log::debug!(
            "Merging a scene with {} transform(s) and {} object(s).",
            other.transforms.len(),
            other.objects.len()
        );

        self.names.merge(&mut other.names);
        self.layers.merge(&mut other.layers);
        self.transforms.merge(&mut other.transforms);
        self.prev_transforms.merge(&mut other.prev_transforms);
        self.hierarchy.merge(&mut other.hierarchy);
        self.meshes.merge(&mut other.meshes);
        self.objects.merge(&mut other.objects);
        self.aabb_objects.merge(&mut other.aabb_objects);
        self.armatures.merge(&mut other.armatures);
        self.lights.merge(&mut other.lights);
        self.aabb_lights.merge(&mut other.aabb_lights);
        self.cameras.merge(&mut other.cameras);
        self.decals.merge(&mut other.decals);
        self.aabb_decals.merge(&mut other.aabb_decals);
        self.probes.merge(&mut other.probes);
        self.aabb_probes.merge(&mut other.aabb_probes);
        self.emitters.merge(&mut other.emitters);
        self.animations.merge(&mut other.animations);

        self.allocator.reserve_up_to(other.allocator.peek_next());
        self.bounds = self.bounds.merge(&other.bounds);
        self.reflection_plane = self.reflection_plane.or(other.reflection_plane.take());
    }

    /// Advances the scene by one frame.
    ///
    /// Runs the update passes in their dependency order (see
    /// [`systems`](crate::systems)), fanning the data-parallel ones out
    /// over `jobs`; each parallel wave completes before the next pass that
    /// reads its output starts. After this returns, every derived field —
    /// world matrices, skinning palettes, per-kind placements,
    /// [`Scene::bounds`], [`Scene::reflection_plane`] — is consistent with
    /// the authored state.
    pub fn update(&mut self, dt: f32, jobs: &JobSystem) {
        // Animation first, on this thread: it only rewrites local SRT
        // fields, so the previous-frame capture below still reads last
        // frame's world matrices untouched.
        systems::run_animation_update(&mut self.animations, &mut self.transforms, dt);

        jobs.scope(|scope| {
            systems::run_previous_frame_transform_update(
                scope,
                &self.transforms,
                &mut self.prev_transforms,
            );
        });

        jobs.scope(|scope| {
            systems::run_transform_update(scope, &mut self.transforms);
        });

        // The propagation sweep is order-dependent (parents strictly
        // before children), so it stays on this thread between the
        // parallel waves.
        systems::run_hierarchy_update(&self.hierarchy, &mut self.transforms, &mut self.layers);

        jobs.scope(|scope| {
            systems::run_armature_update(scope, &self.transforms, &mut self.armatures);
        });

        // Object bounds fold into the scene-wide accumulators, so this
        // pass is sequential as well.
        let outputs = systems::run_object_update(
            &self.transforms,
            &self.meshes,
            &self.armatures,
            &mut self.objects,
            &mut self.aabb_objects,
        );
        self.bounds = outputs.bounds;
        self.reflection_plane = outputs.reflection_plane;

        // The remaining per-kind derivations are independent of each other
        // and share one parallel wave.
        jobs.scope(|scope| {
            systems::run_camera_update(scope, &self.transforms, &mut self.cameras);
            systems::run_light_update(
                scope,
                &self.transforms,
                &mut self.lights,
                &mut self.aabb_lights,
            );
            systems::run_decal_update(
                scope,
                &self.transforms,
                &mut self.decals,
                &mut self.aabb_decals,
            );
            systems::run_probe_update(
                scope,
                &self.transforms,
                &mut self.probes,
                &mut self.aabb_probes,
            );
            systems::run_emitter_update(scope, &self.transforms, &mut self.emitters, dt);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_attach_reorders_parents_before_children() {
        // --- 1. ARRANGE ---
        let mut scene = Scene::new();
        let a = scene.create_entity();
        let b = scene.create_entity();
        let c = scene.create_entity();

        // --- 2. ACT ---
        // Attach bottom-up so the table starts children-first.
        scene.attach(c, b, true);
        scene.attach(b, a, true);

        // --- 3. ASSERT ---
        assert_eq!(
            scene.hierarchy.entities(),
            &[b, c],
            "b's record must be hoisted above its child c's record"
        );
    }

    #[test]
    fn test_attach_keeps_world_placement_by_default() {
        // --- 1. ARRANGE ---
        let mut scene = Scene::new();
        let parent = scene.create_entity();
        let child = scene.create_entity();

        let slot = scene.transforms.create(parent);
        let transform = scene.transforms.get_mut(slot);
        transform.translate(Vec3::new(2.0, 0.0, 0.0));
        transform.update_transform();

        let slot = scene.transforms.create(child);
        let transform = scene.transforms.get_mut(slot);
        transform.translate(Vec3::new(5.0, 0.0, 0.0));
        transform.update_transform();

        // --- 2. ACT ---
        scene.attach(child, parent, false);

        // --- 3. ASSERT ---
        let world = scene.transforms.get_by_entity(child).unwrap().world;
        assert_relative_eq!(world.w_axis.x, 5.0, epsilon = 1e-5);
    }

    #[test]
    fn test_attach_in_parent_space_composes_directly() {
        // --- 1. ARRANGE ---
        let mut scene = Scene::new();
        let parent = scene.create_entity();
        let child = scene.create_entity();

        let slot = scene.transforms.create(parent);
        let transform = scene.transforms.get_mut(slot);
        transform.translate(Vec3::new(2.0, 0.0, 0.0));
        transform.update_transform();

        let slot = scene.transforms.create(child);
        let transform = scene.transforms.get_mut(slot);
        transform.translate(Vec3::new(5.0, 0.0, 0.0));
        transform.update_transform();

        // --- 2. ACT ---
        scene.attach(child, parent, true);

        // --- 3. ASSERT ---
        let world = scene.transforms.get_by_entity(child).unwrap().world;
        assert_relative_eq!(world.w_axis.x, 7.0, epsilon = 1e-5);
    }

    #[test]
    fn test_attach_creates_missing_transforms_and_layers() {
        // --- 1. ARRANGE ---
        let mut scene = Scene::new();
        let parent = scene.create_entity();
        let child = scene.create_entity();

        // --- 2. ACT ---
        scene.attach(child, parent, true);

        // --- 3. ASSERT ---
        assert!(scene.transforms.contains(parent));
        assert!(scene.transforms.contains(child));
        assert!(scene.layers.contains(parent));
        assert!(scene.layers.contains(child));
    }

    #[test]
    #[should_panic(expected = "cannot attach an entity to itself")]
    fn test_attach_to_self_panics() {
        let mut scene = Scene::new();
        let entity = scene.create_entity();
        scene.attach(entity, entity, true);
    }

    #[test]
    fn test_detach_restores_layer_mask_and_bakes_world_placement() {
        // --- 1. ARRANGE ---
        let mut scene = Scene::new();
        let parent = scene.create_entity();
        let child = scene.create_entity();

        let slot = scene.transforms.create(parent);
        let transform = scene.transforms.get_mut(slot);
        transform.translate(Vec3::new(2.0, 0.0, 0.0));
        transform.update_transform();

        let slot = scene.transforms.create(child);
        let transform = scene.transforms.get_mut(slot);
        transform.translate(Vec3::new(1.0, 0.0, 0.0));
        transform.update_transform();

        let slot = scene.layers.create(child);
        scene.layers.get_mut(slot).layer_mask = 0b1010;

        scene.attach(child, parent, true);
        // Simulate propagation having narrowed the effective mask.
        scene.layers.get_by_entity_mut(child).unwrap().layer_mask = 0b0010;

        // --- 2. ACT ---
        scene.detach(child);

        // --- 3. ASSERT ---
        assert!(!scene.hierarchy.contains(child));
        assert_eq!(
            scene.layers.get_by_entity(child).unwrap().layer_mask,
            0b1010,
            "the attach-time mask must be restored"
        );
        let transform = scene.transforms.get_by_entity(child).unwrap();
        assert_relative_eq!(transform.translation.x, 3.0, epsilon = 1e-5);
        assert!(
            transform.is_dirty(),
            "the baked placement must be flagged for the next local update"
        );
    }

    #[test]
    fn test_detach_children_spares_grandchildren() {
        // --- 1. ARRANGE ---
        let mut scene = Scene::new();
        let root = scene.create_entity();
        let left = scene.create_entity();
        let right = scene.create_entity();
        let grandchild = scene.create_entity();

        scene.attach(left, root, true);
        scene.attach(right, root, true);
        scene.attach(grandchild, left, true);

        // --- 2. ACT ---
        scene.detach_children(root);

        // --- 3. ASSERT ---
        assert!(!scene.hierarchy.contains(left));
        assert!(!scene.hierarchy.contains(right));
        assert!(
            scene.hierarchy.contains(grandchild),
            "only direct children are detached"
        );
        assert_eq!(
            scene.hierarchy.get_by_entity(grandchild).unwrap().parent_id,
            left
        );
    }

    #[test]
    fn test_entity_create_object_populates_required_columns() {
        let mut scene = Scene::new();
        let entity = scene.entity_create_object("crate");

        assert!(scene.names.contains(entity));
        assert!(scene.layers.contains(entity));
        assert!(scene.transforms.contains(entity));
        assert!(scene.prev_transforms.contains(entity));
        assert!(scene.objects.contains(entity));
        assert!(scene.aabb_objects.contains(entity));
    }

    #[test]
    fn test_entity_create_bone_registers_into_the_rig() {
        let mut scene = Scene::new();
        let rig = scene.entity_create_armature("rig");
        let bone = scene.entity_create_bone("spine", rig, Mat4::IDENTITY);

        let armature = scene.armatures.get_by_entity(rig).unwrap();
        assert_eq!(armature.bones, vec![bone]);
        assert_eq!(armature.inverse_bind_matrices.len(), 1);
        assert_eq!(
            scene.transforms.get_by_entity(bone).unwrap().kind,
            TransformKind::Bone
        );
    }

    #[test]
    fn test_remove_entity_scrubs_every_column() {
        // --- 1. ARRANGE ---
        let mut scene = Scene::new();
        let parent = scene.entity_create_object("parent");
        let entity = scene.entity_create_object("doomed");
        scene.attach(entity, parent, true);

        // --- 2. ACT ---
        scene.remove_entity(entity);

        // --- 3. ASSERT ---
        assert!(!scene.names.contains(entity));
        assert!(!scene.transforms.contains(entity));
        assert!(!scene.objects.contains(entity));
        assert!(!scene.aabb_objects.contains(entity));
        assert!(!scene.hierarchy.contains(entity));
        assert!(scene.names.contains(parent), "other entities are untouched");
    }

    #[test]
    fn test_find_by_name_returns_first_match_in_dense_order() {
        let mut scene = Scene::new();
        let first = scene.entity_create_object("twin");
        scene.entity_create_object("twin");

        assert_eq!(scene.find_by_name("twin"), first);
        assert_eq!(scene.find_by_name("missing"), Entity::INVALID);
    }

    #[test]
    fn test_clear_keeps_issuing_unique_ids() {
        let mut scene = Scene::new();
        let before = scene.entity_create_object("gone");
        scene.clear();

        assert!(scene.names.is_empty());
        assert!(scene.transforms.is_empty());
        let after = scene.create_entity();
        assert!(
            after.raw() > before.raw(),
            "a cleared scene must not recycle ids"
        );
    }

    #[test]
    fn test_merge_absorbs_columns_and_raises_the_allocator() {
        // --- 1. ARRANGE ---
        let mut home = Scene::new();
        home.entity_create_object("resident");

        let mut guest = Scene::new();
        guest.allocator = EntityAllocator::starting_at(1_000);
        let visitor = guest.entity_create_object("visitor");

        // --- 2. ACT ---
        home.merge(&mut guest);

        // --- 3. ASSERT ---
        assert_eq!(home.objects.len(), 2);
        assert!(guest.objects.is_empty());
        assert_eq!(home.find_by_name("visitor"), visitor);
        assert!(
            home.allocator.peek_next() > visitor.raw(),
            "future ids must not collide with absorbed ones"
        );
    }
}
