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

use orrery_data::ecs::components::{HierarchyComponent, LayerComponent, TransformComponent};
use orrery_data::ecs::ComponentManager;

/// Composes parented world matrices and cascades layer masks down the tree.
///
/// Relies on the hierarchy table's ordering invariant: every parent's record
/// sits before its children's records (maintained by
/// [`Scene::attach`](crate::Scene::attach)), so one forward sweep sees each
/// parent's final world matrix before any of its children read it. Because
/// each step reads matrices written earlier in the same sweep, this pass is
/// inherently sequential.
///
/// An entity whose parent has no transform keeps its last world matrix;
/// masks only cascade where both ends carry a [`LayerComponent`].
pub fn run_hierarchy_update(
    hierarchy: &ComponentManager<HierarchyComponent>,
    transforms: &mut ComponentManager<TransformComponent>,
    layers: &mut ComponentManager<LayerComponent>,
) {
    for i in 0..hierarchy.len() {
        let entity = hierarchy.entity(i);
        let link = &hierarchy[i];
        let parent_id = link.parent_id;
        let inverse_parent_bind = link.inverse_parent_bind;
        let layer_mask_bind = link.layer_mask_bind;

        let Some(parent_world) = transforms.get_by_entity(parent_id).map(|t| t.world) else {
            continue;
        };
        if let Some(transform) = transforms.get_by_entity_mut(entity) {
            transform.update_transform_parented(parent_world, inverse_parent_bind);
        }

        // The child's effective mask is its attach-time mask restricted by
        // the parent's. Parents earlier in the sweep have already been
        // restricted themselves, so masks narrow all the way down a chain.
        let parent_mask = layers.get_by_entity(parent_id).map(|l| l.layer_mask);
        if let (Some(parent_mask), Some(layer)) = (parent_mask, layers.get_by_entity_mut(entity)) {
            layer.layer_mask = layer_mask_bind & parent_mask;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_core::math::{Mat4, Vec3};
    use orrery_data::ecs::{Entity, EntityAllocator};

    fn settled_transform(
        transforms: &mut ComponentManager<TransformComponent>,
        entity: Entity,
        translation: Vec3,
    ) {
        let slot = transforms.create(entity);
        let transform = transforms.get_mut(slot);
        transform.translation = translation;
        transform.update_transform();
    }

    #[test]
    fn test_children_compose_on_top_of_parent_world() {
        // --- 1. ARRANGE ---
        // parent at x=10, child at local x=1, attached with identity bind.
        let mut allocator = EntityAllocator::new();
        let parent = allocator.allocate();
        let child = allocator.allocate();

        let mut transforms = ComponentManager::new();
        settled_transform(&mut transforms, parent, Vec3::new(10.0, 0.0, 0.0));
        settled_transform(&mut transforms, child, Vec3::new(1.0, 0.0, 0.0));

        let mut hierarchy = ComponentManager::<HierarchyComponent>::new();
        let slot = hierarchy.create(child);
        hierarchy.get_mut(slot).parent_id = parent;

        let mut layers = ComponentManager::new();

        // --- 2. ACT ---
        run_hierarchy_update(&hierarchy, &mut transforms, &mut layers);

        // --- 3. ASSERT ---
        let child_world = transforms.get_by_entity(child).unwrap().world;
        assert_eq!(
            child_world.w_axis.truncate(),
            Vec3::new(11.0, 0.0, 0.0),
            "the child's world position should stack its offset on the parent's"
        );
    }

    #[test]
    fn test_sweep_is_idempotent_for_settled_trees() {
        // --- 1. ARRANGE ---
        let mut allocator = EntityAllocator::new();
        let parent = allocator.allocate();
        let child = allocator.allocate();

        let mut transforms = ComponentManager::new();
        settled_transform(&mut transforms, parent, Vec3::new(4.0, 0.0, 0.0));
        settled_transform(&mut transforms, child, Vec3::new(0.0, 2.0, 0.0));

        let mut hierarchy = ComponentManager::<HierarchyComponent>::new();
        let slot = hierarchy.create(child);
        hierarchy.get_mut(slot).parent_id = parent;

        let mut layers = ComponentManager::new();

        // --- 2. ACT ---
        run_hierarchy_update(&hierarchy, &mut transforms, &mut layers);
        let first = transforms.get_by_entity(child).unwrap().world;
        run_hierarchy_update(&hierarchy, &mut transforms, &mut layers);
        let second = transforms.get_by_entity(child).unwrap().world;

        // --- 3. ASSERT ---
        assert_eq!(
            first, second,
            "re-running the sweep over an unchanged tree must not move anything"
        );
        assert_eq!(first.w_axis.truncate(), Vec3::new(4.0, 2.0, 0.0));
    }

    #[test]
    fn test_layer_masks_narrow_down_a_chain() {
        // --- 1. ARRANGE ---
        // grandparent mask 0b0011, parent bound with 0b0110, child with 0b1111.
        let mut allocator = EntityAllocator::new();
        let grandparent = allocator.allocate();
        let parent = allocator.allocate();
        let child = allocator.allocate();

        let mut transforms = ComponentManager::new();
        for entity in [grandparent, parent, child] {
            settled_transform(&mut transforms, entity, Vec3::ZERO);
        }

        let mut layers = ComponentManager::<LayerComponent>::new();
        let slot = layers.create(grandparent);
        layers.get_mut(slot).layer_mask = 0b0011;
        layers.create(parent);
        layers.create(child);

        // Records in parent-before-child order, as attach would keep them.
        let mut hierarchy = ComponentManager::<HierarchyComponent>::new();
        let slot = hierarchy.create(parent);
        let link = hierarchy.get_mut(slot);
        link.parent_id = grandparent;
        link.layer_mask_bind = 0b0110;
        let slot = hierarchy.create(child);
        let link = hierarchy.get_mut(slot);
        link.parent_id = parent;
        link.layer_mask_bind = 0b1111;

        // --- 2. ACT ---
        run_hierarchy_update(&hierarchy, &mut transforms, &mut layers);

        // --- 3. ASSERT ---
        assert_eq!(
            layers.get_by_entity(parent).unwrap().layer_mask,
            0b0010,
            "the parent's mask should be its bind mask restricted by the grandparent"
        );
        assert_eq!(
            layers.get_by_entity(child).unwrap().layer_mask,
            0b0010,
            "restrictions should cascade through every level in one sweep"
        );
    }

    #[test]
    fn test_missing_parent_transform_leaves_child_in_place() {
        // --- 1. ARRANGE ---
        let mut allocator = EntityAllocator::new();
        let parent = allocator.allocate();
        let child = allocator.allocate();

        let mut transforms = ComponentManager::new();
        settled_transform(&mut transforms, child, Vec3::new(1.0, 2.0, 3.0));
        // The parent never gets a transform.

        let mut hierarchy = ComponentManager::<HierarchyComponent>::new();
        let slot = hierarchy.create(child);
        hierarchy.get_mut(slot).parent_id = parent;

        let mut layers = ComponentManager::new();

        // --- 2. ACT ---
        run_hierarchy_update(&hierarchy, &mut transforms, &mut layers);

        // --- 3. ASSERT ---
        assert_eq!(
            transforms.get_by_entity(child).unwrap().world,
            Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)),
            "a child with no resolvable parent keeps its own world matrix"
        );
    }
}
