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

use std::ops::{Index, IndexMut};

use ahash::AHashMap;
use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeStruct, Serializer};

use super::Entity;

/// Marker stored in the indirection table for retired ref slots.
const TOMBSTONE: usize = usize::MAX;

/// A stable handle to one component inside one [`ComponentManager`].
///
/// Refs stay valid while removals compact the dense storage underneath
/// them; resolving one costs a single indirection. A ref is only
/// meaningful to the manager that issued it. After the component it points
/// to is removed, the ref is stale and resolving it through
/// [`ComponentManager::get`] panics (until the slot is recycled by a later
/// create, at which point staleness can no longer be detected — holders
/// must not cache refs across removals they do not control).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentRef(usize);

impl ComponentRef {
    /// The explicit "not found" sentinel returned by
    /// [`ComponentManager::find`].
    pub const INVALID: ComponentRef = ComponentRef(usize::MAX);

    /// Whether this ref is something other than the sentinel.
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

/// Dense storage for every component of one kind.
///
/// Layout:
/// - `components` is a contiguous array of `T`, and `entities` is a
///   parallel array where `entities[i]` owns `components[i]`. Bulk systems
///   iterate these directly.
/// - `lookup` maps an entity to its [`ComponentRef`], and `indices` maps a
///   ref to the component's current dense index. Removal compacts the
///   dense arrays by swapping the last element into the hole, then repairs
///   the moved element's `indices` entry, so refs survive compaction.
/// - `dead` is a free-list of retired ref slots, recycled by `create`.
///
/// A manager never holds two components for the same entity, and the dense
/// arrays and the lookup always have the same population. There is no
/// interior locking; the scene pipeline separates writers from readers
/// with job barriers instead.
pub struct ComponentManager<T> {
    components: Vec<T>,
    entities: Vec<Entity>,
    lookup: AHashMap<Entity, ComponentRef>,
    indices: Vec<usize>,
    dead: Vec<ComponentRef>,
}

impl<T: Default> ComponentManager<T> {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
            entities: Vec::new(),
            lookup: AHashMap::new(),
            indices: Vec::new(),
            dead: Vec::new(),
        }
    }

    /// Creates an empty manager with room for `capacity` components.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut manager = Self::new();
        manager.reserve(capacity);
        manager
    }

    /// Reserves room for at least `additional` more components.
    pub fn reserve(&mut self, additional: usize) {
        self.components.reserve(additional);
        self.entities.reserve(additional);
        self.indices.reserve(additional);
        self.lookup.reserve(additional);
    }

    /// Creates a default-initialized component for `entity` and returns its
    /// ref.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is the invalid sentinel or already has a
    /// component in this manager. Duplicate creation is a contract
    /// violation in all build configurations, not a recoverable condition.
    pub fn create(&mut self, entity: Entity) -> ComponentRef {
        assert!(
            entity.is_valid(),
            "cannot create a component for the invalid entity"
        );
        assert!(
            !self.lookup.contains_key(&entity),
            "entity {} already has a component in this manager",
            entity.raw()
        );

        let slot = self.allocate_slot(self.components.len());
        self.lookup.insert(entity, slot);
        self.entities.push(entity);
        self.components.push(T::default());
        slot
    }

    /// Removes `entity`'s component, if present. O(1); the dense hole is
    /// filled by swapping the last element in, which does not invalidate
    /// any ref.
    pub fn remove(&mut self, entity: Entity) {
        if let Some(slot) = self.lookup.remove(&entity) {
            self.swap_remove_slot(slot);
        }
    }

    /// Removes the component behind `slot`, if it is live. Equivalent to
    /// [`ComponentManager::remove`] on the owning entity.
    pub fn remove_ref(&mut self, slot: ComponentRef) {
        if !self.is_live(slot) {
            return;
        }
        let entity = self.entities[self.indices[slot.0]];
        self.lookup.remove(&entity);
        self.swap_remove_slot(slot);
    }

    /// Removes `entity`'s component while preserving the relative dense
    /// order of everything else, at O(n) shifting cost.
    ///
    /// Used where dense order carries meaning, such as the hierarchy table
    /// keeping parents ahead of their children.
    pub fn remove_keep_sorted(&mut self, entity: Entity) {
        let Some(slot) = self.lookup.remove(&entity) else {
            return;
        };
        let index = self.indices[slot.0];
        self.components.remove(index);
        self.entities.remove(index);
        // Everything after the hole shifted one slot down.
        for i in index..self.entities.len() {
            let shifted = self.lookup[&self.entities[i]];
            self.indices[shifted.0] = i;
        }
        self.indices[slot.0] = TOMBSTONE;
        self.dead.push(slot);
    }

    /// Moves the component at dense index `from` to dense index `to`,
    /// shifting everything in between by one while keeping its relative
    /// order. Refs stay attached to their entities.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub fn move_item(&mut self, from: usize, to: usize) {
        assert!(
            from < self.len() && to < self.len(),
            "move_item indices out of range"
        );
        if from == to {
            return;
        }

        if from < to {
            self.components[from..=to].rotate_left(1);
            self.entities[from..=to].rotate_left(1);
        } else {
            self.components[to..=from].rotate_right(1);
            self.entities[to..=from].rotate_right(1);
        }

        let (lo, hi) = if from < to { (from, to) } else { (to, from) };
        for i in lo..=hi {
            let slot = self.lookup[&self.entities[i]];
            self.indices[slot.0] = i;
        }
    }

    /// Exchanges the dense storage of two live components without
    /// invalidating either ref's entity association.
    ///
    /// # Panics
    ///
    /// Panics if either ref is not live.
    pub fn swap(&mut self, a: ComponentRef, b: ComponentRef) {
        assert!(
            self.is_live(a) && self.is_live(b),
            "swap requires two live refs"
        );
        if a == b {
            return;
        }
        let index_a = self.indices[a.0];
        let index_b = self.indices[b.0];
        self.components.swap(index_a, index_b);
        self.entities.swap(index_a, index_b);
        self.indices[a.0] = index_b;
        self.indices[b.0] = index_a;
    }

    /// Whether `entity` has a component in this manager.
    pub fn contains(&self, entity: Entity) -> bool {
        self.lookup.contains_key(&entity)
    }

    /// Returns `entity`'s ref, or [`ComponentRef::INVALID`] if the entity
    /// has no component here. O(1) average.
    pub fn find(&self, entity: Entity) -> ComponentRef {
        self.lookup
            .get(&entity)
            .copied()
            .unwrap_or(ComponentRef::INVALID)
    }

    /// Resolves a ref to its component.
    ///
    /// # Panics
    ///
    /// Panics if the ref is invalid or stale.
    pub fn get(&self, slot: ComponentRef) -> &T {
        assert!(self.is_live(slot), "component ref is invalid or stale");
        &self.components[self.indices[slot.0]]
    }

    /// Resolves a ref to its component, mutably.
    ///
    /// # Panics
    ///
    /// Panics if the ref is invalid or stale.
    pub fn get_mut(&mut self, slot: ComponentRef) -> &mut T {
        assert!(self.is_live(slot), "component ref is invalid or stale");
        &mut self.components[self.indices[slot.0]]
    }

    /// Returns `entity`'s component, or `None` if it has none here.
    pub fn get_by_entity(&self, entity: Entity) -> Option<&T> {
        self.lookup
            .get(&entity)
            .map(|slot| &self.components[self.indices[slot.0]])
    }

    /// Returns `entity`'s component mutably, or `None` if it has none here.
    pub fn get_by_entity_mut(&mut self, entity: Entity) -> Option<&mut T> {
        match self.lookup.get(&entity) {
            Some(slot) => Some(&mut self.components[self.indices[slot.0]]),
            None => None,
        }
    }

    /// The entity owning the component at dense index `index`.
    pub fn entity(&self, index: usize) -> Entity {
        self.entities[index]
    }

    /// The dense entity column, parallel to the component column.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// The dense component column.
    pub fn components(&self) -> &[T] {
        &self.components
    }

    /// The dense component column, mutably.
    pub fn components_mut(&mut self) -> &mut [T] {
        &mut self.components
    }

    /// Both dense columns at once, with the component column mutable.
    /// Parallel systems split a manager this way to read owners while
    /// writing components.
    pub fn dense_parts_mut(&mut self) -> (&[Entity], &mut [T]) {
        (&self.entities, &mut self.components)
    }

    /// Number of components stored.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the manager holds no components.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Iterates the dense storage in order as `(owner, component)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.entities.iter().copied().zip(self.components.iter())
    }

    /// Removes every component and retires every ref.
    pub fn clear(&mut self) {
        self.components.clear();
        self.entities.clear();
        self.lookup.clear();
        self.indices.clear();
        self.dead.clear();
    }

    /// Moves every component out of `other` and appends it here, leaving
    /// `other` empty. The caller guarantees the two managers share no
    /// entity.
    pub fn merge(&mut self, other: &mut Self) {
        self.reserve(other.len());
        for i in 0..other.len() {
            let entity = other.entities[i];
            debug_assert!(
                !self.contains(entity),
                "merge source and target both hold entity {}",
                entity.raw()
            );
            let slot = self.allocate_slot(self.components.len());
            self.lookup.insert(entity, slot);
            self.entities.push(entity);
            self.components.push(std::mem::take(&mut other.components[i]));
        }
        other.clear();
    }

    /// Whether `slot` currently resolves to a component.
    fn is_live(&self, slot: ComponentRef) -> bool {
        slot.0 < self.indices.len() && self.indices[slot.0] != TOMBSTONE
    }

    /// Recycles a retired ref slot or mints a new one, pointing it at
    /// `dense_index`.
    fn allocate_slot(&mut self, dense_index: usize) -> ComponentRef {
        match self.dead.pop() {
            Some(slot) => {
                self.indices[slot.0] = dense_index;
                slot
            }
            None => {
                let slot = ComponentRef(self.indices.len());
                self.indices.push(dense_index);
                slot
            }
        }
    }

    /// Swap-removes the dense entry behind `slot` and repairs the moved
    /// element's indirection. The lookup entry must already be gone.
    ///
    /// This repair is the one step refs depend on: the ref that resolved
    /// to the old last index must resolve to the hole it was swapped into.
    fn swap_remove_slot(&mut self, slot: ComponentRef) {
        let index = self.indices[slot.0];
        let last = self.components.len() - 1;
        if index < last {
            self.components.swap(index, last);
            self.entities.swap(index, last);
            let moved = self.lookup[&self.entities[index]];
            self.indices[moved.0] = index;
        }
        self.components.pop();
        self.entities.pop();
        self.indices[slot.0] = TOMBSTONE;
        self.dead.push(slot);
    }
}

impl<T: Default> Default for ComponentManager<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Default> Index<usize> for ComponentManager<T> {
    type Output = T;

    /// Direct dense access for bulk iteration; `index` must be below
    /// [`ComponentManager::len`].
    fn index(&self, index: usize) -> &T {
        &self.components[index]
    }
}

impl<T: Default> IndexMut<usize> for ComponentManager<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.components[index]
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ComponentManager<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentManager")
            .field("entities", &self.entities)
            .field("components", &self.components)
            .finish_non_exhaustive()
    }
}

/// Serializes only the two dense columns, in dense order; the indirection
/// state is rebuilt on decode.
impl<T: Serialize> Serialize for ComponentManager<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("ComponentManager", 2)?;
        state.serialize_field("entities", &self.entities)?;
        state.serialize_field("components", &self.components)?;
        state.end()
    }
}

/// Decodes the dense columns and rebuilds `lookup` and `indices` from
/// scratch, preserving dense order exactly. Malformed input (column length
/// mismatch, invalid or duplicate entities) is a decode error, never a
/// panic.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for ComponentManager<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        struct DenseColumns<T> {
            entities: Vec<Entity>,
            components: Vec<T>,
        }

        let dense = DenseColumns::<T>::deserialize(deserializer)?;
        if dense.entities.len() != dense.components.len() {
            return Err(de::Error::custom(
                "entity and component columns have different lengths",
            ));
        }

        let mut lookup = AHashMap::with_capacity(dense.entities.len());
        let mut indices = Vec::with_capacity(dense.entities.len());
        for (index, &entity) in dense.entities.iter().enumerate() {
            if !entity.is_valid() {
                return Err(de::Error::custom("invalid entity in component column"));
            }
            let slot = ComponentRef(indices.len());
            indices.push(index);
            if lookup.insert(entity, slot).is_some() {
                return Err(de::Error::custom("duplicate entity in component column"));
            }
        }

        Ok(Self {
            components: dense.components,
            entities: dense.entities,
            lookup,
            indices,
            dead: Vec::new(),
        })
    }
}
