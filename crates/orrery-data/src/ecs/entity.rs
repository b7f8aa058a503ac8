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

use serde::{Deserialize, Serialize};

/// An opaque handle identifying one thing in a scene.
///
/// An entity carries no data of its own; it only serves as the join key
/// across the per-kind component managers. The zero id is reserved as the
/// invalid sentinel, and ids are never reused while the entity is logically
/// alive, so a stored `Entity` can always be compared for identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity(u64);

impl Entity {
    /// The reserved "no entity" sentinel.
    pub const INVALID: Entity = Entity(0);

    /// Whether this handle refers to an actual entity.
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }

    /// The raw id behind the handle, mainly useful for logging.
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::INVALID
    }
}

/// Issues entity ids as a monotonic counter above [`Entity::INVALID`].
///
/// Allocation takes `&mut self`, which pins it to the single orchestrating
/// thread; worker jobs never create entities. There is no recycling and no
/// failure path. The allocator is serialized alongside the scene so that a
/// restored scene keeps issuing fresh ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityAllocator {
    next: u64,
}

impl EntityAllocator {
    /// Creates an allocator whose first id is 1.
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Creates an allocator whose first id is `first` (clamped above the
    /// invalid id). Useful to keep id ranges disjoint between two scenes
    /// that will later be merged.
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: first.max(1),
        }
    }

    /// Returns a fresh, never-before-issued entity id.
    pub fn allocate(&mut self) -> Entity {
        let entity = Entity(self.next);
        self.next += 1;
        entity
    }

    /// The id the next call to [`EntityAllocator::allocate`] would return.
    pub fn peek_next(&self) -> u64 {
        self.next
    }

    /// Ensures this allocator will never issue an id below `floor`. Called
    /// when merging scenes so the absorbed scene's ids stay unique.
    pub fn reserve_up_to(&mut self, floor: u64) {
        self.next = self.next.max(floor);
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}
