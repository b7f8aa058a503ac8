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

//! Implements the entity-component storage layer.
//!
//! The model is a column store: each component kind lives in its own
//! [`ComponentManager`], and an entity "has" a component of that kind iff
//! the manager contains an entry for it. Entities themselves carry no data;
//! they are only the join key across managers.
//!
//! The layout of one manager is a pair of parallel dense arrays (components
//! and their owning entities) plus an indirection table that keeps
//! [`ComponentRef`] handles valid while removals compact the dense storage
//! by swapping the last element into the freed slot. Bulk per-frame systems
//! iterate the dense arrays directly; random access goes through the
//! entity lookup.

mod entity;
mod manager;

pub mod components;

pub use entity::*;
pub use manager::*;
