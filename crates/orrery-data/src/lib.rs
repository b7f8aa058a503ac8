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

//! # Orrery Data
//!
//! Entity identity and dense component storage for the Orrery scene engine.
//!
//! This crate provides the two storage primitives everything above it is
//! built from, plus the concrete component set the scene pipeline operates
//! on:
//!
//! - [`ecs::Entity`] and [`ecs::EntityAllocator`]: opaque 64-bit handles and
//!   the single-threaded counter that issues them.
//! - [`ecs::ComponentManager`]: a dense-array container mapping entities to
//!   components of one kind, with stable handles that survive compaction.
//! - [`ecs::components`]: the plain-data component records (transforms,
//!   hierarchy links, meshes, lights, animations, ...).
//!
//! The scene aggregate and the per-frame update systems that consume these
//! types live in `orrery-scene`.

#![warn(missing_docs)]

pub mod ecs;
