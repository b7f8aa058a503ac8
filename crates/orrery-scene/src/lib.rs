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

//! # Orrery Scene
//!
//! The scene aggregate and its per-frame update pipeline.
//!
//! A [`Scene`] is a bundle of [`ComponentManager`](orrery_data::ecs::ComponentManager)
//! columns plus the derived scene-wide state (world bounds, reflection plane).
//! [`Scene::update`] drives one simulation frame: animation sampling, local and
//! parented transform refresh, skinning palettes, bounds, and the per-kind
//! derived fields, with the data-parallel phases fanned out over a
//! [`JobSystem`](orrery_core::JobSystem).
//!
//! The [`snapshot`] module round-trips a whole scene through a compact binary
//! encoding; derived state is rebuilt on the first update after a restore.

#![warn(missing_docs)]

mod scene;
pub mod snapshot;
pub mod systems;

pub use scene::Scene;
