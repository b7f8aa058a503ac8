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

//! The concrete component records the scene pipeline operates on.
//!
//! Every type here is plain data with a meaningful `Default`, suitable for
//! dense storage in a [`ComponentManager`](crate::ecs::ComponentManager).
//! Fields marked "derived" are outputs the per-frame update passes
//! recompute; they are excluded from serialization and rebuilt after a
//! snapshot is restored.

mod animation;
mod armature;
mod camera;
mod decal;
mod emitter;
mod hierarchy;
mod layer;
mod light;
mod mesh;
mod name;
mod object;
mod probe;
mod transform;

pub use animation::*;
pub use armature::*;
pub use camera::*;
pub use decal::*;
pub use emitter::*;
pub use hierarchy::*;
pub use layer::*;
pub use light::*;
pub use mesh::*;
pub use name::*;
pub use object::*;
pub use probe::*;
pub use transform::*;
