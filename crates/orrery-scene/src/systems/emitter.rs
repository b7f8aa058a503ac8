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

use orrery_core::jobs::SMALL_SUBTASK_GROUPSIZE;
use orrery_core::{JobScope, SharedSlice};
use orrery_data::ecs::components::{EmitterComponent, TransformComponent};
use orrery_data::ecs::ComponentManager;

/// Advances every emitter's emission budget by one frame.
///
/// `rate * dt` particles are added to the fractional budget; the whole part
/// becomes this frame's `burst` for the particle backend and the remainder
/// is carried over, so low rates still emit eventually. The budget advances
/// even without a transform; only the world-space center needs one.
pub fn run_emitter_update<'env>(
    scope: &JobScope<'_, 'env>,
    transforms: &'env ComponentManager<TransformComponent>,
    emitters: &'env mut ComponentManager<EmitterComponent>,
    dt: f32,
) {
    let (entities, components) = emitters.dense_parts_mut();
    let emitter_slice = SharedSlice::new(components);

    scope.dispatch(
        emitter_slice.len() as u32,
        SMALL_SUBTASK_GROUPSIZE,
        move |args| {
            let i = args.job_index as usize;
            // SAFETY: one job invocation per dense index; slots never overlap.
            let emitter = unsafe { emitter_slice.get_mut(i) };

            emitter.accumulated += emitter.rate * dt;
            emitter.burst = emitter.accumulated as u32;
            emitter.accumulated -= emitter.burst as f32;

            if let Some(transform) = transforms.get_by_entity(entities[i]) {
                emitter.center = transform.position();
            }
        },
    );
}
