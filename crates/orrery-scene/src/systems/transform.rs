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
use orrery_data::ecs::components::{PreviousFrameTransformComponent, TransformComponent};
use orrery_data::ecs::ComponentManager;

/// Captures every entity's current world matrix into its
/// [`PreviousFrameTransformComponent`] before this frame moves anything.
///
/// Runs first in the frame so that motion-dependent consumers (velocity
/// buffers, interpolation) can compare against a coherent last-frame pose.
/// Entities without the component simply do not participate.
pub fn run_previous_frame_transform_update<'env>(
    scope: &JobScope<'_, 'env>,
    transforms: &'env ComponentManager<TransformComponent>,
    prev_transforms: &'env mut ComponentManager<PreviousFrameTransformComponent>,
) {
    let (entities, components) = prev_transforms.dense_parts_mut();
    let prev_slice = SharedSlice::new(components);

    scope.dispatch(
        prev_slice.len() as u32,
        SMALL_SUBTASK_GROUPSIZE,
        move |args| {
            let i = args.job_index as usize;
            // SAFETY: the dispatch hands each dense index to exactly one job
            // invocation, so no two jobs touch the same slot.
            let prev = unsafe { prev_slice.get_mut(i) };
            if let Some(transform) = transforms.get_by_entity(entities[i]) {
                prev.world = transform.world;
            }
        },
    );
}

/// Refreshes the cached local matrix of every dirty transform and seeds its
/// world matrix with it.
///
/// After this pass every transform without a parent already holds its final
/// world matrix; parented entities are corrected by the hierarchy pass that
/// follows. Clean transforms are skipped entirely.
pub fn run_transform_update<'env>(
    scope: &JobScope<'_, 'env>,
    transforms: &'env mut ComponentManager<TransformComponent>,
) {
    let slice = SharedSlice::new(transforms.components_mut());

    scope.dispatch(slice.len() as u32, SMALL_SUBTASK_GROUPSIZE, move |args| {
        // SAFETY: one job invocation per dense index; slots never overlap.
        let transform = unsafe { slice.get_mut(args.job_index as usize) };
        transform.update_transform();
    });
}
