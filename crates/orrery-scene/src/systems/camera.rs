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
use orrery_data::ecs::components::{CameraComponent, TransformComponent};
use orrery_data::ecs::ComponentManager;

/// Refreshes every camera's pose and matrix stack.
///
/// A camera whose entity has a transform is posed from the transform's
/// world matrix first; a free camera (no transform) keeps whatever pose was
/// written to it directly. Either way the view/projection matrices and
/// their inverses are rebuilt.
pub fn run_camera_update<'env>(
    scope: &JobScope<'_, 'env>,
    transforms: &'env ComponentManager<TransformComponent>,
    cameras: &'env mut ComponentManager<CameraComponent>,
) {
    let (entities, components) = cameras.dense_parts_mut();
    let camera_slice = SharedSlice::new(components);

    scope.dispatch(
        camera_slice.len() as u32,
        SMALL_SUBTASK_GROUPSIZE,
        move |args| {
            let i = args.job_index as usize;
            // SAFETY: one job invocation per dense index; slots never overlap.
            let camera = unsafe { camera_slice.get_mut(i) };
            if let Some(transform) = transforms.get_by_entity(entities[i]) {
                camera.transform_camera(transform);
            }
            camera.update_camera();
        },
    );
}
