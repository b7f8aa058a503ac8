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

use orrery_core::math::{Quat, Vec3};
use orrery_data::ecs::components::{
    AnimationComponent, AnimationMode, AnimationPath, TransformComponent,
};
use orrery_data::ecs::ComponentManager;

/// Samples every active animation clip and blends the results into the
/// targeted transforms.
///
/// For each channel the pass finds the keyframe pair bracketing the clip
/// timer, interpolates between them (`Linear`) or snaps to the left key
/// (`Step`), and then blends the sampled value into the target transform by
/// the clip's blend `amount`. Touched transforms are flagged dirty so the
/// transform pass that follows rebuilds their matrices.
///
/// Runs single-threaded: several channels (possibly from several clips) may
/// legally target the same transform, and their writes must land in a stable
/// order.
pub fn run_animation_update(
    animations: &mut ComponentManager<AnimationComponent>,
    transforms: &mut ComponentManager<TransformComponent>,
    dt: f32,
) {
    for i in 0..animations.len() {
        let animation = &mut animations[i];

        // A stopped clip that was rewound has nothing left to apply.
        if !animation.is_playing() && animation.timer == 0.0 {
            continue;
        }

        for channel in &animation.channels {
            debug_assert!(
                (channel.sampler_index as usize) < animation.samplers.len(),
                "channel references missing sampler {}",
                channel.sampler_index
            );
            let Some(sampler) = animation.samplers.get(channel.sampler_index as usize) else {
                continue;
            };
            let times = &sampler.keyframe_times;
            if times.is_empty() {
                continue;
            }

            // Stage 1: locate the keyframe pair bracketing the timer. A timer
            // past the last key clamps to it; a timer before the first key
            // collapses the pair onto the first.
            let last = times.len() - 1;
            let (key_left, key_right) = if times[last] < animation.timer {
                (last, last)
            } else {
                let mut key_right = 0;
                while times[key_right] < animation.timer {
                    key_right += 1;
                }
                (key_right.saturating_sub(1), key_right)
            };

            // Stage 2: interpolation factor. A collapsed pair or step mode
            // snaps to the left key; otherwise `times[key_left] < timer <=
            // times[key_right]`, so the divisor is nonzero.
            let t = if key_left == key_right || sampler.mode == AnimationMode::Step {
                0.0
            } else {
                (animation.timer - times[key_left]) / (times[key_right] - times[key_left])
            };

            // Stage 3: sample the channel and blend it into the target by the
            // clip's blend amount.
            let data = &sampler.keyframe_data;
            let stride = match channel.path {
                AnimationPath::Rotation => 4,
                AnimationPath::Translation | AnimationPath::Scale => 3,
            };
            debug_assert!(
                data.len() >= times.len() * stride,
                "channel keyframe data is shorter than its keyframe times"
            );
            if data.len() < times.len() * stride {
                continue;
            }

            let Some(target) = transforms.get_by_entity_mut(channel.target) else {
                continue;
            };

            match channel.path {
                AnimationPath::Translation => {
                    let left = Vec3::from_slice(&data[key_left * 3..]);
                    let right = Vec3::from_slice(&data[key_right * 3..]);
                    let sampled = left.lerp(right, t);
                    target.translation = target.translation.lerp(sampled, animation.amount);
                }
                AnimationPath::Rotation => {
                    let left = Quat::from_slice(&data[key_left * 4..]);
                    let right = Quat::from_slice(&data[key_right * 4..]);
                    let sampled = left.slerp(right, t).normalize();
                    target.rotation = target.rotation.slerp(sampled, animation.amount).normalize();
                }
                AnimationPath::Scale => {
                    let left = Vec3::from_slice(&data[key_left * 3..]);
                    let right = Vec3::from_slice(&data[key_right * 3..]);
                    let sampled = left.lerp(right, t);
                    target.scale = target.scale.lerp(sampled, animation.amount);
                }
            }
            target.set_dirty();
        }

        // Stage 4: advance the clock. A looped clip that ran past its end
        // snaps back to the start; the overshoot is deliberately dropped.
        if animation.is_playing() {
            animation.timer += dt * animation.speed;
        }
        if animation.is_looped() && animation.timer > animation.end {
            animation.timer = animation.start;
        }
    }
}
