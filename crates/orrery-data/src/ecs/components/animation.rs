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

use crate::ecs::Entity;

/// How a sampler interpolates between bracketing keyframes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnimationMode {
    /// Blend between the left and right keyframes.
    #[default]
    Linear,
    /// Snap to the left keyframe until the right one is reached.
    Step,
}

/// Which part of the target's local SRT a channel drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationPath {
    /// Drives the local translation (3 floats per key).
    Translation,
    /// Drives the local rotation (4 floats per key, quaternion xyzw).
    Rotation,
    /// Drives the local scale (3 floats per key).
    Scale,
}

/// One stream of keyframes: a time-sorted array of keys and the flat value
/// array they index, produced by an animation-data provider and treated as
/// opaque payload here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnimationSampler {
    /// Interpolation between bracketing keys.
    pub mode: AnimationMode,
    /// Key times in seconds, ascending.
    pub keyframe_times: Vec<f32>,
    /// Flat value stream: 3 floats per key for translation/scale paths,
    /// 4 per key for rotation.
    pub keyframe_data: Vec<f32>,
}

/// Binds one sampler to one property of one target entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationChannel {
    /// The entity whose transform this channel drives.
    pub target: Entity,
    /// Index into the owning animation's sampler list.
    pub sampler_index: u32,
    /// The driven property.
    pub path: AnimationPath,
}

/// A playable clip: channels, their samplers, and playback state.
///
/// Multiple channels of one clip may drive the same target transform
/// (translation and rotation of one bone, typically), which is why the
/// sampling pass is sequential per animation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationComponent {
    playing: bool,
    looped: bool,
    /// Clip-local start time in seconds.
    pub start: f32,
    /// Clip-local end time in seconds; looping wraps back to `start` once
    /// the timer passes it.
    pub end: f32,
    /// Current playback position in seconds.
    pub timer: f32,
    /// Blend weight of the sampled pose into the target's current pose,
    /// in `[0, 1]`.
    pub amount: f32,
    /// Playback speed multiplier.
    pub speed: f32,
    /// The channels this clip drives.
    pub channels: Vec<AnimationChannel>,
    /// The keyframe streams the channels index.
    pub samplers: Vec<AnimationSampler>,
}

impl AnimationComponent {
    /// Starts or resumes playback.
    pub fn play(&mut self) {
        self.playing = true;
    }

    /// Freezes the timer without resetting it; a paused clip keeps posing
    /// its targets at the frozen time.
    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Stops playback and rewinds to the clip start.
    pub fn stop(&mut self) {
        self.playing = false;
        self.timer = 0.0;
    }

    /// Sets whether the clip wraps back to `start` after passing `end`.
    pub fn set_looped(&mut self, looped: bool) {
        self.looped = looped;
    }

    /// Whether the timer is advancing.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether the clip wraps around at its end.
    pub fn is_looped(&self) -> bool {
        self.looped
    }

    /// Clip duration in seconds.
    pub fn length(&self) -> f32 {
        self.end - self.start
    }
}

impl Default for AnimationComponent {
    /// A stopped, looped, full-weight clip at normal speed.
    fn default() -> Self {
        Self {
            playing: false,
            looped: true,
            start: 0.0,
            end: 0.0,
            timer: 0.0,
            amount: 1.0,
            speed: 1.0,
            channels: Vec::new(),
            samplers: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playback_state_machine() {
        let mut animation = AnimationComponent::default();
        assert!(!animation.is_playing());
        assert!(animation.is_looped(), "Clips loop unless told otherwise");

        animation.play();
        assert!(animation.is_playing());

        animation.timer = 3.5;
        animation.pause();
        assert!(!animation.is_playing());
        assert_eq!(animation.timer, 3.5, "Pause must not rewind");

        animation.stop();
        assert!(!animation.is_playing());
        assert_eq!(animation.timer, 0.0, "Stop must rewind");
    }

    #[test]
    fn test_length_is_end_minus_start() {
        let animation = AnimationComponent {
            start: 2.0,
            end: 10.0,
            ..AnimationComponent::default()
        };
        assert_eq!(animation.length(), 8.0);
    }
}
