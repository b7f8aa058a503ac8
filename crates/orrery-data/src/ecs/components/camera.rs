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

use orrery_core::math::{Mat4, Vec3, FRAC_PI_3};
use serde::{Deserialize, Serialize};

use super::TransformComponent;

fn default_at() -> Vec3 {
    Vec3::Z
}

fn default_up() -> Vec3 {
    Vec3::Y
}

/// A perspective camera.
///
/// The projection inputs (viewport size, clip planes, field of view) are
/// authored; eye/at/up and every matrix are derived. When the owning
/// entity has a transform, the per-kind derivation pass poses the camera
/// from the transform's world matrix, then refreshes the matrices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraComponent {
    /// Viewport width in pixels, used for the aspect ratio.
    pub width: f32,
    /// Viewport height in pixels, used for the aspect ratio.
    pub height: f32,
    /// Near clip plane distance.
    pub z_near: f32,
    /// Far clip plane distance.
    pub z_far: f32,
    /// Vertical field of view, in radians.
    pub fov: f32,
    /// Derived: world-space eye position.
    #[serde(skip)]
    pub eye: Vec3,
    /// Derived: world-space look direction (unit +Z rotated by the pose).
    #[serde(skip, default = "default_at")]
    pub at: Vec3,
    /// Derived: world-space up direction.
    #[serde(skip, default = "default_up")]
    pub up: Vec3,
    /// Derived view matrix.
    #[serde(skip)]
    pub view: Mat4,
    /// Derived projection matrix.
    #[serde(skip)]
    pub projection: Mat4,
    /// Derived view-projection product.
    #[serde(skip)]
    pub view_projection: Mat4,
    /// Derived inverse of the view matrix.
    #[serde(skip)]
    pub inverse_view: Mat4,
    /// Derived inverse of the projection matrix.
    #[serde(skip)]
    pub inverse_projection: Mat4,
    /// Derived inverse of the view-projection product.
    #[serde(skip)]
    pub inverse_view_projection: Mat4,
}

impl CameraComponent {
    /// Creates a camera with the given projection inputs and refreshes its
    /// matrices for an identity pose.
    pub fn create_perspective(width: f32, height: f32, z_near: f32, z_far: f32, fov: f32) -> Self {
        let mut camera = Self {
            width,
            height,
            z_near,
            z_far,
            fov,
            ..Self::default()
        };
        camera.update_camera();
        camera
    }

    /// Poses the camera from a transform's world matrix: the eye sits at
    /// the world translation, looking along the rotated +Z axis with the
    /// rotated +Y axis as up. Scale is ignored.
    pub fn transform_camera(&mut self, transform: &TransformComponent) {
        let (_, rotation, translation) = transform.world.to_scale_rotation_translation();
        self.eye = translation;
        self.at = rotation * Vec3::Z;
        self.up = rotation * Vec3::Y;
    }

    /// Rebuilds every matrix from the current pose and projection inputs.
    pub fn update_camera(&mut self) {
        self.view = Mat4::look_to_lh(self.eye, self.at, self.up);
        self.projection =
            Mat4::perspective_lh(self.fov, self.width / self.height, self.z_near, self.z_far);
        self.view_projection = self.projection * self.view;
        self.inverse_view = self.view.inverse();
        self.inverse_projection = self.projection.inverse();
        self.inverse_view_projection = self.view_projection.inverse();
    }
}

impl Default for CameraComponent {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            z_near: 0.1,
            z_far: 800.0,
            fov: FRAC_PI_3,
            eye: Vec3::ZERO,
            at: Vec3::Z,
            up: Vec3::Y,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            view_projection: Mat4::IDENTITY,
            inverse_view: Mat4::IDENTITY,
            inverse_projection: Mat4::IDENTITY,
            inverse_view_projection: Mat4::IDENTITY,
        }
    }
}
