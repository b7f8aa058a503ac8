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

use orrery_core::math::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// What role a transform plays in the scene graph.
///
/// Rig joints behave like any other transform during propagation, but a
/// few consumers (skinning above all) need to tell them apart from
/// ordinary nodes; they query this tag instead of inspecting types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransformKind {
    /// An ordinary scene node.
    #[default]
    Free,
    /// A joint belonging to an armature's bone collection.
    Bone,
}

/// An entity's placement: local scale/rotation/translation plus the world
/// matrix derived from them every frame.
///
/// The local SRT fields are the authoritative input. Mutating them directly
/// requires a matching [`TransformComponent::set_dirty`] call (the mutator
/// methods below do both); the per-frame local update recomputes the cached
/// local matrix only for dirty transforms and clears the flag. For
/// parentless entities the world matrix equals the local matrix; for
/// attached entities the hierarchy pass overwrites `world` afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformComponent {
    /// Local translation, applied last.
    pub translation: Vec3,
    /// Local rotation.
    pub rotation: Quat,
    /// Local scale, applied first.
    pub scale: Vec3,
    /// Role of this transform in the scene graph.
    pub kind: TransformKind,
    // Decodes as dirty so the first update after a restore rebuilds the
    // skipped matrices from the SRT fields.
    #[serde(skip, default = "default_dirty")]
    dirty: bool,
    #[serde(skip)]
    local: Mat4,
    /// World matrix derived by the pipeline. Read-only for consumers;
    /// write back through [`TransformComponent::apply_world`] if an
    /// external collaborator (physics) produced a new placement.
    #[serde(skip)]
    pub world: Mat4,
}

impl TransformComponent {
    /// Creates a transform at `translation` with identity rotation and
    /// unit scale.
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::default()
        }
    }

    /// Whether the local SRT changed since the last local update.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Marks the local SRT as changed so the next local update recomputes
    /// the matrices.
    pub fn set_dirty(&mut self) {
        self.dirty = true;
    }

    /// Recomputes the cached local matrix (scale, then rotation, then
    /// translation) and resets the world matrix to it, if and only if the
    /// transform is dirty. Clean transforms are skipped entirely; minimal
    /// recomputation is part of this method's contract, not an
    /// optimization.
    pub fn update_transform(&mut self) {
        if self.dirty {
            self.dirty = false;
            self.local =
                Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation);
            self.world = self.local;
        }
    }

    /// Re-bases this transform's world matrix under `parent_world`,
    /// composing the cached local matrix with the bind-time inverse parent
    /// matrix captured at attach.
    ///
    /// Reuses the cached local matrix rather than re-deriving it from SRT;
    /// a still-dirty local (possible when called from attach, outside the
    /// pipeline) is refreshed first.
    pub fn update_transform_parented(&mut self, parent_world: Mat4, inverse_parent_bind: Mat4) {
        if self.dirty {
            self.update_transform();
        }
        self.world = parent_world * inverse_parent_bind * self.local;
    }

    /// Bakes the current world matrix back into the local SRT fields and
    /// marks the transform dirty. Used when detaching from a parent so the
    /// entity keeps its world placement.
    pub fn apply_transform(&mut self) {
        let (scale, rotation, translation) = self.world.to_scale_rotation_translation();
        self.scale = scale;
        self.rotation = rotation;
        self.translation = translation;
        self.dirty = true;
    }

    /// Adopts an externally produced world matrix (a physics write-back)
    /// and decomposes it into the local SRT, to be picked up like any
    /// other dirty transform by the next local update.
    pub fn apply_world(&mut self, world: Mat4) {
        self.world = world;
        self.apply_transform();
    }

    /// Resets the local SRT to identity and marks the transform dirty.
    pub fn clear_transform(&mut self) {
        self.translation = Vec3::ZERO;
        self.rotation = Quat::IDENTITY;
        self.scale = Vec3::ONE;
        self.dirty = true;
    }

    /// Adds `offset` to the local translation.
    pub fn translate(&mut self, offset: Vec3) {
        self.translation += offset;
        self.dirty = true;
    }

    /// Applies `quaternion` on top of the current local rotation.
    pub fn rotate(&mut self, quaternion: Quat) {
        self.rotation = (quaternion * self.rotation).normalize();
        self.dirty = true;
    }

    /// Multiplies the local scale componentwise by `factor`.
    pub fn scale_by(&mut self, factor: Vec3) {
        self.scale *= factor;
        self.dirty = true;
    }

    /// World-space position (the world matrix's translation column).
    pub fn position(&self) -> Vec3 {
        self.world.w_axis.truncate()
    }
}

fn default_dirty() -> bool {
    true
}

impl Default for TransformComponent {
    /// An identity transform, born dirty so the first update publishes its
    /// world matrix.
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            kind: TransformKind::Free,
            dirty: true,
            local: Mat4::IDENTITY,
            world: Mat4::IDENTITY,
        }
    }
}

/// Shadow copy of an entity's world matrix from the previous frame, taken
/// at the top of every update for motion-dependent consumers (velocity
/// buffers, physics interpolation).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreviousFrameTransformComponent {
    /// Last frame's world matrix.
    #[serde(skip)]
    pub world: Mat4,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use orrery_core::math::FRAC_PI_2;

    #[test]
    fn test_update_applies_scale_then_rotation_then_translation() {
        let mut transform = TransformComponent {
            translation: Vec3::new(1.0, 0.0, 0.0),
            rotation: Quat::from_rotation_z(FRAC_PI_2),
            scale: Vec3::splat(2.0),
            ..TransformComponent::default()
        };

        transform.update_transform();

        // (1,0,0) scaled to (2,0,0), rotated to (0,2,0), translated to (1,2,0).
        let moved = transform.world.transform_point3(Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(moved.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(moved.y, 2.0, epsilon = 1e-5);
        assert_relative_eq!(moved.z, 0.0, epsilon = 1e-5);
        assert!(!transform.is_dirty(), "Update must clear the dirty flag");
    }

    #[test]
    fn test_clean_transform_is_not_recomputed() {
        let mut transform = TransformComponent::from_translation(Vec3::new(3.0, 0.0, 0.0));
        transform.update_transform();
        let world_before = transform.world;

        // A direct field write without set_dirty must be ignored by the
        // update; that is the dirty contract, not a bug.
        transform.translation = Vec3::new(100.0, 0.0, 0.0);
        transform.update_transform();
        assert_eq!(transform.world, world_before);

        // Once marked, the same mutation is picked up.
        transform.set_dirty();
        transform.update_transform();
        assert_eq!(
            transform.world.w_axis.truncate(),
            Vec3::new(100.0, 0.0, 0.0)
        );
    }

    #[test]
    fn test_parented_update_composes_with_bind_matrix() {
        let mut parent = TransformComponent::from_translation(Vec3::new(5.0, 0.0, 0.0));
        parent.update_transform();

        let mut child = TransformComponent::from_translation(Vec3::new(1.0, 0.0, 0.0));
        child.update_transform();
        child.update_transform_parented(parent.world, Mat4::IDENTITY);

        assert_relative_eq!(child.position().x, 6.0, epsilon = 1e-5);

        // With the bind matrix set to the inverse of the parent's world at
        // attach time, the child must keep its own world placement.
        let mut bound = TransformComponent::from_translation(Vec3::new(1.0, 0.0, 0.0));
        bound.update_transform();
        bound.update_transform_parented(parent.world, parent.world.inverse());
        assert_relative_eq!(bound.position().x, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_apply_transform_bakes_world_into_local() {
        let mut transform = TransformComponent {
            world: Mat4::from_translation(Vec3::new(7.0, -2.0, 3.0)),
            ..TransformComponent::default()
        };

        transform.apply_transform();

        assert_relative_eq!(transform.translation.x, 7.0, epsilon = 1e-5);
        assert_relative_eq!(transform.translation.y, -2.0, epsilon = 1e-5);
        assert_relative_eq!(transform.translation.z, 3.0, epsilon = 1e-5);
        assert!(
            transform.is_dirty(),
            "Baking must schedule a local recompute"
        );
    }

    #[test]
    fn test_mutators_mark_dirty() {
        let mut transform = TransformComponent::default();
        transform.update_transform();
        assert!(!transform.is_dirty());

        transform.translate(Vec3::X);
        assert!(transform.is_dirty());
        transform.update_transform();

        transform.rotate(Quat::from_rotation_y(0.5));
        assert!(transform.is_dirty());
        transform.update_transform();

        transform.scale_by(Vec3::splat(2.0));
        assert!(transform.is_dirty());
    }
}
