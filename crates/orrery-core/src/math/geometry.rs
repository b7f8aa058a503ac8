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

//! Provides geometric primitive shapes for spatial calculations.
//!
//! This module contains the volumes the scene pipeline derives every frame:
//! axis-aligned bounding boxes for per-entity and scene-wide bounds, and the
//! infinite plane used for the planar-reflection output.

use glam::{Mat3, Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Represents an Axis-Aligned Bounding Box (AABB).
///
/// An AABB is a rectangular prism aligned with the coordinate axes, defined by
/// its minimum and maximum corner points. It is a simple but highly efficient
/// volume for broad-phase spatial queries and visibility culling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct Aabb {
    /// The corner of the box with the smallest coordinates on all axes.
    pub min: Vec3,
    /// The corner of the box with the largest coordinates on all axes.
    pub max: Vec3,
}

impl Aabb {
    /// An invalid `Aabb` where `min` components are positive infinity and `max` are negative infinity.
    ///
    /// This is the neutral starting point for merging operations: merging any
    /// valid `Aabb` with `INVALID` yields that valid `Aabb` unchanged.
    pub const INVALID: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Creates a new `Aabb` from two corner points.
    ///
    /// The `min` field receives the component-wise minimum and `max` the
    /// component-wise maximum, regardless of the order the points are passed
    /// in.
    #[inline]
    pub fn from_min_max(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Creates a new `Aabb` from a center point and its half-extents.
    ///
    /// The half-extents represent the distance from the center to the faces of
    /// the box and are made non-negative.
    #[inline]
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        let half_extents = half_extents.abs();
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Calculates the center point of the `Aabb`.
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Calculates the half-extents (half the size on each axis) of the `Aabb`.
    #[inline]
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Calculates the full size (width, height, depth) of the `Aabb`.
    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Checks if the `Aabb` is valid (i.e., `min <= max` on all axes).
    /// Degenerate boxes where `min == max` are considered valid.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    /// Checks if a point is contained within or on the boundary of the `Aabb`.
    #[inline]
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Creates a new `Aabb` that encompasses both this `Aabb` and another one.
    #[inline]
    pub fn merge(&self, other: &Aabb) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Creates a new `Aabb` that encompasses both this `Aabb` and an additional point.
    #[inline]
    pub fn merged_with_point(&self, point: Vec3) -> Self {
        Self {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    /// Computes the bounding box that encloses this `Aabb` after a transformation.
    ///
    /// Rather than transforming all 8 corners, the center is pushed through the
    /// matrix and the new extents are obtained by projecting the original
    /// extents onto the absolute values of the linear part. This is exact for
    /// affine transformations (rotation, translation, scale) and does not
    /// handle perspective.
    pub fn transform(&self, matrix: &Mat4) -> Self {
        if !self.is_valid() {
            return *self;
        }

        let center = matrix.transform_point3(self.center());
        let half_extents = self.half_extents();

        let linear = Mat3::from_mat4(*matrix);
        let half_extents = linear.x_axis.abs() * half_extents.x
            + linear.y_axis.abs() * half_extents.y
            + linear.z_axis.abs() * half_extents.z;

        Aabb::from_center_half_extents(center, half_extents)
    }
}

impl Default for Aabb {
    /// Returns the default `Aabb`, which is [`Aabb::INVALID`].
    #[inline]
    fn default() -> Self {
        Self::INVALID
    }
}

/// An infinite plane in normal-distance form: `dot(normal, p) + d == 0`.
///
/// Used for the scene's planar-reflection output. The constant follows the
/// convention where `d` is the negated distance of the plane from the origin
/// along its normal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// The unit normal of the plane.
    pub normal: Vec3,
    /// The plane constant; `dot(normal, p) + d == 0` for points on the plane.
    pub d: f32,
}

impl Plane {
    /// Constructs the plane passing through `point` with the given `normal`.
    ///
    /// The normal is normalized; a zero-length normal falls back to `Y` up.
    #[inline]
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        let normal = normal.try_normalize().unwrap_or(Vec3::Y);
        Self {
            normal,
            d: -normal.dot(point),
        }
    }

    /// Signed distance of `point` from the plane, positive on the normal side.
    #[inline]
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.d
    }
}

impl Default for Plane {
    /// Returns the ground plane (`Y` up, through the origin).
    #[inline]
    fn default() -> Self {
        Self {
            normal: Vec3::Y,
            d: 0.0,
        }
    }
}
