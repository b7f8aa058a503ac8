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

//! Provides the mathematical primitives used throughout the engine.
//!
//! Linear algebra comes from [`glam`] (column-vector convention: a composed
//! matrix applies its rightmost factor first), re-exported here so downstream
//! crates name one math module. On top of that this module adds the geometric
//! types the scene pipeline derives every frame: [`Aabb`] and [`Plane`].
//!
//! All angular functions operate in **radians**.

// --- Fundamental Constants ---

/// A small constant for floating-point comparisons.
pub const EPSILON: f32 = 1e-5;

// Re-export standard mathematical constants for convenience.
pub use std::f32::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_4, PI, TAU};

// --- Declare Sub-Modules ---

pub mod geometry;

// --- Re-export Principal Types ---

pub use self::geometry::{Aabb, Plane};
pub use glam::{Mat3, Mat4, Quat, Vec2, Vec3, Vec4};

// --- Utility Functions ---

/// Compares two `f32` values for approximate equality using [`EPSILON`].
#[inline]
pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}
