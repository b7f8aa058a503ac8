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

//! Binary scene snapshots.
//!
//! A snapshot captures the authored state of a [`Scene`] plus its entity
//! allocator, so a decoded scene keeps issuing ids that never collide
//! with the ones already in use. Derived state (world matrices, skinning
//! palettes, culling bounds) is deliberately not captured; the first
//! [`Scene::update`] after a restore rebuilds all of it.

use thiserror::Error;

use crate::Scene;

/// Failure modes of snapshot encoding and decoding.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The scene could not be serialized.
    #[error("failed to encode scene snapshot: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    /// The byte stream was truncated, corrupted, or written by an
    /// incompatible version.
    #[error("failed to decode scene snapshot: {0}")]
    Decode(#[from] bincode::error::DecodeError),
}

/// Serializes `scene` into a self-contained byte buffer.
pub fn encode(scene: &Scene) -> Result<Vec<u8>, SnapshotError> {
    let bytes = bincode::serde::encode_to_vec(scene, bincode::config::standard())?;
    log::debug!("Encoded scene snapshot ({} bytes).", bytes.len());
    Ok(bytes)
}

/// Reconstructs a scene from a buffer produced by [`encode`].
///
/// Run [`Scene::update`] on the result before reading any derived data
/// from it.
pub fn decode(bytes: &[u8]) -> Result<Scene, SnapshotError> {
    let (scene, _) = bincode::serde::decode_from_slice(bytes, bincode::config::standard())?;
    Ok(scene)
}
