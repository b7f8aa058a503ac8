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

/// A visibility/filter bitmask for an entity.
///
/// Attached entities have their effective mask ANDed with their parent's
/// during hierarchy propagation; the mask the entity had at attach time is
/// kept on the hierarchy link and restored on detach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerComponent {
    /// The raw bitmask; all bits set means "member of every layer".
    pub layer_mask: u32,
}

impl Default for LayerComponent {
    fn default() -> Self {
        Self {
            layer_mask: u32::MAX,
        }
    }
}
