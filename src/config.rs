// Copyright 2023-2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Configuration variables.

#[cfg(feature = "serde")]
use serde::Deserialize;
#[cfg(feature = "serde")]
use serde::Serialize;

use super::constant::bitstream::HD_BLOCK_SIZE;
use super::constant::bitstream::STANDARD_BLOCK_SIZE;
use super::constant::NB_SUBBANDS;
use super::tables::Tables;
use super::tables::ALL_TABLES;

/// Codec profile selector.
///
/// The two profiles share the filter bank and the prediction logic and
/// differ in quantizer resolution and codeword size. A profile is fixed at
/// construction time; encoder and decoder instances of different profiles
/// are not interoperable.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum Profile {
    /// Standard aptX, 4 bytes per coded block.
    #[default]
    Standard,
    /// aptX HD, 6 bytes per coded block.
    ///
    /// The HD quantizer tables are regenerated from the companding curves;
    /// streams round-trip exactly through this crate but are not guaranteed
    /// bit-interoperable with other aptX HD implementations.
    Hd,
}

impl Profile {
    /// Returns the number of bytes of one coded block.
    pub const fn block_size(self) -> usize {
        match self {
            Self::Standard => STANDARD_BLOCK_SIZE,
            Self::Hd => HD_BLOCK_SIZE,
        }
    }

    pub(crate) fn tables(self) -> &'static [Tables; NB_SUBBANDS] {
        match self {
            Self::Standard => &ALL_TABLES[0],
            Self::Hd => &ALL_TABLES[1],
        }
    }
}
