// Copyright 2023 Google LLC
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

//! Constants related to the codec geometry.

/// The number of audio channels. Both profiles are stereo only.
pub const NB_CHANNELS: usize = 2;

/// The number of frequency subbands per channel.
pub const NB_SUBBANDS: usize = 4;

/// The number of time-domain samples per channel consumed (produced) by one
/// coded block.
pub const BLOCK_SAMPLES: usize = 4;

/// Constants related to the QMF filter bank.
pub mod qmf {
    /// The number of taps of each polyphase prototype filter.
    pub const FILTER_TAPS: usize = 16;

    /// The number of polyphase branches of each filter pair.
    pub const NB_FILTERS: usize = 2;
}

/// Constants related to the coded bitstream.
pub mod bitstream {
    /// Bytes per coded block in the standard profile (16 bits per channel).
    pub const STANDARD_BLOCK_SIZE: usize = 4;

    /// Bytes per coded block in the HD profile (24 bits per channel).
    pub const HD_BLOCK_SIZE: usize = 6;

    /// Period, in blocks, of the forced-one parity used for stream
    /// synchronization.
    pub const SYNC_PERIOD: usize = 8;
}
