// Copyright 2022-2024 Google LLC
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

//! Encoder and decoder entry points.
//!
//! Synchronization works without any framing overhead: the parity of all
//! quantized samples of a block must be 0, except every 8th block where it
//! must be 1. The encoder enforces the schedule by flipping the quantized
//! sample with the cheapest parity alternative; the decoder verifies it and
//! rejects packets that break it.

use super::channel::Channel;
use super::config::Profile;
use super::constant::bitstream::HD_BLOCK_SIZE;
use super::constant::bitstream::SYNC_PERIOD;
use super::constant::BLOCK_SAMPLES;
use super::constant::NB_CHANNELS;
use super::error::DecodeError;
use super::error::EncodeError;
use super::error::RangeError;
use super::error::SyncError;

/// Returns true if the combined parity of the block contradicts the
/// synchronization schedule. Advances the schedule on every call, so both
/// sides must call this exactly once per block.
fn check_parity(channels: &[Channel; NB_CHANNELS], sync_idx: &mut i32) -> bool {
    const LAST: i32 = SYNC_PERIOD as i32 - 1;
    let parity = channels[0].quantized_parity() ^ channels[1].quantized_parity();
    let forced = i32::from(*sync_idx == LAST);
    *sync_idx = (*sync_idx + 1) & LAST;
    parity != forced
}

/// Forces the scheduled parity by flipping the quantized sample whose
/// parity alternative costs the least extra distortion.
fn insert_sync(channels: &mut [Channel; NB_CHANNELS], sync_idx: &mut i32) {
    if check_parity(channels, sync_idx) {
        // Subbands ordered by how audible the flip tends to be.
        const MAP: [usize; 4] = [1, 2, 0, 3];
        let mut min = (NB_CHANNELS - 1, MAP[0]);
        for ch in (0..NB_CHANNELS).rev() {
            for &subband in &MAP {
                if channels[ch].quantize[subband].error < channels[min.0].quantize[min.1].error {
                    min = (ch, subband);
                }
            }
        }
        let target = &mut channels[min.0].quantize[min.1];
        target.quantized_sample = target.quantized_sample_parity_change;
    }
}

/// Streaming aptX / aptX HD encoder.
///
/// Input samples are `i32`s with 24 significant bits in the upper bytes;
/// the bottom 8 bits are ignored. One instance carries the filter and
/// predictor state of one stereo stream.
#[derive(Clone, Debug)]
pub struct Encoder {
    channels: [Channel; NB_CHANNELS],
    profile: Profile,
    sync_idx: i32,
}

impl Encoder {
    pub fn new(profile: Profile) -> Self {
        Self {
            channels: [Channel::new(), Channel::new()],
            profile,
            sync_idx: 0,
        }
    }

    /// Returns the number of bytes one coded block occupies.
    pub const fn block_size(&self) -> usize {
        self.profile.block_size()
    }

    /// Encodes 4 samples per channel into one coded block.
    ///
    /// # Panics
    ///
    /// Panics if `dest` is shorter than [`Self::block_size`].
    pub fn encode_block(
        &mut self,
        samples: &[[i32; BLOCK_SAMPLES]; NB_CHANNELS],
        dest: &mut [u8],
    ) {
        assert!(dest.len() >= self.block_size());
        let tables = self.profile.tables();

        for (channel, block) in self.channels.iter_mut().zip(samples) {
            let mut shifted = [0i32; BLOCK_SAMPLES];
            for (p, &sample) in shifted.iter_mut().zip(block) {
                *p = sample >> 8;
            }
            channel.encode(&shifted, tables);
        }

        insert_sync(&mut self.channels, &mut self.sync_idx);

        for (ch, channel) in self.channels.iter_mut().enumerate() {
            channel.invert_quantize_and_prediction(tables);
            match self.profile {
                Profile::Standard => {
                    let codeword = channel.pack_codeword();
                    dest[2 * ch..2 * ch + 2].copy_from_slice(&codeword.to_be_bytes());
                }
                Profile::Hd => {
                    let codeword = channel.pack_codeword_hd();
                    dest[3 * ch..3 * ch + 3].copy_from_slice(&codeword.to_be_bytes()[1..]);
                }
            }
        }
    }

    /// Encodes whole channels and appends the coded blocks to `dest`.
    ///
    /// Returns the number of bytes appended.
    ///
    /// # Errors
    ///
    /// Returns an error when the channels differ in length or the length is
    /// not a multiple of 4.
    pub fn encode(
        &mut self,
        channels: [&[i32]; NB_CHANNELS],
        dest: &mut Vec<u8>,
    ) -> Result<usize, EncodeError> {
        if channels[0].len() != channels[1].len() {
            return Err(RangeError::from_display(
                "channels",
                "must have equal lengths",
                &format!("{} != {}", channels[0].len(), channels[1].len()),
            )
            .into());
        }
        if channels[0].len() % BLOCK_SAMPLES != 0 {
            return Err(RangeError::from_display(
                "channels",
                "length must be a multiple of 4",
                &channels[0].len(),
            )
            .into());
        }

        let block_size = self.block_size();
        let start = dest.len();
        for block in 0..channels[0].len() / BLOCK_SAMPLES {
            let mut samples = [[0i32; BLOCK_SAMPLES]; NB_CHANNELS];
            for ch in 0..NB_CHANNELS {
                samples[ch]
                    .copy_from_slice(&channels[ch][block * BLOCK_SAMPLES..][..BLOCK_SAMPLES]);
            }
            let mut buf = [0u8; HD_BLOCK_SIZE];
            self.encode_block(&samples, &mut buf[..block_size]);
            dest.extend_from_slice(&buf[..block_size]);
        }
        Ok(dest.len() - start)
    }
}

/// Streaming aptX / aptX HD decoder.
///
/// Produces `i32` samples with 24 significant bits in the upper bytes,
/// mirroring the encoder input convention.
#[derive(Clone, Debug)]
pub struct Decoder {
    channels: [Channel; NB_CHANNELS],
    profile: Profile,
    sync_idx: i32,
}

impl Decoder {
    pub fn new(profile: Profile) -> Self {
        Self {
            channels: [Channel::new(), Channel::new()],
            profile,
            sync_idx: 0,
        }
    }

    /// Returns the number of bytes one coded block occupies.
    pub const fn block_size(&self) -> usize {
        self.profile.block_size()
    }

    /// Decodes one coded block into 4 samples per channel.
    ///
    /// The returned flag is false when the block parity contradicts the
    /// synchronization schedule. The decoded samples are still returned and
    /// the state is still advanced in that case; the caller decides whether
    /// to use them.
    ///
    /// # Panics
    ///
    /// Panics if `src` is shorter than [`Self::block_size`].
    pub fn decode_block(&mut self, src: &[u8]) -> ([[i32; BLOCK_SAMPLES]; NB_CHANNELS], bool) {
        assert!(src.len() >= self.block_size());
        let tables = self.profile.tables();

        for (ch, channel) in self.channels.iter_mut().enumerate() {
            channel.generate_dither();
            match self.profile {
                Profile::Standard => {
                    let codeword = u16::from_be_bytes([src[2 * ch], src[2 * ch + 1]]);
                    channel.unpack_codeword(codeword);
                }
                Profile::Hd => {
                    let codeword = u32::from_be_bytes([
                        0,
                        src[3 * ch],
                        src[3 * ch + 1],
                        src[3 * ch + 2],
                    ]);
                    channel.unpack_codeword_hd(codeword);
                }
            }
            channel.invert_quantize_and_prediction(tables);
        }

        let synced = !check_parity(&self.channels, &mut self.sync_idx);

        let mut samples = [[0i32; BLOCK_SAMPLES]; NB_CHANNELS];
        for (block, channel) in samples.iter_mut().zip(self.channels.iter_mut()) {
            let decoded = channel.decode_to_samples();
            for (p, &sample) in block.iter_mut().zip(&decoded) {
                *p = sample * 256;
            }
        }
        (samples, synced)
    }

    /// Decodes a packet of coded blocks and appends the samples to `dest`.
    ///
    /// Returns the number of samples appended per channel. Trailing bytes
    /// that do not form a complete block are ignored.
    ///
    /// On a parity failure the whole packet is dropped: nothing is appended
    /// to `dest` and an error naming the offending block is returned. The
    /// decoder state is deliberately kept, since the predictors converge
    /// again once the caller resumes with valid input.
    ///
    /// # Errors
    ///
    /// Returns an error when the packet is shorter than one coded block, or
    /// when a block fails the parity check.
    pub fn decode(
        &mut self,
        packet: &[u8],
        dest: &mut [Vec<i32>; NB_CHANNELS],
    ) -> Result<usize, DecodeError> {
        let block_size = self.block_size();
        if packet.len() < block_size {
            return Err(RangeError::from_display(
                "packet",
                "must contain at least one coded block",
                &packet.len(),
            )
            .into());
        }

        let start = [dest[0].len(), dest[1].len()];
        for block in 0..packet.len() / block_size {
            let (samples, synced) = self.decode_block(&packet[block * block_size..][..block_size]);
            if !synced {
                for (d, &len) in dest.iter_mut().zip(&start) {
                    d.truncate(len);
                }
                #[cfg(feature = "log")]
                log::warn!("parity mismatch at block {block}; dropping packet");
                return Err(SyncError::at_block(block).into());
            }
            for (d, block_samples) in dest.iter_mut().zip(&samples) {
                d.extend_from_slice(block_samples);
            }
        }
        Ok(dest[0].len() - start[0])
    }
}
