// Copyright 2022 Google LLC
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

#![doc = include_str!("../README.md")]
#![warn(clippy::all, clippy::nursery, clippy::pedantic, clippy::cargo)]
// Some of clippy::pedantic rules are actually useful, so use it with a lot of
// ad-hoc exceptions.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::missing_const_for_fn,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::wildcard_dependencies
)]
// Some from restriction lint-group
#![warn(
    clippy::clone_on_ref_ptr,
    clippy::create_dir,
    clippy::dbg_macro,
    clippy::empty_structs_with_brackets,
    clippy::exit,
    clippy::if_then_some_else_none,
    clippy::impl_trait_in_params,
    clippy::let_underscore_must_use,
    clippy::lossy_float_literal,
    clippy::multiple_inherent_impl,
    clippy::print_stdout,
    clippy::rc_buffer,
    clippy::rc_mutex,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::separated_literal_suffix,
    clippy::str_to_string,
    clippy::string_add,
    clippy::string_to_string,
    clippy::try_err,
    clippy::unnecessary_self_imports,
    clippy::wildcard_enum_match_arm
)]

pub(crate) mod arith;
pub(crate) mod channel;
pub mod coding;
pub mod config;
pub mod constant;
pub mod error;
pub(crate) mod prediction;
pub(crate) mod qmf;
pub(crate) mod quantize;
pub(crate) mod tables;

#[cfg(any(test, feature = "__export_sigen"))]
pub mod sigen;

#[cfg(test)]
pub mod test_helper;

// import global entry points
pub use coding::Decoder;

pub use coding::Encoder;

pub use config::Profile;

#[cfg(test)]
mod test {
    // end-to-end, but transparent test.
    use super::*;
    use rstest::rstest;

    use super::error::DecodeError;

    #[rstest]
    fn silence_round_trip(#[values(Profile::Standard, Profile::Hd)] profile: Profile) {
        let signal = [vec![0i32; 1024], vec![0i32; 1024]];
        let decoded = test_helper::round_trip(profile, &signal);
        // Silence is not reproduced exactly (the forced sync parity injects
        // minimal quantization noise), but it must stay far below audibility.
        for channel in &decoded {
            assert_eq!(channel.len(), 1024);
            for &x in channel {
                assert!(x.abs() < 1 << 16, "decoded silence too loud: {x}");
            }
        }
    }

    #[rstest]
    fn sinusoid_round_trip_snr(#[values(Profile::Standard, Profile::Hd)] profile: Profile) {
        let signal = test_helper::reference_signal();
        let decoded = test_helper::round_trip(profile, signal);
        for ch in 0..2 {
            let snr = test_helper::best_alignment_snr(&signal[ch], &decoded[ch], 1024, 256);
            assert!(snr > 12.0, "SNR too low on channel {ch}: {snr} dB");
        }
    }

    #[rstest]
    fn noise_round_trip_is_bounded(#[values(Profile::Standard, Profile::Hd)] profile: Profile) {
        let signal = test_helper::stereo_noise(4096, 0.5, 7);
        let decoded = test_helper::round_trip(profile, &signal);
        for channel in &decoded {
            for &x in channel {
                // Synthesis output is saturated to 24 bits before scaling.
                assert!(i64::from(x).abs() <= 0x80_0000 * 256);
            }
        }
    }

    #[rstest]
    fn encoding_is_deterministic(#[values(Profile::Standard, Profile::Hd)] profile: Profile) {
        let signal = test_helper::stereo_signal(2048, 36, 0.4, 9);
        let mut first = Vec::new();
        let mut second = Vec::new();
        Encoder::new(profile)
            .encode([&signal[0], &signal[1]], &mut first)
            .expect("encoding failed");
        Encoder::new(profile)
            .encode([&signal[0], &signal[1]], &mut second)
            .expect("encoding failed");
        assert_eq!(first, second);
    }

    #[rstest]
    fn chunked_encoding_matches_whole(#[values(Profile::Standard, Profile::Hd)] profile: Profile) {
        let signal = test_helper::stereo_signal(2048, 36, 0.4, 11);

        let mut whole = Vec::new();
        Encoder::new(profile)
            .encode([&signal[0], &signal[1]], &mut whole)
            .expect("encoding failed");

        let mut chunked = Vec::new();
        let mut encoder = Encoder::new(profile);
        for (left, right) in signal[0].chunks(256).zip(signal[1].chunks(256)) {
            encoder
                .encode([left, right], &mut chunked)
                .expect("encoding failed");
        }
        assert_eq!(whole, chunked);

        let mut whole_decoded = [Vec::new(), Vec::new()];
        let mut chunked_decoded = [Vec::new(), Vec::new()];
        Decoder::new(profile)
            .decode(&whole, &mut whole_decoded)
            .expect("decoding failed");
        let mut decoder = Decoder::new(profile);
        for block in chunked.chunks(profile.block_size() * 8) {
            decoder
                .decode(block, &mut chunked_decoded)
                .expect("decoding failed");
        }
        assert_eq!(whole_decoded, chunked_decoded);
    }

    #[rstest]
    #[case(Profile::Standard, 0x20)]
    #[case(Profile::Hd, 0x08)]
    fn corrupted_sync_bit_is_detected(#[case] profile: Profile, #[case] parity_mask: u8) {
        let signal = test_helper::stereo_signal(512, 40, 0.3, 21);
        let mut packet = Vec::new();
        Encoder::new(profile)
            .encode([&signal[0], &signal[1]], &mut packet)
            .expect("encoding failed");

        // Flip the transmitted parity bit of channel 0 in block 5 (the low
        // bit of the subband-3 field, in the codeword's first byte).
        packet[5 * profile.block_size()] ^= parity_mask;

        let mut decoder = Decoder::new(profile);
        let mut dest = [Vec::new(), Vec::new()];
        match decoder.decode(&packet, &mut dest) {
            Err(DecodeError::Desync(e)) => assert_eq!(e.block(), 5),
            other => panic!("expected desync, got {other:?}"),
        }
        assert!(dest[0].is_empty() && dest[1].is_empty());
    }

    // A channel's recomputed parity always equals the received parity bit:
    // the decoder-side dither parity and the data fields cancel out of the
    // check. The schedule therefore detects stream misalignment, not
    // payload corruption.
    #[rstest]
    #[case(Profile::Standard, 5 * 4 + 1)]
    #[case(Profile::Hd, 5 * 6 + 2)]
    fn data_field_corruption_passes_the_parity_check(
        #[case] profile: Profile,
        #[case] corrupt_at: usize,
    ) {
        let signal = test_helper::stereo_signal(512, 40, 0.3, 21);
        let mut packet = Vec::new();
        Encoder::new(profile)
            .encode([&signal[0], &signal[1]], &mut packet)
            .expect("encoding failed");

        packet[corrupt_at] ^= 1;

        let mut decoder = Decoder::new(profile);
        let mut dest = [Vec::new(), Vec::new()];
        let samples = decoder
            .decode(&packet, &mut dest)
            .expect("a data-field flip must not desync");
        assert_eq!(samples, 512);
    }

    // Golden vector for the very first coded block of silence. Fresh state
    // quantizes a zero difference with a zero quantization factor, which
    // saturates every subband index, so these bytes pin down the table
    // geometry, the binary search, and the codeword layout.
    #[test]
    fn silence_first_block_golden_bytes() {
        let mut encoder = Encoder::new(Profile::Standard);
        let mut packet = Vec::new();
        encoder
            .encode([&[0; 4], &[0; 4]], &mut packet)
            .expect("encoding failed");
        assert_eq!(packet, [0x4B, 0xBF, 0x4B, 0xBF]);

        let mut encoder = Encoder::new(Profile::Hd);
        let mut packet = Vec::new();
        encoder
            .encode([&[0; 4], &[0; 4]], &mut packet)
            .expect("encoding failed");
        assert_eq!(packet, [0x73, 0xBE, 0xFF, 0x73, 0xBE, 0xFF]);
    }

    #[rstest]
    fn decoder_survives_failed_packet(#[values(Profile::Standard, Profile::Hd)] profile: Profile) {
        let signal = test_helper::stereo_signal(1024, 40, 0.3, 33);
        let mut encoder = Encoder::new(profile);
        let mut first = Vec::new();
        let mut second = Vec::new();
        encoder
            .encode([&signal[0][..512], &signal[1][..512]], &mut first)
            .expect("encoding failed");
        encoder
            .encode([&signal[0][512..], &signal[1][512..]], &mut second)
            .expect("encoding failed");

        let parity_mask = match profile {
            Profile::Standard => 0x20,
            Profile::Hd => 0x08,
        };
        // Flip the parity bit of the last block: the packet is dropped, but
        // the decoder's parity schedule stays in phase with the encoder.
        let last_block = first.len() - profile.block_size();
        first[last_block] ^= parity_mask;

        let mut decoder = Decoder::new(profile);
        let mut dest = [Vec::new(), Vec::new()];
        assert!(matches!(
            decoder.decode(&first, &mut dest),
            Err(DecodeError::Desync(_))
        ));
        assert!(dest[0].is_empty());

        // The decoder state survives the failure and keeps decoding.
        let samples = decoder
            .decode(&second, &mut dest)
            .expect("decoding failed after recovery");
        assert_eq!(samples, 512);
        assert_eq!(dest[0].len(), 512);
        assert_eq!(dest[1].len(), 512);
    }

    #[rstest]
    fn saturated_input_is_handled(#[values(Profile::Standard, Profile::Hd)] profile: Profile) {
        // Full-scale square wave, the hardest case for the predictors.
        let len = 1024;
        let mut left = vec![0i32; len];
        let mut right = vec![0i32; len];
        for t in 0..len {
            let x = if (t / 3) % 2 == 0 {
                0x7F_FFFF << 8
            } else {
                -(0x7F_FFFF << 8)
            };
            left[t] = x;
            right[t] = -x;
        }
        let signal = [left, right];
        let decoded = test_helper::round_trip(profile, &signal);
        for channel in &decoded {
            for &x in channel {
                assert!(i64::from(x).abs() <= 0x80_0000 * 256);
            }
        }
    }
}
