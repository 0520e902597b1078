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

#![allow(clippy::missing_panics_doc)]

use once_cell::sync::Lazy;

use super::coding::Decoder;
use super::coding::Encoder;
use super::config::Profile;
use super::sigen::Noise;
use super::sigen::Signal;
use super::sigen::Sine;

#[macro_export]
macro_rules! assert_close {
    ($actual:expr, $expected:expr, rtol = $rtol:expr, atol = $atol:expr) => {{
        let err = ($actual - $expected).abs();
        #[allow(clippy::suboptimal_flops)]
        let tol = $rtol * ($expected).abs() + $atol;
        assert!(err < tol);
    }};
    ($actual:expr, $expected:expr) => {{
        assert_close!($actual, $expected, rtol = 0.00001, atol = 0.00001);
    }};
}

static REFERENCE_SIGNAL: Lazy<[Vec<i32>; 2]> = Lazy::new(|| stereo_signal(8192, 50, 0.25, 42));

/// A shared stereo test signal, long enough for the predictors to converge.
pub fn reference_signal() -> &'static [Vec<i32>; 2] {
    &REFERENCE_SIGNAL
}

/// Makes a deterministic stereo test signal in the codec sample convention.
///
/// Each channel is a sine of the given `period` with a small amount of
/// seeded noise, phase-shifted between the channels so stereo handling
/// bugs cannot cancel out.
pub fn stereo_signal(len: usize, period: usize, amplitude: f32, seed: u64) -> [Vec<i32>; 2] {
    let left = Sine::new(period, amplitude)
        .noise_with_seed(seed, 0.01)
        .clip()
        .to_vec_s32(len);
    let right = Sine::with_initial_phase(period, amplitude, 1.0)
        .noise_with_seed(seed.wrapping_add(1), 0.01)
        .clip()
        .to_vec_s32(len);
    [left, right]
}

/// Makes a deterministic stereo white-noise signal.
pub fn stereo_noise(len: usize, amplitude: f32, seed: u64) -> [Vec<i32>; 2] {
    [
        Noise::with_seed(seed, amplitude).clip().to_vec_s32(len),
        Noise::with_seed(seed.wrapping_add(1), amplitude)
            .clip()
            .to_vec_s32(len),
    ]
}

/// Encodes and decodes `signal` with fresh codec instances.
pub fn round_trip(profile: Profile, signal: &[Vec<i32>; 2]) -> [Vec<i32>; 2] {
    let mut encoder = Encoder::new(profile);
    let mut packet = Vec::new();
    encoder
        .encode([&signal[0], &signal[1]], &mut packet)
        .expect("encoding failed");
    assert_eq!(
        packet.len(),
        signal[0].len() / 4 * profile.block_size(),
        "constant-bitrate output size mismatch"
    );

    let mut decoder = Decoder::new(profile);
    let mut decoded = [Vec::new(), Vec::new()];
    let samples = decoder
        .decode(&packet, &mut decoded)
        .expect("decoding failed");
    assert_eq!(samples, signal[0].len());
    decoded
}

/// Signal-to-noise ratio in dB of `decoded` against `reference`, searching
/// over decoder delays up to `max_delay` and skipping `skip` samples of
/// predictor convergence.
pub fn best_alignment_snr(
    reference: &[i32],
    decoded: &[i32],
    skip: usize,
    max_delay: usize,
) -> f64 {
    assert_eq!(reference.len(), decoded.len());
    assert!(skip + max_delay < reference.len());

    let mut best = f64::NEG_INFINITY;
    for delay in 0..=max_delay {
        let len = reference.len() - skip - delay;
        let mut signal_power = 0.0f64;
        let mut error_power = 0.0f64;
        for t in 0..len {
            let r = f64::from(reference[skip + t]);
            let d = f64::from(decoded[skip + delay + t]);
            signal_power += r * r;
            error_power += (r - d) * (r - d);
        }
        if error_power == 0.0 {
            return f64::INFINITY;
        }
        let snr = 10.0 * (signal_power / error_power).log10();
        if snr > best {
            best = snr;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snr_of_identical_signals_is_infinite() {
        let [left, _] = stereo_signal(512, 31, 0.4, 3);
        assert_eq!(best_alignment_snr(&left, &left, 64, 16), f64::INFINITY);
    }

    #[test]
    fn snr_finds_the_alignment() {
        let [left, _] = stereo_signal(2048, 31, 0.4, 3);
        let mut delayed = vec![0i32; 2048];
        delayed[10..].copy_from_slice(&left[..2038]);
        let aligned = best_alignment_snr(&left, &delayed, 64, 32);
        let misaligned = best_alignment_snr(&left, &delayed, 64, 4);
        assert_eq!(aligned, f64::INFINITY);
        assert!(misaligned < 20.0);
    }

    #[test]
    fn assert_close_accepts_close_values() {
        assert_close!(1.000001f64, 1.0f64);
        assert_close!(100.0f64, 100.4f64, rtol = 0.01, atol = 0.0);
    }
}
