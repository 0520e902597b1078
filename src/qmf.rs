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

//! Two-stage polyphase quadrature-mirror filter bank.
//!
//! An outer filter pair splits the 4-sample input block into a low and a
//! high band (2 samples each), and two inner pairs split those again,
//! yielding one sample per block in each of the 4 subbands (ordered LL, LH,
//! HL, HH). Synthesis runs the mirrored joins. Both directions use the same
//! 16-tap prototype filters and only differ in the normalization shifts.

use seq_macro::seq;

use super::arith::clip_intp2;
use super::arith::rshift64_clip24;
use super::constant::qmf::FILTER_TAPS;
use super::constant::qmf::NB_FILTERS;
use super::constant::BLOCK_SAMPLES;

const OUTER_COEFFS: [[i32; FILTER_TAPS]; NB_FILTERS] = [
    [
        730, -413, -9611, 43626, -121026, 269973, -585547, 2801966,
        697128, -160481, 27611, 8478, -10043, 3511, 688, -897,
    ],
    [
        -897, 688, 3511, -10043, 8478, 27611, -160481, 697128,
        2801966, -585547, 269973, -121026, 43626, -9611, -413, 730,
    ],
];

const INNER_COEFFS: [[i32; FILTER_TAPS]; NB_FILTERS] = [
    [
        1033, -584, -13592, 61697, -171156, 381799, -828088, 3962579,
        985888, -226954, 39048, 11990, -14203, 4966, 973, -1268,
    ],
    [
        -1268, 973, 4966, -14203, 11990, 39048, -226954, 985888,
        3962579, -828088, 381799, -171156, 61697, -13592, -584, 1033,
    ],
];

/// Delay line of one polyphase branch.
///
/// Every sample is written twice, `FILTER_TAPS` slots apart, so the most
/// recent `FILTER_TAPS` samples always form a contiguous window starting at
/// `pos` regardless of wrap-around.
#[derive(Clone, Debug)]
pub(crate) struct FilterSignal {
    buffer: [i32; 2 * FILTER_TAPS],
    pos: usize,
}

impl FilterSignal {
    pub fn new() -> Self {
        Self {
            buffer: [0; 2 * FILTER_TAPS],
            pos: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, sample: i32) {
        self.buffer[self.pos] = sample;
        self.buffer[self.pos + FILTER_TAPS] = sample;
        self.pos = (self.pos + 1) & (FILTER_TAPS - 1);
    }

    #[inline]
    pub fn convolve(&self, coeffs: &[i32; FILTER_TAPS], shift: u32) -> i32 {
        let window = &self.buffer[self.pos..self.pos + FILTER_TAPS];
        let mut e: i64 = 0;
        seq!(I in 0..16 {
            e += i64::from(window[I]) * i64::from(coeffs[I]);
        });
        rshift64_clip24(e, shift)
    }
}

fn polyphase_analysis(
    signal: &mut [FilterSignal; NB_FILTERS],
    coeffs: &[[i32; FILTER_TAPS]; NB_FILTERS],
    shift: u32,
    samples: &[i32; NB_FILTERS],
) -> (i32, i32) {
    let mut subbands = [0i32; NB_FILTERS];
    for i in 0..NB_FILTERS {
        signal[i].push(samples[NB_FILTERS - 1 - i]);
    }
    for i in 0..NB_FILTERS {
        subbands[i] = signal[i].convolve(&coeffs[i], shift);
    }
    (
        clip_intp2(subbands[0] + subbands[1], 23),
        clip_intp2(subbands[0] - subbands[1], 23),
    )
}

fn polyphase_synthesis(
    signal: &mut [FilterSignal; NB_FILTERS],
    coeffs: &[[i32; FILTER_TAPS]; NB_FILTERS],
    shift: u32,
    low: i32,
    high: i32,
    samples: &mut [i32],
) {
    let subbands = [low + high, low - high];
    for i in 0..NB_FILTERS {
        signal[i].push(subbands[1 - i]);
    }
    for i in 0..NB_FILTERS {
        samples[i] = signal[i].convolve(&coeffs[i], shift);
    }
}

/// Per-channel QMF state, one outer branch pair and two inner pairs.
#[derive(Clone, Debug)]
pub(crate) struct QmfBank {
    outer_filter_signal: [FilterSignal; NB_FILTERS],
    inner_filter_signal: [[FilterSignal; NB_FILTERS]; 2],
}

impl QmfBank {
    pub fn new() -> Self {
        Self {
            outer_filter_signal: [FilterSignal::new(), FilterSignal::new()],
            inner_filter_signal: [
                [FilterSignal::new(), FilterSignal::new()],
                [FilterSignal::new(), FilterSignal::new()],
            ],
        }
    }

    /// Splits 4 time-domain samples into one sample per subband.
    pub fn analyze(&mut self, samples: &[i32; BLOCK_SAMPLES]) -> [i32; BLOCK_SAMPLES] {
        let mut intermediate = [0i32; BLOCK_SAMPLES];
        let mut subbands = [0i32; BLOCK_SAMPLES];

        for i in 0..2 {
            let pair = [samples[2 * i], samples[2 * i + 1]];
            let (low, high) =
                polyphase_analysis(&mut self.outer_filter_signal, &OUTER_COEFFS, 23, &pair);
            intermediate[i] = low;
            intermediate[2 + i] = high;
        }

        for i in 0..2 {
            let pair = [intermediate[2 * i], intermediate[2 * i + 1]];
            let (low, high) =
                polyphase_analysis(&mut self.inner_filter_signal[i], &INNER_COEFFS, 23, &pair);
            subbands[2 * i] = low;
            subbands[2 * i + 1] = high;
        }
        subbands
    }

    /// Joins one sample per subband back into 4 time-domain samples.
    pub fn synthesize(&mut self, subbands: &[i32; BLOCK_SAMPLES]) -> [i32; BLOCK_SAMPLES] {
        let mut intermediate = [0i32; BLOCK_SAMPLES];
        let mut samples = [0i32; BLOCK_SAMPLES];

        for i in 0..2 {
            polyphase_synthesis(
                &mut self.inner_filter_signal[i],
                &INNER_COEFFS,
                22,
                subbands[2 * i],
                subbands[2 * i + 1],
                &mut intermediate[2 * i..2 * i + 2],
            );
        }

        for i in 0..2 {
            let low = intermediate[i];
            let high = intermediate[2 + i];
            polyphase_synthesis(
                &mut self.outer_filter_signal,
                &OUTER_COEFFS,
                21,
                low,
                high,
                &mut samples[2 * i..2 * i + 2],
            );
        }
        samples
    }
}
