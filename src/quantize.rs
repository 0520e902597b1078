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

//! Adaptive quantization of predicted subband differences.

use super::arith::clip_intp2;
use super::arith::rshift32_clip24;
use super::arith::rshift64;
use super::arith::rshift64_clip24;
use super::tables::Tables;

/// Outcome of quantizing one subband difference.
///
/// `quantized_sample_parity_change` is the neighboring quantization index
/// with the opposite parity, and `error` the extra distortion it would
/// cost. The encoder flips the cheapest subband to it when the block parity
/// must be corrected.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Quantize {
    pub quantized_sample: i32,
    pub quantized_sample_parity_change: i32,
    pub error: i64,
}

/// Finds the quantization index of `value`, scaled by `factor`.
///
/// Power-of-two-stride descent over the interval table. Ties resolve toward
/// the larger index.
fn bin_search(value: i32, factor: i32, intervals: &[i32]) -> usize {
    let target = i64::from(value) << 24;
    let mut idx = 0;
    let mut stride = intervals.len() >> 1;
    while stride > 0 {
        if i64::from(factor) * i64::from(intervals[idx + stride]) <= target {
            idx += stride;
        }
        stride >>= 1;
    }
    idx
}

pub(crate) fn quantize_difference(
    sample_difference: i32,
    dither: i32,
    quantization_factor: i32,
    tables: &Tables,
) -> Quantize {
    let intervals = tables.quantize_intervals;
    let sample_difference_abs = sample_difference.abs().min((1 << 23) - 1);

    let quantized_sample = bin_search(sample_difference_abs >> 4, quantization_factor, intervals);

    let d = rshift32_clip24(
        (i64::from(dither) * i64::from(dither) >> 32) as i32,
        7,
    ) - (1 << 23);
    let d = rshift64(
        i64::from(d) * i64::from(tables.quantize_dither_factors[quantized_sample]),
        23,
    ) as i32;

    let mean = (intervals[quantized_sample + 1] + intervals[quantized_sample]) / 2;
    let interval = (intervals[quantized_sample + 1] - intervals[quantized_sample])
        * (-i32::from(sample_difference < 0) | 1);

    let dithered_sample = rshift64_clip24(
        i64::from(dither) * i64::from(interval) + (i64::from(clip_intp2(mean + d, 23)) << 32),
        32,
    );
    let error = (i64::from(sample_difference_abs) << 20)
        - i64::from(dithered_sample) * i64::from(quantization_factor);

    let mut quantized_sample = quantized_sample as i32;
    let mut parity_change = quantized_sample;
    if error < 0 {
        quantized_sample -= 1;
    } else {
        parity_change -= 1;
    }

    let inv = -i32::from(sample_difference < 0);
    Quantize {
        quantized_sample: quantized_sample ^ inv,
        quantized_sample_parity_change: parity_change ^ inv,
        error: rshift64(error, 23).abs(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::ALL_TABLES;

    #[test]
    fn bin_search_descends_with_ties_to_larger_index() {
        let intervals = [0, 10, 20, 30, 40, 50, 60, 70];
        assert_eq!(bin_search(15, 2, &intervals), 7);
        assert_eq!(bin_search(0, 2, &intervals), 0);
        // exact boundary: factor * intervals[3] == value << 24
        let intervals = [0, 1 << 22, 2 << 22, 3 << 22];
        assert_eq!(bin_search(3, 4, &intervals), 3);
    }

    #[test]
    fn zero_difference_quantizes_to_zero() {
        let tables = &ALL_TABLES[0][0];
        let q = quantize_difference(0, 0, 2048, tables);
        assert_eq!(q.quantized_sample, 0);
        assert_eq!(q.quantized_sample_parity_change, -1);
    }

    #[test]
    fn known_quantization_outcome() {
        let tables = &ALL_TABLES[0][0];
        let q = quantize_difference(500, 100, 2048, tables);
        assert_eq!(q.quantized_sample, 12);
        assert_eq!(q.quantized_sample_parity_change, 11);
        assert_eq!(q.error, 2);
    }

    #[test]
    fn negative_difference_mirrors_positive() {
        let tables = &ALL_TABLES[0][0];
        let pos = quantize_difference(500, 0, 2048, tables);
        let neg = quantize_difference(-500, 0, 2048, tables);
        assert_eq!(neg.quantized_sample, !pos.quantized_sample);
        assert_eq!(
            neg.quantized_sample_parity_change,
            !pos.quantized_sample_parity_change
        );
        assert_eq!(neg.error, pos.error);
    }

    #[test]
    fn parity_alternative_has_opposite_parity() {
        for tables in &ALL_TABLES[0] {
            for diff in [-400_000, -1234, 0, 999, 70_000, 4_000_000] {
                let q = quantize_difference(diff, 12_345, 2048, tables);
                assert_eq!(
                    (q.quantized_sample ^ q.quantized_sample_parity_change) & 1,
                    1
                );
            }
        }
    }

    #[test]
    fn extreme_differences_do_not_overflow() {
        for profile_tables in &ALL_TABLES {
            for tables in profile_tables {
                for diff in [i32::MIN + 1, -(1 << 23), (1 << 23) - 1, i32::MAX] {
                    let q = quantize_difference(diff, 0x7F_FFFF, 4008 << 11, tables);
                    let max_index = (tables.quantize_intervals.len() - 1) as i32;
                    assert!(q.quantized_sample.abs() <= max_index);
                }
            }
        }
    }
}
