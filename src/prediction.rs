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

//! Inverse quantization and backward-adaptive prediction.
//!
//! Both sides of the codec run this identically from the quantized samples,
//! so the predictor state never has to be transmitted. Each subband keeps a
//! two-tap sign-LMS predictor over reconstructed samples and an order-N
//! sign-sign LMS predictor over reconstructed differences.

use super::arith::clip_intp2;
use super::arith::rshift32;
use super::arith::rshift64_clip24;
use super::tables::Tables;
use super::tables::QUANTIZATION_FACTORS;

/// Largest difference-predictor order over all subbands.
pub(crate) const MAX_PREDICTION_ORDER: usize = 24;

/// Reconstruction state driven by the quantized samples.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct InvertQuantize {
    pub quantization_factor: i32,
    pub factor_select: i32,
    pub reconstructed_difference: i32,
}

/// Adaptive predictor state of one subband.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Prediction {
    prev_sign: [i32; 2],
    s_weight: [i32; 2],
    d_weight: [i32; MAX_PREDICTION_ORDER],
    pos: usize,
    // Sliding window of past differences; the live window of `order`
    // entries ends at index `order + pos`.
    reconstructed_differences: [i32; 2 * MAX_PREDICTION_ORDER],
    pub previous_reconstructed_sample: i32,
    pub predicted_difference: i32,
    pub predicted_sample: i32,
}

impl Prediction {
    pub fn new() -> Self {
        Self {
            prev_sign: [1, 1],
            s_weight: [0, 0],
            d_weight: [0; MAX_PREDICTION_ORDER],
            pos: 0,
            reconstructed_differences: [0; 2 * MAX_PREDICTION_ORDER],
            previous_reconstructed_sample: 0,
            predicted_difference: 0,
            predicted_sample: 0,
        }
    }

    /// Shifts the difference window and returns the index just past the
    /// newest entry.
    fn push_reconstructed_difference(&mut self, difference: i32, order: usize) -> usize {
        let p = self.pos;
        self.reconstructed_differences[p] = self.reconstructed_differences[order + p];
        self.pos = (p + 1) % order;
        self.reconstructed_differences[order + self.pos] = difference;
        order + self.pos + 1
    }

    fn filter(&mut self, reconstructed_difference: i32, order: usize) {
        let reconstructed_sample = clip_intp2(
            reconstructed_difference.wrapping_add(self.predicted_sample),
            23,
        );
        let predictor = clip_intp2(
            ((i64::from(self.s_weight[0]) * i64::from(self.previous_reconstructed_sample)
                + i64::from(self.s_weight[1]) * i64::from(reconstructed_sample))
                >> 22) as i32,
            23,
        );
        self.previous_reconstructed_sample = reconstructed_sample;

        let end = self.push_reconstructed_difference(reconstructed_difference, order);
        let srd0 = (i32::from(reconstructed_difference > 0)
            - i32::from(reconstructed_difference < 0))
            * (1 << 23);
        let mut predicted_difference: i64 = 0;
        for i in 0..order {
            // The sign adapts against the sample one step older than the one
            // entering the weighted sum.
            let older = self.reconstructed_differences[end - 2 - i];
            let srd = (older >> 31) | 1;
            self.d_weight[i] -= rshift32(self.d_weight[i] - srd * srd0, 8);
            predicted_difference +=
                i64::from(self.reconstructed_differences[end - 1 - i]) * i64::from(self.d_weight[i]);
        }

        self.predicted_difference = clip_intp2((predicted_difference >> 22) as i32, 23);
        self.predicted_sample = clip_intp2(
            predictor.wrapping_add(self.predicted_difference),
            23,
        );
    }
}

fn invert_quantization(
    invert_quantize: &mut InvertQuantize,
    quantized_sample: i32,
    dither: i32,
    tables: &Tables,
) {
    let idx = ((quantized_sample ^ -i32::from(quantized_sample < 0)) + 1) as usize;
    let mut qr = tables.quantize_intervals[idx] / 2;
    if quantized_sample < 0 {
        qr = -qr;
    }

    let qr = rshift64_clip24(
        (i64::from(qr) << 32)
            + i64::from(dither) * i64::from(tables.invert_quantize_dither_factors[idx]),
        32,
    );
    invert_quantize.reconstructed_difference =
        ((i64::from(invert_quantize.quantization_factor) * i64::from(qr)) >> 19) as i32;

    let factor_select = 32620 * invert_quantize.factor_select;
    let factor_select = rshift32(
        factor_select + (tables.quantize_factor_select_offset[idx] << 15),
        15,
    );
    invert_quantize.factor_select = factor_select.clamp(0, tables.factor_max);

    let idx = ((invert_quantize.factor_select & 0xFF) >> 3) as usize;
    let shift = (tables.factor_max - invert_quantize.factor_select) >> 8;
    invert_quantize.quantization_factor = (QUANTIZATION_FACTORS[idx] << 11) >> shift;
}

/// Runs inverse quantization, predictor weight adaptation, and prediction
/// filtering for one subband.
pub(crate) fn process_subband(
    invert_quantize: &mut InvertQuantize,
    prediction: &mut Prediction,
    quantized_sample: i32,
    dither: i32,
    tables: &Tables,
) {
    invert_quantization(invert_quantize, quantized_sample, dither, tables);

    let sign = i32::from(
        invert_quantize.reconstructed_difference > -prediction.predicted_difference,
    ) - i32::from(invert_quantize.reconstructed_difference < -prediction.predicted_difference);
    let same_sign = [sign * prediction.prev_sign[0], sign * prediction.prev_sign[1]];
    prediction.prev_sign[0] = prediction.prev_sign[1];
    prediction.prev_sign[1] = sign | 1;

    let range = 0x10_0000;
    let sw1 = rshift32(-same_sign[1] * prediction.s_weight[1], 1);
    let sw1 = (sw1.clamp(-range, range) & !0xF) * 16;

    let range = 0x30_0000;
    let weight0 = 254 * prediction.s_weight[0] + 0x80_0000 * same_sign[0] + sw1;
    prediction.s_weight[0] = rshift32(weight0, 8).clamp(-range, range);

    let range = 0x3C_0000 - prediction.s_weight[0];
    let weight1 = 255 * prediction.s_weight[1] + 0xC0_0000 * same_sign[1];
    prediction.s_weight[1] = rshift32(weight1, 8).clamp(-range, range);

    prediction.filter(
        invert_quantize.reconstructed_difference,
        tables.prediction_order,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::ALL_TABLES;

    #[test]
    fn initial_factor_adaptation() {
        let tables = &ALL_TABLES[0][0];
        let mut iq = InvertQuantize::default();
        invert_quantization(&mut iq, 0, 0, tables);
        // offset[-21] decays to zero through the clamp, and factor_select 0
        // maps to the smallest quantization factor.
        assert_eq!(iq.factor_select, 0);
        assert_eq!(iq.quantization_factor, 32);
        assert_eq!(iq.reconstructed_difference, 0);
    }

    #[test]
    fn factor_select_saturates_at_table_maximum() {
        let tables = &ALL_TABLES[0][0];
        let mut iq = InvertQuantize::default();
        let max_sample = (tables.quantize_intervals.len() - 2) as i32;
        for _ in 0..1000 {
            invert_quantization(&mut iq, max_sample, 0, tables);
        }
        assert_eq!(iq.factor_select, tables.factor_max);
        assert_eq!(
            iq.quantization_factor,
            QUANTIZATION_FACTORS[((tables.factor_max & 0xFF) >> 3) as usize] << 11
        );
    }

    #[test]
    fn silence_leaves_prediction_at_rest() {
        let tables = &ALL_TABLES[0][0];
        let mut iq = InvertQuantize::default();
        let mut prediction = Prediction::new();
        for _ in 0..100 {
            process_subband(&mut iq, &mut prediction, 0, 0, tables);
            assert_eq!(prediction.predicted_sample, 0);
            assert_eq!(prediction.predicted_difference, 0);
            assert_eq!(prediction.s_weight, [0, 0]);
        }
    }

    #[test]
    fn difference_window_wraps_without_losing_history() {
        let mut prediction = Prediction::new();
        let order = 6;
        for t in 1..=20 {
            prediction.push_reconstructed_difference(t, order);
        }
        // The window read back newest-to-oldest must be 20, 19, ... 15.
        let end = order + prediction.pos + 1;
        for i in 0..order {
            assert_eq!(
                prediction.reconstructed_differences[end - 1 - i],
                20 - i as i32
            );
        }
    }

    #[test]
    fn predictor_states_stay_in_range() {
        for profile_tables in &ALL_TABLES {
            for tables in profile_tables {
                let mut iq = InvertQuantize::default();
                let mut prediction = Prediction::new();
                let max_sample = (tables.quantize_intervals.len() - 2) as i32;
                let pattern = [max_sample, -max_sample, 1, -1, 0, max_sample / 2];
                for step in 0..600 {
                    let q = pattern[step % pattern.len()];
                    let dither = if step % 2 == 0 { 0x55_5555 } else { -0x2A_AAAA };
                    process_subband(&mut iq, &mut prediction, q, dither, tables);
                    assert!(prediction.predicted_sample.abs() <= 1 << 23);
                    assert!(prediction.predicted_difference.abs() <= 1 << 23);
                    assert!(iq.factor_select >= 0 && iq.factor_select <= tables.factor_max);
                }
            }
        }
    }
}
