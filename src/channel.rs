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

//! Per-channel codec state and codeword layout.

use super::arith::clip_intp2;
use super::arith::sign_extend;
use super::constant::BLOCK_SAMPLES;
use super::constant::NB_SUBBANDS;
use super::prediction::process_subband;
use super::prediction::InvertQuantize;
use super::prediction::Prediction;
use super::qmf::QmfBank;
use super::quantize::quantize_difference;
use super::quantize::Quantize;
use super::tables::Tables;

/// Complete state of one audio channel.
#[derive(Clone, Debug)]
pub(crate) struct Channel {
    qmf: QmfBank,
    pub quantize: [Quantize; NB_SUBBANDS],
    pub invert_quantize: [InvertQuantize; NB_SUBBANDS],
    pub prediction: [Prediction; NB_SUBBANDS],
    codeword_history: i32,
    dither_parity: i32,
    dither: [i32; NB_SUBBANDS],
}

impl Channel {
    pub fn new() -> Self {
        Self {
            qmf: QmfBank::new(),
            quantize: [Quantize::default(); NB_SUBBANDS],
            invert_quantize: [InvertQuantize::default(); NB_SUBBANDS],
            prediction: [Prediction::new(); NB_SUBBANDS],
            codeword_history: 0,
            dither_parity: 0,
            dither: [0; NB_SUBBANDS],
        }
    }

    fn update_codeword_history(&mut self) {
        let cw = (self.quantize[0].quantized_sample & 3)
            + ((self.quantize[1].quantized_sample & 2) << 1)
            + ((self.quantize[2].quantized_sample & 1) << 3);
        self.codeword_history =
            ((cw as u32) << 8).wrapping_add((self.codeword_history as u32) << 4) as i32;
    }

    /// Rolls the deterministic dither generator forward by one block.
    ///
    /// Seeded from the previously transmitted quantized samples, so encoder
    /// and decoder derive the same dither without side information. Must run
    /// exactly once per channel per block, before quantization.
    pub fn generate_dither(&mut self) {
        self.update_codeword_history();

        let m = 5_184_443i64 * i64::from(self.codeword_history >> 7);
        let d = (m * 4 + (m >> 22)) as i32;
        for subband in 0..NB_SUBBANDS {
            self.dither[subband] = ((d as u32) << (23 - 5 * subband)) as i32;
        }
        self.dither_parity = (d >> 25) & 1;
    }

    /// QMF analysis followed by quantization of the prediction residuals.
    pub fn encode(&mut self, samples: &[i32; BLOCK_SAMPLES], tables: &[Tables; NB_SUBBANDS]) {
        let subband_samples = self.qmf.analyze(samples);
        self.generate_dither();
        for subband in 0..NB_SUBBANDS {
            let diff = clip_intp2(
                subband_samples[subband] - self.prediction[subband].predicted_sample,
                23,
            );
            self.quantize[subband] = quantize_difference(
                diff,
                self.dither[subband],
                self.invert_quantize[subband].quantization_factor,
                &tables[subband],
            );
        }
    }

    /// QMF synthesis from the reconstructed subband samples.
    pub fn decode_to_samples(&mut self) -> [i32; BLOCK_SAMPLES] {
        let mut subband_samples = [0i32; NB_SUBBANDS];
        for subband in 0..NB_SUBBANDS {
            subband_samples[subband] = self.prediction[subband].previous_reconstructed_sample;
        }
        self.qmf.synthesize(&subband_samples)
    }

    pub fn invert_quantize_and_prediction(&mut self, tables: &[Tables; NB_SUBBANDS]) {
        for subband in 0..NB_SUBBANDS {
            process_subband(
                &mut self.invert_quantize[subband],
                &mut self.prediction[subband],
                self.quantize[subband].quantized_sample,
                self.dither[subband],
                &tables[subband],
            );
        }
    }

    /// Low bit of the dither parity XORed with all quantized samples.
    pub fn quantized_parity(&self) -> i32 {
        let mut parity = self.dither_parity;
        for subband in 0..NB_SUBBANDS {
            parity ^= self.quantize[subband].quantized_sample;
        }
        parity & 1
    }

    /// 16-bit codeword, fields of 7/4/2/3 bits; the parity replaces the low
    /// bit of the highest subband.
    pub fn pack_codeword(&self) -> u16 {
        let parity = self.quantized_parity();
        ((((self.quantize[3].quantized_sample & 0x06) | parity) << 13)
            | ((self.quantize[2].quantized_sample & 0x03) << 11)
            | ((self.quantize[1].quantized_sample & 0x0F) << 7)
            | (self.quantize[0].quantized_sample & 0x7F)) as u16
    }

    /// 24-bit HD codeword, fields of 9/6/4/5 bits.
    pub fn pack_codeword_hd(&self) -> u32 {
        let parity = self.quantized_parity();
        ((((self.quantize[3].quantized_sample & 0x1E) | parity) << 19)
            | ((self.quantize[2].quantized_sample & 0x0F) << 15)
            | ((self.quantize[1].quantized_sample & 0x3F) << 9)
            | (self.quantize[0].quantized_sample & 0x1FF)) as u32
    }

    pub fn unpack_codeword(&mut self, codeword: u16) {
        let codeword = i32::from(codeword);
        self.quantize[0].quantized_sample = sign_extend(codeword, 7);
        self.quantize[1].quantized_sample = sign_extend(codeword >> 7, 4);
        self.quantize[2].quantized_sample = sign_extend(codeword >> 11, 2);
        self.quantize[3].quantized_sample = sign_extend(codeword >> 13, 3);
        self.fix_parity_bit();
    }

    pub fn unpack_codeword_hd(&mut self, codeword: u32) {
        let codeword = codeword as i32;
        self.quantize[0].quantized_sample = sign_extend(codeword, 9);
        self.quantize[1].quantized_sample = sign_extend(codeword >> 9, 6);
        self.quantize[2].quantized_sample = sign_extend(codeword >> 15, 4);
        self.quantize[3].quantized_sample = sign_extend(codeword >> 19, 5);
        self.fix_parity_bit();
    }

    // The low bit of subband 3 carries parity, not sample data; recover the
    // sample bit from the parity of the other fields.
    fn fix_parity_bit(&mut self) {
        self.quantize[3].quantized_sample =
            (self.quantize[3].quantized_sample & !1) | self.quantized_parity();
    }
}
