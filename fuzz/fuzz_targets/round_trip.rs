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

#![no_main]

use arbitrary::Arbitrary;
use arbitrary::Unstructured;
use libfuzzer_sys::fuzz_target;

use aptx::coding::Decoder;
use aptx::coding::Encoder;
use aptx::config::Profile;
use aptx::sigen;
use aptx::sigen::Signal;

#[derive(Debug)]
struct Input {
    profile: Profile,
    blocks: usize,
    signals: [Box<dyn Signal>; 2],
}

fn arbitrary_signal(u: &mut Unstructured) -> Result<Box<dyn Signal>, arbitrary::Error> {
    let amplitude = u32::arbitrary(u)? as f32 / u32::MAX as f32;
    let signal: Box<dyn Signal> = match u.int_in_range(0..=2usize)? {
        0 => Box::new(sigen::Dc::new(2.0 * amplitude - 1.0)),
        1 => {
            let seed = u64::arbitrary(u)?;
            Box::new(sigen::Noise::with_seed(seed, amplitude))
        }
        2 => {
            let period = u.int_in_range(2..=512usize)?;
            let phase = u32::arbitrary(u)? as f32 / u32::MAX as f32 * 2.0 * std::f32::consts::PI;
            Box::new(sigen::Sine::with_initial_phase(period, amplitude, phase))
        }
        _ => unreachable!(),
    };
    Ok(Box::new(signal.clip()))
}

impl<'a> Arbitrary<'a> for Input {
    fn arbitrary(u: &mut Unstructured<'a>) -> Result<Self, arbitrary::Error> {
        let profile = if bool::arbitrary(u)? {
            Profile::Hd
        } else {
            Profile::Standard
        };
        let blocks = u.int_in_range(1..=256usize)?;
        let signals = [arbitrary_signal(u)?, arbitrary_signal(u)?];
        Ok(Self {
            profile,
            blocks,
            signals,
        })
    }
}

// A clean encode must always decode without a desync: the encoder inserts
// the parity schedule, and the decoder follows the same schedule from the
// same initial state.
fuzz_target!(|input: Input| {
    let len = input.blocks * 4;
    let left = input.signals[0].to_vec_s32(len);
    let right = input.signals[1].to_vec_s32(len);

    let mut encoder = Encoder::new(input.profile);
    let mut packet = Vec::new();
    let written = encoder.encode([&left, &right], &mut packet).unwrap();
    assert_eq!(written, input.blocks * input.profile.block_size());

    let mut decoder = Decoder::new(input.profile);
    let mut decoded = [Vec::new(), Vec::new()];
    let samples = decoder.decode(&packet, &mut decoded).unwrap();
    assert_eq!(samples, len);
    assert_eq!(decoded[0].len(), len);
    assert_eq!(decoded[1].len(), len);
});
